// Listing sources and the ingestion runner built on them.

pub mod headhunter;
pub mod normalize;
pub mod runner;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AppError;

pub use headhunter::HeadHunter;
pub use normalize::normalize;

/// Capability every vacancy listing source implements.
/// A source walks its whole listing for the given employers and returns the
/// raw postings in the order they arrived; it never deduplicates.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Fetch every posting published by `employer_ids`, `page_size` per request.
    async fn fetch(
        &self,
        employer_ids: &[String],
        page_size: u32,
    ) -> Result<Vec<RawPosting>, AppError>;
}

/// Identifiers arrive as JSON strings from hh.ru but as numbers from some mirrors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEmployer {
    pub id: Option<RawId>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSalary {
    pub from: Option<i32>,
    pub to: Option<i32>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnippet {
    pub responsibility: Option<String>,
}

/// One posting as the listing endpoint returns it. Every field is optional
/// here; required ones are enforced when the posting is normalized.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPosting {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub employer: Option<RawEmployer>,
    pub salary_range: Option<RawSalary>,
    pub alternate_url: Option<String>,
    pub snippet: Option<RawSnippet>,
}

/// One page of the listing response.
#[derive(Debug, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub items: Vec<RawPosting>,
    pub pages: Option<u32>,
}
