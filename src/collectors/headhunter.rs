use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::collectors::{ListingPage, ListingSource, RawPosting};
use crate::config::DEFAULT_LISTING_URL;
use crate::error::AppError;

const USER_AGENT: &str = concat!("vacancydb/", env!("CARGO_PKG_VERSION"));

/// Upper bound on pages walked in one fetch. A `pages` value above it is
/// treated as a malformed response instead of being followed.
pub const MAX_PAGES: u32 = 10_000;

/// Longest slice of an error body kept as the failure reason.
const MAX_REASON_LEN: usize = 200;

/// The hh.ru vacancy listing, filtered by employer.
pub struct HeadHunter {
    url: String,
}

impl HeadHunter {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for HeadHunter {
    fn default() -> Self {
        Self::new(DEFAULT_LISTING_URL)
    }
}

#[async_trait]
impl ListingSource for HeadHunter {
    fn name(&self) -> &str {
        "headhunter"
    }

    async fn fetch(
        &self,
        employer_ids: &[String],
        page_size: u32,
    ) -> Result<Vec<RawPosting>, AppError> {
        validate_request(employer_ids, page_size)?;

        // One session per fetch; its connections are released when it drops,
        // whichever way `walk` returns.
        let session = ListingSession::open()?;
        let result = walk(&session, &self.url, employer_ids, page_size).await;
        drop(session);

        match &result {
            Ok(postings) => tracing::info!(
                "{} returned {} postings for {} employers",
                self.name(),
                postings.len(),
                employer_ids.len()
            ),
            Err(e) => tracing::warn!("{} fetch aborted: {e}", self.name()),
        }
        result
    }
}

fn validate_request(employer_ids: &[String], page_size: u32) -> Result<(), AppError> {
    if employer_ids.is_empty() {
        return Err(AppError::Validation(
            "At least one employer id is required".to_string(),
        ));
    }
    if employer_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(AppError::Validation(
            "Employer ids must not be blank".to_string(),
        ));
    }
    if page_size == 0 {
        return Err(AppError::Validation(
            "Page size must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Walk pages from cursor 0 until the cursor reaches the reported page count.
async fn walk(
    session: &ListingSession,
    url: &str,
    employer_ids: &[String],
    page_size: u32,
) -> Result<Vec<RawPosting>, AppError> {
    let mut postings = Vec::new();
    let mut cursor = 0u32;

    loop {
        let page = session.get_page(url, employer_ids, page_size, cursor).await?;

        let pages = page.pages.ok_or_else(|| {
            AppError::Validation(format!("Listing page {cursor} has no 'pages' count"))
        })?;
        if pages > MAX_PAGES {
            return Err(AppError::Validation(format!(
                "Listing reports {pages} pages, more than the {MAX_PAGES} allowed"
            )));
        }

        tracing::debug!(
            "Page {}/{pages}: {} postings",
            cursor + 1,
            page.items.len()
        );
        postings.extend(page.items);

        cursor += 1;
        if cursor >= pages {
            break;
        }
    }

    Ok(postings)
}

/// HTTP session shared by every page request of a single fetch.
struct ListingSession {
    client: Client,
}

impl ListingSession {
    fn open() -> Result<Self, AppError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    async fn get_page(
        &self,
        url: &str,
        employer_ids: &[String],
        page_size: u32,
        page: u32,
    ) -> Result<ListingPage, AppError> {
        let resp = self
            .client
            .get(url)
            .query(&page_query(employer_ids, page_size, page))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Status {
                status: status.as_u16(),
                reason: failure_reason(status, &body),
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            AppError::Validation(format!("Unexpected listing response on page {page}: {e}"))
        })
    }
}

/// Status text, followed by the server's own message when it sent one.
fn failure_reason(status: StatusCode, body: &str) -> String {
    let phrase = status.canonical_reason().unwrap_or("Unknown");
    match body.trim() {
        "" => phrase.to_string(),
        text => {
            let message: String = text.chars().take(MAX_REASON_LEN).collect();
            format!("{phrase}: {message}")
        }
    }
}

/// Query pairs for one page: `employer_id` repeated once per employer.
fn page_query(employer_ids: &[String], page_size: u32, page: u32) -> Vec<(&'static str, String)> {
    let mut query: Vec<(&'static str, String)> = employer_ids
        .iter()
        .map(|id| ("employer_id", id.clone()))
        .collect();
    query.push(("per_page", page_size.to_string()));
    query.push(("page", page.to_string()));
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_repeats_employer_id() {
        let ids = vec!["1740".to_string(), "3529".to_string()];
        let query = page_query(&ids, 100, 2);
        assert_eq!(
            query,
            vec![
                ("employer_id", "1740".to_string()),
                ("employer_id", "3529".to_string()),
                ("per_page", "100".to_string()),
                ("page", "2".to_string()),
            ]
        );
    }

    #[test]
    fn failure_reason_keeps_status_text_and_server_message() {
        assert_eq!(
            failure_reason(StatusCode::SERVICE_UNAVAILABLE, "maintenance window\n"),
            "Service Unavailable: maintenance window"
        );
        assert_eq!(failure_reason(StatusCode::FORBIDDEN, "  "), "Forbidden");
    }

    #[test]
    fn failure_reason_caps_long_bodies() {
        let body = "x".repeat(MAX_REASON_LEN * 2);
        let reason = failure_reason(StatusCode::BAD_GATEWAY, &body);
        assert_eq!(reason, format!("Bad Gateway: {}", "x".repeat(MAX_REASON_LEN)));
    }

    #[test]
    fn empty_employer_set_is_rejected() {
        let err = validate_request(&[], 100).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn blank_employer_id_is_rejected() {
        let ids = vec!["1740".to_string(), "  ".to_string()];
        assert!(matches!(
            validate_request(&ids, 100),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let ids = vec!["1740".to_string()];
        assert!(matches!(
            validate_request(&ids, 0),
            Err(AppError::Validation(_))
        ));
    }
}
