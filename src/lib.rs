pub mod collectors;
pub mod config;
pub mod db;
pub mod error;
pub mod menu;
pub mod models;
pub mod routes;

pub use collectors::runner::{IngestReport, ingest};
pub use collectors::{HeadHunter, ListingSource, RawPosting};
pub use db::Store;
pub use error::{AppError, ErrorKind};
