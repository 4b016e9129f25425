//! Fetch module for page retrieval and processing
//!
//! This module contains the single unit of scrape work, including:
//! - HTTP fetching with a bounded timeout
//! - HTML title extraction
//! - Turning either outcome into a stored result

mod executor;
mod fetcher;
mod parser;

pub use executor::ScrapeExecutor;
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use parser::{extract_title, TitleError};
