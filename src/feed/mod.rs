//! Paper feed: parsing, fetching, and paginated accumulation.
//!
//! - [`parser`] - Atom documents to [`Paper`] values via `feed-rs`
//! - [`fetcher`] - HTTP client for the arXiv list endpoint
//! - [`loader`] - append-only feed state with single-flight pagination
//!
//! # Example
//!
//! ```ignore
//! use crate::feed::{ArxivClient, FeedLoader};
//!
//! let mut loader = FeedLoader::new(client.page_size());
//! let first = loader.fetch_page(&client, 0).await;
//! assert_eq!(loader.items().len(), first.len());
//! ```

mod fetcher;
mod loader;
mod paper;
mod parser;

pub use fetcher::{ArxivClient, FeedQuery, FetchError};
pub use loader::{FeedLoader, FetchOutcome, FetchPlan, PendingFetch};
pub use paper::{Page, Paper};
pub use parser::{parse_papers, ParseError, ParseResult};
