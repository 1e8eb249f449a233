use chrono::{DateTime, Utc};
use std::sync::Arc;

/// One paper parsed from the upstream feed.
///
/// Immutable once built; the loader hands papers out as `Arc<Paper>` so the
/// page cache and the flat item list share storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    /// Upstream entry id (for arXiv, the `http://arxiv.org/abs/...` URI).
    pub id: Arc<str>,
    pub title: String,
    pub summary: String,
    /// Author names in source order.
    pub authors: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    /// Category terms in source order, without duplicates.
    pub categories: Vec<String>,
    /// Link to the paper's landing page.
    pub link: String,
}

impl Paper {
    /// Authors joined for a single display line.
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }

    /// Short arXiv identifier (`2401.00001v1`), taken from the last path
    /// segment of the entry id.
    pub fn short_id(&self) -> &str {
        self.id
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.id)
    }
}

/// One batch of papers from a single paginated fetch.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Zero-based page index.
    pub index: usize,
    /// Papers kept after parsing, in the order they are appended.
    pub papers: Vec<Arc<Paper>>,
    /// Number of entries the upstream response carried, before malformed
    /// entries were dropped. End-of-data is judged on this count.
    pub raw_len: usize,
}

impl Page {
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            papers: Vec::new(),
            raw_len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}
