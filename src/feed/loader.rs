//! Paginated feed state.
//!
//! The loader owns the flat, append-only list of papers and decides which
//! page may be fetched next. Network I/O lives in [`ArxivClient`]; the event
//! loop spawns the request and hands the result back through
//! [`FeedLoader::complete`], so the loader is never held across an await
//! while the UI keeps handling input.

use super::fetcher::{ArxivClient, FetchError};
use super::paper::{Page, Paper};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

/// Handle for a fetch that has been allowed to start.
///
/// Carries the loader generation so a completion that arrives after a
/// reload can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingFetch {
    pub page_index: usize,
    pub generation: u64,
}

/// Decision returned by [`FeedLoader::plan_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// Go ahead: perform the request and report back with `complete`.
    Issue(PendingFetch),
    /// Page already fetched this session.
    Cached,
    /// Another fetch is outstanding.
    InFlight,
    /// Upstream has no more data.
    Exhausted,
    /// Pages are fetched strictly in order; this one is not next.
    OutOfOrder,
}

/// Effect of applying a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Appended { added: usize },
    Failed,
    /// Completion belonged to an older generation or an unexpected page.
    Stale,
}

pub struct FeedLoader {
    page_size: usize,
    items: Vec<Arc<Paper>>,
    /// Ids already in `items`; upstream pages shift as new papers arrive.
    seen: HashSet<Arc<str>>,
    /// Cached pages; position equals page index.
    pages: Vec<Page>,
    pages_requested: usize,
    exhausted: bool,
    in_flight: Option<PendingFetch>,
    generation: u64,
    last_error: Option<String>,
}

impl FeedLoader {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            items: Vec::new(),
            seen: HashSet::new(),
            pages: Vec::new(),
            pages_requested: 0,
            exhausted: false,
            in_flight: None,
            generation: 0,
            last_error: None,
        }
    }

    pub fn items(&self) -> &[Arc<Paper>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of fetches issued since the last reload.
    pub fn pages_requested(&self) -> usize {
        self.pages_requested
    }

    /// Number of pages appended since the last reload.
    pub fn pages_loaded(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Message from the most recent failed fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Index of the page that would be fetched next.
    pub fn next_page_index(&self) -> usize {
        self.pages.len()
    }

    /// Decides whether `page_index` may be fetched now and, if so, marks it
    /// in flight.
    pub fn plan_fetch(&mut self, page_index: usize) -> FetchPlan {
        if page_index < self.pages.len() {
            return FetchPlan::Cached;
        }
        if self.in_flight.is_some() {
            return FetchPlan::InFlight;
        }
        if self.exhausted {
            return FetchPlan::Exhausted;
        }
        if page_index != self.pages.len() {
            return FetchPlan::OutOfOrder;
        }

        let pending = PendingFetch {
            page_index,
            generation: self.generation,
        };
        self.in_flight = Some(pending);
        self.pages_requested += 1;
        tracing::debug!(page = page_index, generation = self.generation, "Page fetch issued");
        FetchPlan::Issue(pending)
    }

    /// Applies the result of a fetch started by [`plan_fetch`](Self::plan_fetch).
    ///
    /// A successful page loses any paper whose id is already in the feed,
    /// then is shuffled, cached, and appended. A page carrying
    /// fewer upstream entries than the page size marks the feed exhausted.
    /// A failure leaves the page uncached and the feed not exhausted, so
    /// the same index can be planned again.
    pub fn complete<R: Rng + ?Sized>(
        &mut self,
        pending: PendingFetch,
        result: Result<Page, FetchError>,
        rng: &mut R,
    ) -> FetchOutcome {
        if pending.generation != self.generation || self.in_flight != Some(pending) {
            tracing::debug!(
                page = pending.page_index,
                generation = pending.generation,
                current = self.generation,
                "Discarding stale page result"
            );
            return FetchOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(mut page) => {
                page.index = pending.page_index;

                let before = page.papers.len();
                let seen = &mut self.seen;
                page.papers.retain(|p| seen.insert(Arc::clone(&p.id)));
                let duplicates = before - page.papers.len();
                if duplicates > 0 {
                    tracing::debug!(
                        page = page.index,
                        duplicates,
                        "Dropped papers already in the feed"
                    );
                }

                page.papers.shuffle(rng);

                if page.raw_len < self.page_size {
                    self.exhausted = true;
                    tracing::debug!(
                        page = page.index,
                        raw_len = page.raw_len,
                        "Short page, feed exhausted"
                    );
                }

                let added = page.papers.len();
                self.items.extend(page.papers.iter().cloned());
                self.pages.push(page);
                self.last_error = None;
                tracing::debug!(
                    page = pending.page_index,
                    added = added,
                    total = self.items.len(),
                    "Page appended"
                );
                FetchOutcome::Appended { added }
            }
            Err(e) => {
                tracing::warn!(page = pending.page_index, error = %e, "Page fetch failed");
                self.last_error = Some(e.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Fetches a page end to end.
    ///
    /// A cached index returns the cached page without touching the network.
    /// Failures, and indexes that may not be fetched right now, yield an
    /// empty page.
    pub async fn fetch_page(&mut self, client: &ArxivClient, page_index: usize) -> Page {
        let pending = match self.plan_fetch(page_index) {
            FetchPlan::Issue(pending) => pending,
            FetchPlan::Cached => return self.pages[page_index].clone(),
            plan => {
                tracing::debug!(page = page_index, plan = ?plan, "Page fetch skipped");
                return Page::empty(page_index);
            }
        };

        let result = client.fetch_page(page_index).await;
        self.complete(pending, result, &mut rand::rng());

        self.pages
            .get(page_index)
            .cloned()
            .unwrap_or_else(|| Page::empty(page_index))
    }

    /// Gives up on `pending` when its task died without reporting.
    ///
    /// Recorded like a failed fetch. Returns false, changing nothing, unless
    /// `pending` is the fetch currently in flight.
    pub fn abandon_in_flight(&mut self, pending: PendingFetch, reason: impl Into<String>) -> bool {
        if self.in_flight != Some(pending) {
            tracing::debug!(
                page = pending.page_index,
                generation = pending.generation,
                "Ignoring abandon for a fetch that is not in flight"
            );
            return false;
        }
        self.in_flight = None;
        let reason = reason.into();
        tracing::warn!(page = pending.page_index, reason = %reason, "Page fetch abandoned");
        self.last_error = Some(reason);
        true
    }

    /// Discards all feed state. Results of fetches issued before the reload
    /// will be reported as [`FetchOutcome::Stale`].
    pub fn reload(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.items.clear();
        self.seen.clear();
        self.pages.clear();
        self.pages_requested = 0;
        self.exhausted = false;
        self.in_flight = None;
        self.last_error = None;
        tracing::debug!(generation = self.generation, "Feed state reset");
    }
}
