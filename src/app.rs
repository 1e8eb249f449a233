use crate::arbiter::{Direction, InputArbiter};
use crate::feed::{ArxivClient, FeedLoader, FetchError, FetchOutcome, FetchPlan, Page, Paper, PendingFetch};
use crate::keybindings::KeybindingRegistry;
use crate::navigator::Navigator;
use crate::reactions::{ItemFlags, Reactions};
use crate::theme::{StyleMap, ThemeVariant};
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// Event Types
// ============================================================================

/// Events from background tasks
pub enum AppEvent {
    /// A page fetch finished.
    ///
    /// `pending` is the handle issued when the fetch was planned; it carries
    /// the loader generation so results that outlive a reload are dropped.
    PageLoaded {
        pending: PendingFetch,
        result: Result<Page, FetchError>,
    },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "page_fetch")
    /// - `pending`: The fetch the task was running, for page fetches
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked {
        task: &'static str,
        pending: Option<PendingFetch>,
        error: String,
    },
}

// ============================================================================
// Click Targets
// ============================================================================

/// On-screen elements that react to a mouse click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// Title bar; a click reloads the feed.
    Header,
    Previous,
    Next,
    Top,
}

/// Screen areas of the clickable elements, recorded during render so input
/// handling can hit-test against the last drawn frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickAreas {
    pub header: Rect,
    pub previous: Rect,
    pub next: Rect,
    pub top: Rect,
}

impl ClickAreas {
    pub fn hit(&self, column: u16, row: u16) -> Option<ClickTarget> {
        let pos = Position::new(column, row);
        [
            (self.previous, ClickTarget::Previous),
            (self.next, ClickTarget::Next),
            (self.top, ClickTarget::Top),
            (self.header, ClickTarget::Header),
        ]
        .into_iter()
        .find(|(area, _)| area.contains(pos))
        .map(|(_, target)| target)
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Liked-only view over the loaded feed.
struct FavoritesView {
    papers: Vec<Arc<Paper>>,
    /// Feed position to restore when the view closes.
    return_index: usize,
}

/// Central application state
pub struct App {
    pub client: ArxivClient,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub keybindings: KeybindingRegistry,

    // Feed + position
    pub loader: FeedLoader,
    pub navigator: Navigator,
    pub arbiter: InputArbiter,
    pub reactions: Reactions,
    favorites: Option<FavoritesView>,

    /// Abstract scroll offset, tied to the paper it was set on.
    card_scroll: Option<(Arc<str>, u16)>,
    /// Largest useful scroll offset for the current card, set on each render.
    pub card_scroll_max: u16,

    /// Handle to the in-flight page fetch, aborted on reload and drop.
    pub fetch_handle: Option<tokio::task::JoinHandle<()>>,

    // UI State
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub show_help: bool,
    pub click_areas: ClickAreas,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,
}

impl App {
    pub fn new(client: ArxivClient, input_debounce: Duration) -> Self {
        let page_size = client.page_size();
        Self {
            client,
            theme_variant: ThemeVariant::Dark,
            theme: StyleMap::from_palette(&ThemeVariant::Dark.palette()),
            keybindings: KeybindingRegistry::new(),
            loader: FeedLoader::new(page_size),
            navigator: Navigator::new(),
            arbiter: InputArbiter::new(input_debounce),
            reactions: Reactions::new(),
            favorites: None,
            card_scroll: None,
            card_scroll_max: 0,
            fetch_handle: None,
            status_message: None,
            show_help: false,
            click_areas: ClickAreas::default(),
            needs_redraw: true,
        }
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant. Returns the new theme's name.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    // ------------------------------------------------------------------------
    // Feed access
    // ------------------------------------------------------------------------

    /// Papers being navigated: the whole feed, or only liked papers while
    /// the favorites view is open.
    pub fn items(&self) -> &[Arc<Paper>] {
        match &self.favorites {
            Some(view) => &view.papers,
            None => self.loader.items(),
        }
    }

    pub fn showing_favorites(&self) -> bool {
        self.favorites.is_some()
    }

    pub fn index(&self) -> usize {
        self.navigator.index()
    }

    pub fn current(&self) -> Option<&Arc<Paper>> {
        self.items().get(self.index())
    }

    pub fn current_flags(&self) -> ItemFlags {
        self.current()
            .map(|p| self.reactions.get(&p.id))
            .unwrap_or_default()
    }

    /// True before the first page has arrived or failed.
    pub fn is_initial_load(&self) -> bool {
        self.loader.pages_loaded() == 0 && self.loader.last_error().is_none()
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn next(&mut self) -> bool {
        let len = self.items().len();
        self.navigator.advance(len)
    }

    pub fn previous(&mut self) -> bool {
        self.navigator.retreat()
    }

    pub fn top(&mut self) -> bool {
        let len = self.items().len();
        self.navigator.set_index(0, len)
    }

    /// Opens or closes the liked-papers view. Returns true if it is now open.
    ///
    /// Opening starts at the first liked paper; closing returns to the feed
    /// position held when the view opened.
    pub fn toggle_favorites(&mut self) -> bool {
        self.arbiter.clear();
        self.needs_redraw = true;

        if let Some(view) = self.favorites.take() {
            let len = self.loader.len();
            self.navigator.set_index(view.return_index, len);
            tracing::debug!(index = self.index(), "Favorites view closed");
            return false;
        }

        let view = FavoritesView {
            papers: self.liked_papers(),
            return_index: self.index(),
        };
        tracing::debug!(liked = view.papers.len(), "Favorites view opened");
        self.favorites = Some(view);
        self.navigator.reset();
        true
    }

    /// Scroll offset of the current card. Zero for a paper never scrolled.
    pub fn card_scroll(&self) -> u16 {
        match (&self.card_scroll, self.current()) {
            (Some((id, offset)), Some(paper)) if *id == paper.id => *offset,
            _ => 0,
        }
    }

    /// Scrolls the current card by `delta` lines within `card_scroll_max`.
    /// Returns true if the offset changed.
    pub fn scroll_card(&mut self, delta: i32) -> bool {
        let Some(id) = self.current().map(|p| Arc::clone(&p.id)) else {
            return false;
        };
        let current = self.card_scroll();
        let target = (i32::from(current) + delta).clamp(0, i32::from(self.card_scroll_max)) as u16;
        if target == current {
            return false;
        }
        self.card_scroll = Some((id, target));
        self.needs_redraw = true;
        true
    }

    fn liked_papers(&self) -> Vec<Arc<Paper>> {
        self.loader
            .items()
            .iter()
            .filter(|p| self.reactions.get(&p.id).liked)
            .cloned()
            .collect()
    }

    /// Drops unliked papers from an open favorites view.
    fn refresh_favorites(&mut self) {
        let papers = self.liked_papers();
        if let Some(view) = self.favorites.as_mut() {
            view.papers = papers;
            let len = view.papers.len();
            self.navigator.clamp(len);
        }
    }

    pub fn apply_direction(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Next => self.next(),
            Direction::Previous => self.previous(),
        }
    }

    /// Releases debounced input that is due and applies it.
    /// Returns true if the index moved.
    pub fn drain_input(&mut self, now: Instant) -> bool {
        let mut moved = false;
        for direction in self.arbiter.take_ready(now) {
            moved |= self.apply_direction(direction);
        }
        moved
    }

    // ------------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------------

    /// Decides whether the next page should be requested now.
    ///
    /// Fires when the current paper is the last one loaded (or nothing is
    /// loaded yet), the feed is not exhausted, no fetch is in flight, and
    /// the previous fetch did not fail. A returned handle is already marked
    /// in flight; the caller must perform the fetch and report back through
    /// [`AppEvent::PageLoaded`].
    pub fn maybe_prefetch(&mut self) -> Option<PendingFetch> {
        // The favorites view never reaches the end of the feed
        if self.favorites.is_some() {
            return None;
        }
        if self.loader.is_exhausted() || self.loader.is_loading() {
            return None;
        }
        if self.loader.last_error().is_some() {
            return None;
        }

        let len = self.loader.len();
        if len > 0 && self.index() + 1 < len {
            return None;
        }

        match self.loader.plan_fetch(self.loader.next_page_index()) {
            FetchPlan::Issue(pending) => Some(pending),
            plan => {
                tracing::debug!(plan = ?plan, "Prefetch not issued");
                None
            }
        }
    }

    /// Applies a finished page fetch.
    pub fn apply_page(
        &mut self,
        pending: PendingFetch,
        result: Result<Page, FetchError>,
    ) -> FetchOutcome {
        let outcome = self.loader.complete(pending, result, &mut rand::rng());

        match outcome {
            FetchOutcome::Stale => return outcome,
            FetchOutcome::Appended { added } => {
                tracing::debug!(page = pending.page_index, added, "Page applied");
            }
            FetchOutcome::Failed => {
                // Full-screen error covers the empty case
                if !self.loader.is_empty() {
                    self.set_status("Failed to load more papers (press r to reload)");
                }
            }
        }

        self.fetch_handle = None;
        self.navigator.clamp(self.items().len());
        self.needs_redraw = true;
        outcome
    }

    /// The task running `pending` died without delivering a result.
    ///
    /// Ignored when `pending` is no longer in flight, e.g. after a reload
    /// already started a fresh fetch. Returns true if the fetch was abandoned.
    pub fn fetch_panicked(&mut self, pending: PendingFetch, error: &str) -> bool {
        let reason = format!("fetch task panicked: {}", error);
        if !self.loader.abandon_in_flight(pending, reason) {
            return false;
        }
        self.fetch_handle = None;
        self.needs_redraw = true;
        true
    }

    /// Discards the feed and starts over from page 0.
    pub fn reload(&mut self) {
        if let Some(handle) = self.fetch_handle.take() {
            handle.abort();
            tracing::debug!("Aborted page fetch on reload");
        }
        self.loader.reload();
        self.favorites = None;
        self.card_scroll = None;
        self.navigator.reset();
        self.arbiter.clear();
        self.reactions.clear();
        self.needs_redraw = true;
        tracing::info!(generation = self.loader.generation(), "Feed reloaded");
    }

    // ------------------------------------------------------------------------
    // Reactions
    // ------------------------------------------------------------------------

    /// Returns the new like state, or None when nothing is shown.
    pub fn toggle_like(&mut self) -> Option<bool> {
        let id = Arc::clone(&self.current()?.id);
        let liked = self.reactions.toggle_like(&id);
        if !liked {
            self.refresh_favorites();
        }
        Some(liked)
    }

    pub fn toggle_bookmark(&mut self) -> Option<bool> {
        let id = Arc::clone(&self.current()?.id);
        Some(self.reactions.toggle_bookmark(&id))
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

/// Abort the in-flight fetch on drop so no task outlives the event loop.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.fetch_handle.take() {
            handle.abort();
            tracing::debug!("Aborted page fetch on App drop");
        }
    }
}
