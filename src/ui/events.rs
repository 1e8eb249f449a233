//! Application event handling.
//!
//! Applies results delivered by background tasks to the application state.

use crate::app::{App, AppEvent};
use crate::feed::FetchOutcome;
use tokio::sync::mpsc;

use super::helpers::request_next_page;

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::PageLoaded { pending, result } => {
            match app.apply_page(pending, result) {
                FetchOutcome::Stale => {}
                FetchOutcome::Appended { .. } => {
                    // The list grew under the current index; a short or
                    // heavily filtered page may leave it at the end again
                    request_next_page(app, event_tx);
                }
                FetchOutcome::Failed => {
                    tracing::debug!(
                        page = pending.page_index,
                        "Pagination paused until reload"
                    );
                }
            }
        }
        AppEvent::TaskPanicked {
            task,
            pending,
            error,
        } => {
            tracing::error!(task, error, "Background task panicked");
            let current = match pending {
                Some(pending) => app.fetch_panicked(pending, &error),
                None => true,
            };
            if current {
                app.set_status(format!("Internal error in {} task", task));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{ArxivClient, FeedQuery};
    use std::time::Duration;
    use url::Url;

    fn test_app() -> App {
        let query = FeedQuery {
            base_url: Url::parse("http://127.0.0.1:9/api/query").unwrap(),
            search_query: "cat:cs.AI".to_string(),
            page_size: 10,
        };
        App::new(
            ArxivClient::new(query, Duration::from_secs(1)).unwrap(),
            Duration::from_millis(50),
        )
    }

    fn fetch_panic(pending: crate::feed::PendingFetch) -> AppEvent {
        AppEvent::TaskPanicked {
            task: "page_fetch",
            pending: Some(pending),
            error: "boom".to_string(),
        }
    }

    #[test]
    fn test_panicked_fetch_is_abandoned() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        let pending = app.maybe_prefetch().unwrap();

        handle_app_event(&mut app, fetch_panic(pending), &tx);

        assert!(!app.loader.is_loading());
        assert_eq!(app.loader.last_error(), Some("fetch task panicked: boom"));
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_panic_from_before_reload_leaves_new_fetch_alone() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        let old = app.maybe_prefetch().unwrap();

        app.reload();
        let fresh = app.maybe_prefetch().unwrap();
        assert_eq!(fresh.generation, old.generation + 1);

        handle_app_event(&mut app, fetch_panic(old), &tx);

        assert!(app.loader.is_loading());
        assert_eq!(app.loader.last_error(), None);
        assert!(app.status_message.is_none());
        // The fresh fetch still completes normally
        let outcome = app.apply_page(fresh, Ok(crate::feed::Page::empty(0)));
        assert!(matches!(outcome, FetchOutcome::Appended { .. }));
    }
}
