//! Helper functions for UI operations.
//!
//! Spawning of the page fetch task and panic capture for background work.

use crate::app::{App, AppEvent};
use crate::feed::{ArxivClient, PendingFetch};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of the task silently disappearing (caught by Tokio's runtime but
/// not handled), panics are converted to `Err(String)` containing the panic
/// message.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Runs the prefetch check and, when it fires, spawns the fetch.
///
/// Returns true if a fetch was started.
pub(super) fn request_next_page(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) -> bool {
    let Some(pending) = app.maybe_prefetch() else {
        return false;
    };

    tracing::debug!(
        page = pending.page_index,
        generation = pending.generation,
        index = app.index(),
        len = app.items().len(),
        "Requesting next page"
    );

    app.fetch_handle = Some(spawn_page_fetch(
        pending,
        app.client.clone(),
        event_tx.clone(),
    ));
    app.needs_redraw = true;
    true
}

/// Spawn a background task fetching one page.
///
/// Sends `AppEvent::PageLoaded` on completion (success or failure), or
/// `AppEvent::TaskPanicked` if the fetch panics.
///
/// # Returns
///
/// The JoinHandle for the spawned task, so a reload can abort it.
pub(super) fn spawn_page_fetch(
    pending: PendingFetch,
    client: ArxivClient,
    tx: mpsc::Sender<AppEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let event = match catch_task_panic(client.fetch_page(pending.page_index)).await {
            Ok(result) => AppEvent::PageLoaded { pending, result },
            Err(panic_msg) => {
                tracing::error!(error = %panic_msg, "Page fetch task panicked");
                AppEvent::TaskPanicked {
                    task: "page_fetch",
                    pending: Some(pending),
                    error: panic_msg,
                }
            }
        };

        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, event = "PageLoaded", "Channel send failed (receiver dropped)");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catch_task_panic_ok() {
        let result = catch_task_panic(async { 7 }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_str_payload() {
        let result: Result<(), String> = catch_task_panic(async { panic!("boom") }).await;
        assert_eq!(result, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_catch_task_panic_string_payload() {
        let n = 3;
        let result: Result<(), String> =
            catch_task_panic(async move { panic!("bad page {}", n) }).await;
        assert_eq!(result, Err("bad page 3".to_string()));
    }
}
