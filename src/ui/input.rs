//! Input handling for the TUI.
//!
//! Keys and the mouse wheel go through the input arbiter; clicks on the
//! on-screen buttons act immediately.

use crate::app::{App, AppEvent, ClickTarget};
use crate::arbiter::{Direction, InputChannel};
use crate::keybindings::Action as KbAction;
use crate::util::validate_link_for_open;
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::helpers::request_next_page;
use super::Action;

/// Lines moved per abstract scroll key press.
const CARD_SCROLL_STEP: i32 = 3;

/// Main key dispatch function.
pub(super) fn handle_key(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Help overlay captures all keys when visible
    if app.show_help {
        return handle_help_input(app, code);
    }

    let Some(action) = app.keybindings.action_for_key(code, modifiers) else {
        return Action::Continue;
    };

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::Next => {
            app.arbiter
                .push(InputChannel::Keyboard, Direction::Next, Instant::now());
        }
        KbAction::Previous => {
            app.arbiter
                .push(InputChannel::Keyboard, Direction::Previous, Instant::now());
        }
        KbAction::Top => {
            app.top();
        }
        KbAction::ToggleFavorites => {
            if app.toggle_favorites() {
                let liked = app.items().len();
                app.set_status(format!("Showing liked papers ({})", liked));
            } else {
                app.set_status("Showing all papers");
                // Back at the feed position, which may be its end
                request_next_page(app, event_tx);
            }
        }
        KbAction::ScrollDown => {
            app.scroll_card(CARD_SCROLL_STEP);
        }
        KbAction::ScrollUp => {
            app.scroll_card(-CARD_SCROLL_STEP);
        }
        KbAction::ToggleLike => match app.toggle_like() {
            Some(true) => app.set_status("Liked"),
            Some(false) => app.set_status("Like removed"),
            None => {}
        },
        KbAction::ToggleBookmark => match app.toggle_bookmark() {
            Some(true) => app.set_status("Bookmarked"),
            Some(false) => app.set_status("Bookmark removed"),
            None => {}
        },
        KbAction::OpenInBrowser => open_current(app),
        KbAction::Reload => reload(app, event_tx),
        KbAction::CycleTheme => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KbAction::ShowHelp => {
            app.show_help = true;
        }
    }

    Action::Continue
}

/// Handle input while the help overlay is visible.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    if matches!(
        code,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')
    ) {
        app.show_help = false;
    }
    Action::Continue
}

/// Mouse dispatch: wheel scrolling and left clicks on buttons or the header.
pub(super) fn handle_mouse(app: &mut App, mouse: MouseEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match mouse.kind {
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
            if app.show_help {
                return;
            }
            let delta = if mouse.kind == MouseEventKind::ScrollDown { 1 } else { -1 };
            if let Some(direction) = Direction::from_wheel_delta(delta) {
                app.arbiter.push(InputChannel::Wheel, direction, Instant::now());
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if app.show_help {
                app.show_help = false;
                app.needs_redraw = true;
                return;
            }
            match app.click_areas.hit(mouse.column, mouse.row) {
                Some(ClickTarget::Previous) => {
                    app.previous();
                }
                Some(ClickTarget::Next) => {
                    app.next();
                }
                Some(ClickTarget::Top) => {
                    app.top();
                }
                Some(ClickTarget::Header) => reload(app, event_tx),
                None => {}
            }
        }
        _ => {}
    }
}

fn reload(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    app.reload();
    app.set_status("Reloading papers...");
    request_next_page(app, event_tx);
}

fn open_current(app: &mut App) {
    let Some(paper) = app.current() else {
        return;
    };
    let link = paper.link.clone();

    // Validate before handing the URL to the OS opener
    match validate_link_for_open(&link) {
        Err(e) => app.set_status(format!("Cannot open link: {}", e)),
        Ok(url) => match open::that(url.as_str()) {
            Ok(()) => app.set_status("Opening in browser..."),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to open browser");
                app.set_status(format!("Failed to open browser: {}", e));
            }
        },
    }
}
