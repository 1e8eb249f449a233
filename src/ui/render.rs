//! Render functions for the TUI.
//!
//! Lays out the header, the paper card with its button column, and the
//! status bar, then draws the help overlay on top when active.

use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::sync::Arc;

use super::{card, help, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 12;

const TITLE: &str = "PaperStream";

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        // Stale targets must not catch clicks on this frame
        app.click_areas = Default::default();
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(card::BUTTON_COLUMN_WIDTH),
        ])
        .split(chunks[1]);

    match app.current().map(Arc::clone) {
        Some(paper) => card::render(f, app, &paper, main[0]),
        None => render_placeholder(f, app, main[0]),
    }
    card::render_buttons(f, app, main[1]);

    status::render(f, app, chunks[2]);

    if app.show_help {
        help::render(f, app);
    }
}

/// Title bar. The title itself is the reload target.
fn render_header(f: &mut Frame, app: &mut App, area: Rect) {
    let query = &app.client.query().search_query;
    let line = Line::from(vec![
        Span::styled(format!(" {} ", TITLE), app.style("header")),
        Span::styled(format!(" {}", query), app.style("card_meta")),
    ]);
    f.render_widget(Paragraph::new(line), area);

    let title_width = (TITLE.len() as u16 + 2).min(area.width);
    app.click_areas.header = Rect {
        width: title_width,
        ..area
    };
}

/// Full-card message shown while there is no paper to display.
fn render_placeholder(f: &mut Frame, app: &App, area: Rect) {
    let (text, role) = if app.showing_favorites() {
        ("No liked papers yet. Press f to show all papers.", "message")
    } else if app.loader.last_error().is_some() {
        (
            "Failed to load papers. Press r or click the title to retry.",
            "message_error",
        )
    } else if app.is_initial_load() || app.loader.is_loading() {
        ("Loading papers...", "message")
    } else {
        ("No papers available", "message")
    };

    // Vertically center the single line inside the border
    let inner_height = area.height.saturating_sub(2);
    let padding = inner_height.saturating_sub(1) / 2;
    let mut lines = vec![Line::default(); padding as usize];
    lines.push(Line::styled(text, app.style(role)));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("card_border")),
        );
    f.render_widget(paragraph, area);
}
