//! Help overlay: keybinding table.
//!
//! Renders a centered overlay showing all keybindings grouped by purpose.
//! Displays actual bindings including any user overrides from config.

use crate::app::App;
use crate::keybindings::Group;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

const GROUP_ORDER: [Group; 3] = [Group::Navigation, Group::Paper, Group::General];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(70, 90, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    // Clear the background behind the overlay
    f.render_widget(Clear, overlay);

    let help_rows = app.keybindings.help_rows();
    let mut rows: Vec<Row> = Vec::new();

    for group in GROUP_ORDER {
        let entries: Vec<_> = help_rows.iter().filter(|(g, _, _)| *g == group).collect();
        if entries.is_empty() {
            continue;
        }

        rows.push(
            Row::new(vec![
                Line::from(Span::styled(
                    format!("-- {} --", group.title()),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ])
            .style(app.style("help_group")),
        );

        for (_, keys, description) in entries {
            rows.push(Row::new(vec![
                Line::from(Span::styled(format!("  {}", keys), app.style("help_key"))),
                Line::from(*description),
            ]));
        }
    }

    rows.push(Row::new(vec![String::new(), String::new()]));
    rows.push(Row::new(vec![
        Line::from(Span::styled("  wheel", app.style("help_key"))),
        Line::from("Next / previous paper"),
    ]));
    rows.push(Row::new(vec![
        Line::from(Span::styled("  click", app.style("help_key"))),
        Line::from("▲ ▼ ⤒ buttons, title bar reloads"),
    ]));

    let widths = [Constraint::Length(18), Constraint::Min(20)];
    let table = Table::new(rows, widths)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("help_border"))
                .title(" Help (? to close) "),
        )
        .style(app.style("card_body"));

    f.render_widget(table, overlay);
}

/// Create a centered rectangle with the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
