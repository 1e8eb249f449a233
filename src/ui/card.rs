use crate::app::App;
use crate::feed::Paper;
use crate::reactions::ItemFlags;
use crate::util::{display_width, truncate_to_width};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Width of the button column, borders included.
pub(super) const BUTTON_COLUMN_WIDTH: u16 = 7;
const BUTTON_HEIGHT: u16 = 3;

/// Format a submission date: relative within a week, absolute after.
pub(super) fn format_published(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(ts) = published else {
        return "date unknown".to_string();
    };

    let diff = now.signed_duration_since(ts);

    // Future dates (clock skew)
    if diff.num_seconds() < 0 {
        return "just now".to_string();
    }
    if diff.num_hours() < 1 {
        return format!("{}m ago", diff.num_minutes());
    }
    if diff.num_days() < 1 {
        return format!("{}h ago", diff.num_hours());
    }
    if diff.num_days() < 7 {
        return format!("{}d ago", diff.num_days());
    }

    ts.format("%b %d, %Y").to_string()
}

/// Build the text of a paper card for the given inner width.
pub(super) fn card_lines(
    app: &App,
    paper: &Paper,
    flags: ItemFlags,
    width: usize,
    now: DateTime<Utc>,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if !paper.categories.is_empty() {
        let mut tags = Vec::with_capacity(paper.categories.len() * 2);
        for category in &paper.categories {
            tags.push(Span::styled(format!(" {} ", category), app.style("card_category")));
            tags.push(Span::raw(" "));
        }
        lines.push(Line::from(tags));
        lines.push(Line::default());
    }

    lines.push(Line::styled(paper.title.clone(), app.style("card_title")));

    let date = format_published(paper.published, now);
    let meta = if paper.authors.is_empty() {
        date
    } else {
        format!("{} · {}", date, paper.author_line())
    };
    lines.push(Line::styled(
        truncate_to_width(&meta, width).into_owned(),
        app.style("card_meta"),
    ));
    lines.push(Line::default());

    if paper.summary.is_empty() {
        lines.push(Line::styled("No abstract available.", app.style("message")));
    } else {
        lines.push(Line::styled(paper.summary.clone(), app.style("card_body")));
    }
    lines.push(Line::default());

    let (like_icon, like_style) = if flags.liked {
        ("♥ Liked", "indicator_like")
    } else {
        ("♡ Like", "indicator_off")
    };
    let (mark_icon, mark_style) = if flags.bookmarked {
        ("★ Bookmarked", "indicator_bookmark")
    } else {
        ("☆ Bookmark", "indicator_off")
    };
    lines.push(Line::from(vec![
        Span::styled(like_icon, app.style(like_style)),
        Span::raw("   "),
        Span::styled(mark_icon, app.style(mark_style)),
    ]));
    lines.push(Line::styled(
        truncate_to_width(&paper.link, width).into_owned(),
        app.style("card_link"),
    ));

    lines
}

/// Rows `lines` take up when word-wrapped to `width` columns.
pub(super) fn wrapped_height(lines: &[Line<'_>], width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    lines
        .iter()
        .map(|line| {
            let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
            wrapped_rows(&text, width)
        })
        .sum()
}

fn wrapped_rows(text: &str, width: usize) -> usize {
    let mut rows = 1;
    let mut col = 0;
    for word in text.split(' ') {
        let w = display_width(word);
        let needed = if col == 0 { w } else { col + 1 + w };
        if needed <= width {
            col = needed;
        } else if w <= width {
            rows += 1;
            col = w;
        } else {
            // Words wider than the card are broken across rows
            if col > 0 {
                rows += 1;
            }
            let extra = (w - 1) / width;
            rows += extra;
            col = w - extra * width;
        }
    }
    rows
}

/// Render the current paper as a full card.
///
/// Records the largest useful scroll offset on `app` so scrolling stops at
/// the last line of the abstract.
pub fn render(f: &mut Frame, app: &mut App, paper: &Paper, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let lines = card_lines(app, paper, app.current_flags(), inner_width, Utc::now());

    let overflow = wrapped_height(&lines, inner_width).saturating_sub(inner_height);
    app.card_scroll_max = u16::try_from(overflow).unwrap_or(u16::MAX);
    let scroll = app.card_scroll().min(app.card_scroll_max);

    let position = format!(" {}/{} ", app.index() + 1, app.items().len());
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("card_border"))
        .title_top(Line::from(format!(" arXiv:{} ", paper.short_id())))
        .title_top(Line::from(position).right_aligned());
    if scroll < app.card_scroll_max {
        block = block.title_bottom(
            Line::styled(" more ↓ ", app.style("card_meta")).right_aligned(),
        );
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(paragraph, area);
}

/// Render the ▲ / ▼ / ⤒ column and record where the buttons landed.
pub fn render_buttons(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Min(0),
        ])
        .split(area);

    let len = app.items().len();
    let index = app.index();
    let buttons = [
        ("▲", index > 0),
        ("▼", len > 0 && index + 1 < len),
        ("⤒", index > 0),
    ];

    for ((label, enabled), rect) in buttons.iter().zip(chunks.iter()) {
        let style = if *enabled {
            app.style("button")
        } else {
            app.style("button_disabled")
        };
        let button = Paragraph::new(*label)
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(style));
        f.render_widget(button, *rect);
    }

    app.click_areas.previous = chunks[0];
    app.click_areas.next = chunks[1];
    app.click_areas.top = chunks[2];
}
