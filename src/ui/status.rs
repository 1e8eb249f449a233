use crate::app::App;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

const HINTS: &str = "[j/k]next/prev [g]top [f]avorites [l]ike [b]ookmark [o]pen [r]eload [?]help [q]uit";

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }

    let len = app.items().len();
    let position: Cow<'_, str> = if len == 0 {
        Cow::Borrowed("")
    } else {
        // "+" while more pages may follow
        let more = if app.loader.is_exhausted() || app.showing_favorites() {
            ""
        } else {
            "+"
        };
        Cow::Owned(format!(" {}/{}{} ", app.index() + 1, len, more))
    };

    // Priority: loading indicator, then transient message, then hints
    let (text, role): (Cow<'_, str>, &str) = if app.loader.is_loading() && len > 0 {
        (Cow::Borrowed("Loading more papers..."), "status_loading")
    } else if let Some((msg, _)) = &app.status_message {
        (Cow::Borrowed(msg.as_ref()), "status_bar")
    } else if app.loader.last_error().is_some() && len > 0 {
        (
            Cow::Borrowed("Failed to load more papers (press r to reload)"),
            "status_error",
        )
    } else if app.loader.is_exhausted() && len > 0 && app.index() + 1 == len {
        (Cow::Borrowed("End of feed"), "status_bar")
    } else {
        (Cow::Borrowed(HINTS), "status_bar")
    };

    let mut spans = vec![Span::styled(position, app.style("status_bar"))];
    if app.showing_favorites() {
        spans.push(Span::styled("[liked] ", app.style("indicator_like")));
    }
    let liked = app.reactions.liked_count();
    let bookmarked = app.reactions.bookmarked_count();
    if liked > 0 || bookmarked > 0 {
        spans.push(Span::styled(format!("♥{} ", liked), app.style("indicator_like")));
        spans.push(Span::styled(
            format!("★{} ", bookmarked),
            app.style("indicator_bookmark"),
        ));
    }
    spans.push(Span::styled(format!(" {}", text), app.style(role)));
    let line = Line::from(spans);

    let paragraph = Paragraph::new(line).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}
