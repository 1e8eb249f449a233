//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette: semantic roles to Style
// ============================================================================

/// A complete color palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Header --
    pub header: Style,

    // -- Paper card --
    pub card_border: Style,
    pub card_title: Style,
    pub card_meta: Style,
    pub card_body: Style,
    pub card_category: Style,
    pub card_link: Style,
    pub indicator_like: Style,
    pub indicator_bookmark: Style,
    pub indicator_off: Style,

    // -- Side buttons --
    pub button: Style,
    pub button_disabled: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub status_loading: Style,
    pub status_error: Style,
    pub message: Style,
    pub message_error: Style,

    // -- Help overlay --
    pub help_group: Style,
    pub help_key: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            card_border: Style::default().fg(Color::DarkGray),
            card_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            card_meta: Style::default().fg(Color::Gray),
            card_body: Style::default(),
            card_category: Style::default().fg(Color::Black).bg(Color::Cyan),
            card_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            indicator_like: Style::default().fg(Color::Red),
            indicator_bookmark: Style::default().fg(Color::Yellow),
            indicator_off: Style::default().fg(Color::DarkGray),

            button: Style::default().fg(Color::White).bg(Color::DarkGray),
            button_disabled: Style::default().fg(Color::DarkGray),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_loading: Style::default().bg(Color::DarkGray).fg(Color::Yellow),
            status_error: Style::default().bg(Color::DarkGray).fg(Color::LightRed),
            message: Style::default().fg(Color::Gray),
            message_error: Style::default().fg(Color::Red),

            help_group: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            help_key: Style::default().fg(Color::Yellow),
        }
    }

    /// Light palette, adapted for light terminal backgrounds.
    fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),

            card_border: Style::default().fg(Color::Gray),
            card_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            card_meta: Style::default().fg(Color::DarkGray),
            card_body: Style::default().fg(Color::Black),
            card_category: Style::default().fg(Color::White).bg(Color::Blue),
            card_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            indicator_like: Style::default().fg(Color::Red),
            indicator_bookmark: Style::default().fg(Color::Magenta),
            indicator_off: Style::default().fg(Color::Gray),

            button: Style::default().fg(Color::White).bg(Color::Blue),
            button_disabled: Style::default().fg(Color::Gray),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_loading: Style::default().bg(Color::White).fg(Color::Magenta),
            status_error: Style::default().bg(Color::White).fg(Color::Red),
            message: Style::default().fg(Color::DarkGray),
            message_error: Style::default().fg(Color::Red),

            help_group: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            help_key: Style::default().fg(Color::Magenta),
        }
    }
}

// ============================================================================
// Style Map: string-keyed lookup
// ============================================================================

/// String-keyed style lookup.
///
/// Built from a `ColorPalette`, this allows resolving role names (e.g.
/// `"card_title"`) to their concrete `Style` at runtime.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 20] = [
    "header",
    "card_border",
    "card_title",
    "card_meta",
    "card_body",
    "card_category",
    "card_link",
    "indicator_like",
    "indicator_bookmark",
    "indicator_off",
    "button",
    "button_disabled",
    "status_bar",
    "status_loading",
    "status_error",
    "message",
    "message_error",
    "help_group",
    "help_key",
    "help_border",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 20] = [
            p.header,
            p.card_border,
            p.card_title,
            p.card_meta,
            p.card_body,
            p.card_category,
            p.card_link,
            p.indicator_like,
            p.indicator_bookmark,
            p.indicator_off,
            p.button,
            p.button_disabled,
            p.status_bar,
            p.status_loading,
            p.status_error,
            p.message,
            p.message_error,
            p.help_group,
            p.help_key,
            // The help overlay borrows the header color for its frame
            p.header.remove_modifier(Modifier::BOLD),
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
