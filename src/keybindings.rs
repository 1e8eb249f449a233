//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Key handling is data-driven so users can rebind any action from the
//! `[keybindings]` table in config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    Next,
    Previous,
    Top,
    ToggleFavorites,
    ScrollDown,
    ScrollUp,
    ToggleLike,
    ToggleBookmark,
    OpenInBrowser,
    Reload,
    CycleTheme,
    ShowHelp,
}

/// Help screen section an action is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Navigation,
    Paper,
    General,
}

impl Group {
    pub fn title(self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::Paper => "Current paper",
            Self::General => "General",
        }
    }
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::Next => "Next paper",
            Self::Previous => "Previous paper",
            Self::Top => "Back to first paper",
            Self::ToggleFavorites => "Show liked papers / show all",
            Self::ScrollDown => "Scroll abstract down",
            Self::ScrollUp => "Scroll abstract up",
            Self::ToggleLike => "Like / unlike",
            Self::ToggleBookmark => "Bookmark / unbookmark",
            Self::OpenInBrowser => "Open in browser",
            Self::Reload => "Reload feed",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
        }
    }

    pub fn group(self) -> Group {
        match self {
            Self::Next | Self::Previous | Self::Top | Self::ToggleFavorites => Group::Navigation,
            Self::ScrollDown
            | Self::ScrollUp
            | Self::ToggleLike
            | Self::ToggleBookmark
            | Self::OpenInBrowser => Group::Paper,
            Self::Reload | Self::CycleTheme | Self::ShowHelp | Self::Quit => Group::General,
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Home", "End",
///   "PageUp", "PageDown", "Backspace", "Space"
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        return Some(KeySpec::ctrl(c));
    }

    // Named keys (case-insensitive)
    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    // Function keys
    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// An action may have several keys; a key maps to at most one action.
pub struct KeybindingRegistry {
    lookup: HashMap<KeySpec, Action>,
    /// All bindings in registration order, for the help screen.
    bindings: Vec<(KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, key: KeySpec, action: Action) {
        if let Some(previous) = self.lookup.insert(key, action) {
            self.bindings.retain(|(k, a)| !(*k == key && *a == previous));
        }
        self.bindings.push((key, action));
    }

    fn register_defaults(&mut self) {
        // Navigation
        self.bind(KeySpec::plain(KeyCode::Char('j')), Action::Next);
        self.bind(KeySpec::plain(KeyCode::Down), Action::Next);
        self.bind(KeySpec::plain(KeyCode::Char('k')), Action::Previous);
        self.bind(KeySpec::plain(KeyCode::Up), Action::Previous);
        self.bind(KeySpec::plain(KeyCode::Char('g')), Action::Top);
        self.bind(KeySpec::plain(KeyCode::Home), Action::Top);
        self.bind(KeySpec::plain(KeyCode::Char('f')), Action::ToggleFavorites);

        // Current paper
        self.bind(KeySpec::plain(KeyCode::Char('d')), Action::ScrollDown);
        self.bind(KeySpec::plain(KeyCode::PageDown), Action::ScrollDown);
        self.bind(KeySpec::plain(KeyCode::Char('u')), Action::ScrollUp);
        self.bind(KeySpec::plain(KeyCode::PageUp), Action::ScrollUp);
        self.bind(KeySpec::plain(KeyCode::Char('l')), Action::ToggleLike);
        self.bind(KeySpec::plain(KeyCode::Char('b')), Action::ToggleBookmark);
        self.bind(KeySpec::plain(KeyCode::Char('o')), Action::OpenInBrowser);

        // General
        self.bind(KeySpec::plain(KeyCode::Char('r')), Action::Reload);
        self.bind(KeySpec::plain(KeyCode::Char('t')), Action::CycleTheme);
        self.bind(KeySpec::plain(KeyCode::Char('?')), Action::ShowHelp);
        self.bind(KeySpec::plain(KeyCode::Char('q')), Action::Quit);
        // Raw mode swallows SIGINT
        self.bind(KeySpec::ctrl('c'), Action::Quit);
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "next").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). An override
    /// replaces every default key of that action.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        // Sorted so the outcome of two actions claiming one key is stable
        let mut entries: Vec<_> = overrides.iter().collect();
        entries.sort();

        for (action_name, key_str) in entries {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, a)| *a != action);
            self.bind(key, action);

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    pub fn action_for_key(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        // Shifted characters arrive with SHIFT set; the char already carries it
        let modifiers = match code {
            KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        self.lookup.get(&KeySpec::new(code, modifiers)).copied()
    }

    /// Display strings of every key bound to `action`, in registration order.
    pub fn keys_for(&self, action: Action) -> Vec<String> {
        self.bindings
            .iter()
            .filter(|(_, a)| *a == action)
            .map(|(k, _)| format_key(k))
            .collect()
    }

    /// One help row per action: (group, joined keys, description).
    pub fn help_rows(&self) -> Vec<(Group, String, &'static str)> {
        let mut seen: Vec<Action> = Vec::new();
        for (_, action) in &self.bindings {
            if !seen.contains(action) {
                seen.push(*action);
            }
        }
        seen.sort_by_key(|a| a.group() as u8);
        seen.into_iter()
            .map(|a| (a.group(), self.keys_for(a).join(" / "), a.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "next" | "nav_down" | "down" => Some(Action::Next),
        "previous" | "prev" | "nav_up" | "up" => Some(Action::Previous),
        "top" | "first" => Some(Action::Top),
        "toggle_favorites" | "togglefavorites" | "favorites" => Some(Action::ToggleFavorites),
        "scroll_down" | "scrolldown" => Some(Action::ScrollDown),
        "scroll_up" | "scrollup" => Some(Action::ScrollUp),
        "toggle_like" | "togglelike" | "like" => Some(Action::ToggleLike),
        "toggle_bookmark" | "togglebookmark" | "bookmark" => Some(Action::ToggleBookmark),
        "open_in_browser" | "openinbrowser" | "open" => Some(Action::OpenInBrowser),
        "reload" | "refresh" => Some(Action::Reload),
        "cycle_theme" | "cycletheme" | "theme" => Some(Action::CycleTheme),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
