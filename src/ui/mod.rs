//! Terminal User Interface module.
//!
//! This module provides the TUI for the paper feed, including:
//! - Main event loop (`run`)
//! - Keyboard and mouse input handling
//! - Rendering of the paper card, side buttons, and status bar
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Key, wheel, and click handling
//! - `events` - Background task event processing
//! - `render` - Layout and view dispatch
//! - `helpers` - Task spawning and panic capture
//! - `card` - Paper card widget
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod card;
mod events;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;

// Re-export the public API
pub use loop_runner::{run, Action};
