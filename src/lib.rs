//! PaperStream: a terminal feed of arXiv abstracts, one paper at a time.
//!
//! The binary wires these modules into a TUI; they are exposed as a library
//! so the paging and navigation behavior can be driven from integration
//! tests without a terminal.

pub mod app;
pub mod arbiter;
pub mod config;
pub mod feed;
pub mod keybindings;
pub mod navigator;
pub mod reactions;
pub mod theme;
pub mod ui;
pub mod util;
