//! Utility functions shared by the feed and UI layers.
//!
//! - **Text processing**: whitespace normalization, escape stripping, and
//!   width-aware truncation for terminal rendering
//! - **URL validation**: scheme/host checks for the configured endpoint and
//!   for paper links opened in the browser

mod text;
mod url_validator;

pub use text::{clean_text, display_width, truncate_to_width};
pub use url_validator::{validate_api_base_url, validate_link_for_open, UrlValidationError};
