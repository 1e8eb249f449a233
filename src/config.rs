//! Configuration file parser for ~/.config/paperstream/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning so typos
//! don't go unnoticed. Values are range-checked after parsing.
use crate::feed::FeedQuery;
use crate::util::{validate_api_base_url, UrlValidationError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SEARCH_QUERY: &str = "cat:cs.AI OR cat:cs.CL OR cat:cs.CV";
pub const DEFAULT_API_BASE_URL: &str = "https://export.arxiv.org/api/query";

/// Inclusive bounds for `page_size`. arXiv allows far more per request, but a
/// page is shuffled as a unit and large pages make the shuffle meaningless.
pub const PAGE_SIZE_RANGE: std::ops::RangeInclusive<usize> = 1..=100;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A value parsed but is out of range.
    #[error("Invalid config value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("Invalid api_base_url: {0}")]
    BaseUrl(#[from] UrlValidationError),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// arXiv search expression, e.g. `cat:cs.AI OR cat:cs.CL`.
    pub search_query: String,

    /// List endpoint. Overridable for mirrors and tests.
    pub api_base_url: String,

    /// Papers per request.
    pub page_size: usize,

    /// Quiet period for wheel and key bursts, in milliseconds.
    pub input_debounce_ms: u64,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_query: DEFAULT_SEARCH_QUERY.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: 10,
            input_debounce_ms: 50,
            request_timeout_secs: 30,
            theme: "dark".to_string(),
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "search_query",
        "api_base_url",
        "page_size",
        "input_debounce_ms",
        "request_timeout_secs",
        "theme",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Out-of-range values → `Err(ConfigError::Invalid)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(
            path = %path.display(),
            query = %config.search_query,
            page_size = config.page_size,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Range-checks values that parsed fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_query.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "search_query",
                reason: "must not be empty".to_string(),
            });
        }
        if !PAGE_SIZE_RANGE.contains(&self.page_size) {
            return Err(ConfigError::Invalid {
                key: "page_size",
                reason: format!(
                    "{} is outside {}..={}",
                    self.page_size,
                    PAGE_SIZE_RANGE.start(),
                    PAGE_SIZE_RANGE.end()
                ),
            });
        }
        if self.input_debounce_ms > 1_000 {
            return Err(ConfigError::Invalid {
                key: "input_debounce_ms",
                reason: format!("{} ms is longer than 1000 ms", self.input_debounce_ms),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        validate_api_base_url(&self.api_base_url)?;
        Ok(())
    }

    pub fn input_debounce(&self) -> Duration {
        Duration::from_millis(self.input_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the fixed per-session query from the validated values.
    pub fn feed_query(&self) -> Result<FeedQuery, ConfigError> {
        Ok(FeedQuery {
            base_url: validate_api_base_url(&self.api_base_url)?,
            search_query: self.search_query.trim().to_string(),
            page_size: self.page_size,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("paperstream_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search_query, "cat:cs.AI OR cat:cs.CL OR cat:cs.CV");
        assert_eq!(config.api_base_url, "https://export.arxiv.org/api/query");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.input_debounce(), Duration::from_millis(50));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.theme, "dark");
        assert!(config.keybindings.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/paperstream_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "dark");
        cleanup(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = write_config("partial", "page_size = 25\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.search_query, DEFAULT_SEARCH_QUERY);
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let path = write_config(
            "full",
            r#"
search_query = "cat:math.PR"
api_base_url = "http://localhost:8080/api/query"
page_size = 5
input_debounce_ms = 120
request_timeout_secs = 10
theme = "light"

[keybindings]
quit = "Ctrl+q"
next = "n"
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.search_query, "cat:math.PR");
        assert_eq!(config.page_size, 5);
        assert_eq!(config.input_debounce_ms, 120);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.theme, "light");
        assert_eq!(config.keybindings.get("next").map(String::as_str), Some("n"));

        let query = config.feed_query().unwrap();
        assert_eq!(query.base_url.as_str(), "http://localhost:8080/api/query");
        assert_eq!(query.page_size, 5);
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let path = write_config("unknown", "theme = \"dark\"\nrefresh_interval = 3\n");
        assert!(Config::load(&path).is_ok());
        cleanup(&path);
    }

    #[test]
    fn test_page_size_out_of_range() {
        let path = write_config("page_size", "page_size = 0\n");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "page_size", .. }));
        cleanup(&path);

        let config = Config {
            page_size: 101,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_query_rejected() {
        let config = Config {
            search_query: "   ".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "search_query", .. })
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let config = Config {
            api_base_url: "ftp://example.com/feed".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::BaseUrl(_))));
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }
}
