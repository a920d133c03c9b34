use std::io::IsTerminal;
use std::str::FromStr;

use crate::logger::format::LogFormat;

/// Environment variable read by [`LogConfig::from_env`] for the filter.
const ENV_FILTER: &str = "LISTKIT_LOG";
/// Environment variable read by [`LogConfig::from_env`] for the format.
const ENV_FORMAT: &str = "LISTKIT_LOG_FORMAT";

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Filter directive string, `RUST_LOG` syntax.
    pub filter: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "info".to_string(),
            with_targets: true,
            use_color: std::io::stdout().is_terminal(),
        }
    }
}

impl LogConfig {
    /// Defaults overridden by `LISTKIT_LOG` and `LISTKIT_LOG_FORMAT`
    /// where set. Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(filter) = std::env::var(ENV_FILTER)
            && !filter.trim().is_empty()
        {
            cfg.filter = filter;
        }
        if let Ok(raw) = std::env::var(ENV_FORMAT)
            && let Ok(format) = LogFormat::from_str(&raw)
        {
            cfg.format = format;
        }
        cfg
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_targets(mut self, with_targets: bool) -> Self {
        self.with_targets = with_targets;
        self
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }
}
