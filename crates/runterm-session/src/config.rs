//! Session configuration.
//!
//! Defaults suit an interactive shell over a local PTY. Every field can be
//! overridden with a `with_*` builder or from the environment:
//!
//! | Variable                 | Field             | Format            |
//! |--------------------------|-------------------|-------------------|
//! | `RUNTERM_POLL_BASE_MS`   | `poll_base`       | milliseconds      |
//! | `RUNTERM_POLL_MAX_MS`    | `poll_max`        | milliseconds      |
//! | `RUNTERM_POLL_BACKOFF`   | `poll_backoff`    | float, `>= 1.0`   |
//! | `RUNTERM_READ_WINDOW_MS` | `read_window`     | milliseconds      |
//! | `RUNTERM_SKIP_BACKLOG`   | `initial_backlog` | bool (inverted)   |

use std::env;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_POLL_BASE_MS: &str = "RUNTERM_POLL_BASE_MS";
pub const ENV_POLL_MAX_MS: &str = "RUNTERM_POLL_MAX_MS";
pub const ENV_POLL_BACKOFF: &str = "RUNTERM_POLL_BACKOFF";
pub const ENV_READ_WINDOW_MS: &str = "RUNTERM_READ_WINDOW_MS";
pub const ENV_SKIP_BACKLOG: &str = "RUNTERM_SKIP_BACKLOG";

/// Scheduling and geometry policy for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Poll interval right after data arrived.
    pub poll_base: Duration,
    /// Upper bound for the backed-off poll interval.
    pub poll_max: Duration,
    /// Factor applied to the interval after each idle fetch.
    pub poll_backoff: f64,
    /// How long a PTY fetch waits for the first byte.
    pub read_window: Duration,
    /// Ask the transport for its buffered history before polling.
    pub initial_backlog: bool,
    /// Rows subtracted from the geometry-derived capacity.
    pub reserved_rows: u16,
    /// Columns subtracted from the geometry-derived capacity.
    pub reserved_cols: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_base: Duration::from_millis(50),
            poll_max: Duration::from_secs(2),
            poll_backoff: 2.5,
            read_window: Duration::from_millis(500),
            initial_backlog: true,
            reserved_rows: 0,
            reserved_cols: 0,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_poll_base(mut self, base: Duration) -> Self {
        self.poll_base = base;
        self
    }

    #[must_use]
    pub fn with_poll_max(mut self, max: Duration) -> Self {
        self.poll_max = max;
        self
    }

    #[must_use]
    pub fn with_poll_backoff(mut self, factor: f64) -> Self {
        self.poll_backoff = factor;
        self
    }

    #[must_use]
    pub fn with_read_window(mut self, window: Duration) -> Self {
        self.read_window = window;
        self
    }

    #[must_use]
    pub fn with_initial_backlog(mut self, enabled: bool) -> Self {
        self.initial_backlog = enabled;
        self
    }

    /// Rows and columns kept free around the grid (status lines, margins).
    #[must_use]
    pub fn with_reserved(mut self, rows: u16, cols: u16) -> Self {
        self.reserved_rows = rows;
        self.reserved_cols = cols;
        self
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Read overrides through `get`, starting from the defaults.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = get(ENV_POLL_BASE_MS) {
            config.poll_base = parse_millis("poll_base", &value)?;
        }
        if let Some(value) = get(ENV_POLL_MAX_MS) {
            config.poll_max = parse_millis("poll_max", &value)?;
        }
        if let Some(value) = get(ENV_POLL_BACKOFF) {
            config.poll_backoff = value.trim().parse::<f64>().map_err(|_| {
                ConfigError::new("poll_backoff", &value, "expected a number")
            })?;
        }
        if let Some(value) = get(ENV_READ_WINDOW_MS) {
            config.read_window = parse_millis("read_window", &value)?;
        }
        if let Some(value) = get(ENV_SKIP_BACKLOG) {
            let skip = parse_bool(&value).ok_or_else(|| {
                ConfigError::new("initial_backlog", &value, "expected bool (1/0/true/false)")
            })?;
            config.initial_backlog = !skip;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the scheduling constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_base.is_zero() {
            return Err(ConfigError::new("poll_base", "0", "must be positive"));
        }
        if self.poll_max < self.poll_base {
            return Err(ConfigError::new(
                "poll_max",
                format!("{}ms", self.poll_max.as_millis()),
                "must not be below poll_base",
            ));
        }
        if !self.poll_backoff.is_finite() || self.poll_backoff < 1.0 {
            return Err(ConfigError::new(
                "poll_backoff",
                self.poll_backoff.to_string(),
                "must be a finite number >= 1.0",
            ));
        }
        Ok(())
    }
}

fn parse_millis(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::new(field, value, "expected milliseconds"))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// A rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: &'static str,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: &'static str) -> Self {
        Self {
            field,
            value: value.into(),
            message,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}
