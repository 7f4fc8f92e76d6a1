//! Diagnostic logging
//!
//! Logs go to stderr through a `tracing-subscriber` fmt layer so stdout only
//! carries status lines and summaries. `RUST_LOG` overrides the level picked
//! from the CLI flags.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Console log level selected by `--verbose` / `--quiet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Debug,
}

impl LogLevel {
    /// Create from CLI flags
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            LogLevel::Error
        } else if verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        }
    }

    /// Convert to `EnvFilter` directive string.
    pub const fn to_filter_string(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Debug => "vsmodup=debug,warn",
        }
    }

    /// Filter honouring `RUST_LOG` when it is set
    fn env_filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.to_filter_string()))
    }
}

/// Install the global subscriber.
///
/// Returns false if a subscriber was already installed.
pub fn init_logging(level: LogLevel) -> bool {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(level == LogLevel::Debug)
        .with_level(true)
        .with_ansi(true)
        .with_filter(level.env_filter());

    tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(LogLevel::from_flags(false, false), LogLevel::Warn);
        assert_eq!(LogLevel::from_flags(true, false), LogLevel::Debug);
        assert_eq!(LogLevel::from_flags(false, true), LogLevel::Error);
    }

    #[test]
    fn test_filter_strings() {
        assert_eq!(LogLevel::Error.to_filter_string(), "error");
        assert_eq!(LogLevel::Warn.to_filter_string(), "warn");
        assert!(LogLevel::Debug.to_filter_string().contains("vsmodup=debug"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(LogLevel::Warn);
        assert!(!init_logging(LogLevel::Debug));
    }
}
