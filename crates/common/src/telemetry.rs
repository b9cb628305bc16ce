//! Logging initialization.
//!
//! The LOG_LEVEL property accepts both the host's level names (SEVERE ..
//! FINEST) and plain `tracing` levels. The first call installs a global fmt
//! subscriber whose filter sits behind a reload handle; later calls swap the
//! filter, so a LOG_LEVEL changed on a live virtual schema takes effect.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

pub const LOG_LEVELS: &[&str] = &[
    "OFF", "SEVERE", "WARNING", "INFO", "CONFIG", "FINE", "FINER", "FINEST", "ALL", "ERROR",
    "WARN", "DEBUG", "TRACE",
];

pub const DEFAULT_LOG_LEVEL: &str = "INFO";

static FILTER_HANDLE: OnceCell<reload::Handle<EnvFilter, Registry>> = OnceCell::new();

/// What `init_logging` did with the requested level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingInit {
    /// Our subscriber was installed with the level.
    Installed,
    /// Our subscriber was already installed; its filter now uses the level.
    Reloaded,
    /// Someone else owns the global subscriber; the level was not applied.
    ForeignSubscriber,
}

/// Maps a LOG_LEVEL value to an `EnvFilter` directive.
pub fn filter_directive(level: &str) -> Option<&'static str> {
    let directive = match level.trim().to_ascii_uppercase().as_str() {
        "OFF" => "off",
        "SEVERE" | "ERROR" => "error",
        "WARNING" | "WARN" => "warn",
        "INFO" | "CONFIG" => "info",
        "FINE" | "DEBUG" => "debug",
        "FINER" | "FINEST" | "ALL" | "TRACE" => "trace",
        _ => return None,
    };
    Some(directive)
}

/// Installs or re-levels the fmt subscriber at `level` (default INFO).
pub fn init_logging(level: Option<&str>) -> Result<LoggingInit> {
    let level = level.unwrap_or(DEFAULT_LOG_LEVEL);
    let directive = filter_directive(level)
        .with_context(|| format!("Unsupported log level '{}'", level))?;
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("Failed to build log filter '{}'", directive))?;

    if let Some(handle) = FILTER_HANDLE.get() {
        handle
            .reload(filter)
            .with_context(|| format!("Failed to switch log level to '{}'", directive))?;
        tracing::debug!(level = %directive, "Log level changed");
        return Ok(LoggingInit::Reloaded);
    }

    let (filter_layer, handle) = reload::Layer::new(filter);
    let installed = tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .is_ok();
    if !installed {
        return Ok(LoggingInit::ForeignSubscriber);
    }

    // A racing first call loses the set and keeps logging at the winner's level.
    let _ = FILTER_HANDLE.set(handle);
    tracing::debug!(level = %directive, "Logging initialized");
    Ok(LoggingInit::Installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("SEVERE"), Some("error"));
        assert_eq!(filter_directive("config"), Some("info"));
        assert_eq!(filter_directive(" finest "), Some("trace"));
        assert_eq!(filter_directive("debug"), Some("debug"));
        assert_eq!(filter_directive("VERBOSE"), None);
    }

    #[test]
    fn test_every_listed_level_is_accepted() {
        for level in LOG_LEVELS {
            assert!(filter_directive(level).is_some(), "{}", level);
        }
    }

    #[test]
    fn test_later_calls_change_the_level() {
        let first = init_logging(Some("FINE")).unwrap();
        assert!(matches!(first, LoggingInit::Installed | LoggingInit::Reloaded));
        assert!(tracing::enabled!(tracing::Level::DEBUG));

        assert_eq!(init_logging(Some("WARNING")).unwrap(), LoggingInit::Reloaded);
        assert!(!tracing::enabled!(tracing::Level::INFO));
        assert!(tracing::enabled!(tracing::Level::WARN));
    }

    #[test]
    fn test_init_logging_rejects_unknown_level() {
        assert!(init_logging(Some("LOUD")).is_err());
    }
}
