//! Error types for warchief-fx.
//!
//! The simulation itself never fails: runtime inputs are clamped rather than
//! rejected. The only fallible operations are loading and saving effect
//! configuration.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving an [`EffectsConfig`](crate::EffectsConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config text is not valid JSON for the config schema.
    #[error("Invalid effects config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = ConfigError::io(
            "effects.json",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        let msg = err.to_string();
        assert!(msg.contains("effects.json"), "{msg}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_json_error_from() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
