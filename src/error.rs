//! Error types for AnveshaNav.

use thiserror::Error;

/// AnveshaNav error type.
///
/// Errors only arise at construction time (configuration loading,
/// perspective calibration). The per-tick control path is total and
/// never fails.
#[derive(Error, Debug)]
pub enum AnveshaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calibration error: {0}")]
    Calibration(String),
}

impl From<toml::de::Error> for AnveshaError {
    fn from(e: toml::de::Error) -> Self {
        AnveshaError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnveshaError>;
