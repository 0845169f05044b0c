use thiserror::Error;

use crate::config::WorldPriceMode;

/// Errors raised by the equilibrium engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Data shape error: {0}")]
    DataShape(String),

    #[error("Unsupported world price mode: {0}")]
    UnsupportedWorldPriceMode(WorldPriceMode),

    #[error("Solver failure in period {period}: {message}")]
    Solver { period: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn data_shape(msg: impl Into<String>) -> Self {
        EngineError::DataShape(msg.into())
    }

    pub fn solver(period: usize, msg: impl Into<String>) -> Self {
        EngineError::Solver {
            period,
            message: msg.into(),
        }
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(errors: validator::ValidationErrors) -> Self {
        EngineError::Config(errors.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
