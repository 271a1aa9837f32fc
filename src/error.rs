use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SimError` and maps to other errors to
/// convert to a `SimError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SimError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    /// The parameters cannot produce a runnable population.
    ConfigurationError(String),
    /// A vaccine scoring strategy produced an unusable set of scores.
    StrategyError(String),
    SimError(String),
}

impl SimError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        SimError::ConfigurationError(message.into())
    }

    pub(crate) fn strategy(message: impl Into<String>) -> Self {
        SimError::StrategyError(message.into())
    }
}

impl From<io::Error> for SimError {
    fn from(error: io::Error) -> Self {
        SimError::IoError(error)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(error: serde_json::Error) -> Self {
        SimError::JsonError(error)
    }
}

impl From<String> for SimError {
    fn from(error: String) -> Self {
        SimError::SimError(error)
    }
}

impl From<&str> for SimError {
    fn from(error: &str) -> Self {
        SimError::SimError(error.to_string())
    }
}

impl std::error::Error for SimError {}

impl Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::ConfigurationError(message) => {
                write!(f, "Configuration error: {message}")
            }
            SimError::StrategyError(message) => write!(f, "Strategy error: {message}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}
