use std::fmt::{self, Debug, Display};
use std::io;

/// A configuration value that falls outside the range the simulation can run with.
#[derive(Clone, PartialEq, Debug)]
pub struct InvalidParameter {
    parameter_name: &'static str,
    value: f64,
    expected: &'static str,
}

impl InvalidParameter {
    #[must_use]
    pub fn new(parameter_name: &'static str, value: f64, expected: &'static str) -> Self {
        Self {
            parameter_name,
            value,
            expected,
        }
    }

    #[must_use]
    pub fn parameter_name(&self) -> &'static str {
        self.parameter_name
    }
}

impl Display for InvalidParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value {} provided for {} is invalid: expected {}",
            self.value, self.parameter_name, self.expected
        )
    }
}

impl std::error::Error for InvalidParameter {}

/// Provides `SimError` and maps to other errors to
/// convert to a `SimError`
#[derive(Debug)]
pub enum SimError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    InvalidParameter(InvalidParameter),
    DisplayError(String),
    SimError(String),
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

impl From<csv::Error> for SimError {
    fn from(error: csv::Error) -> Self {
        SimError::CSVError(error)
    }
}

impl From<InvalidParameter> for SimError {
    fn from(error: InvalidParameter) -> Self {
        SimError::InvalidParameter(error)
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
            SimError::IoError(e) => write!(f, "Error: i/o failure: {e}"),
            SimError::JsonError(e) => write!(f, "Error: invalid config file: {e}"),
            SimError::CSVError(e) => write!(f, "Error: failed to write report: {e}"),
            SimError::InvalidParameter(e) => write!(f, "Error: {e}"),
            SimError::DisplayError(msg) => write!(f, "Error: could not open display: {msg}"),
            SimError::SimError(msg) => write!(f, "Error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_message_names_parameter() {
        let error: SimError =
            InvalidParameter::new("vaccination_fraction", 1.5, "a value in [0, 1]").into();
        let message = error.to_string();
        assert!(message.contains("vaccination_fraction"));
        assert!(message.contains("1.5"));
        assert!(message.contains("[0, 1]"));
    }

    #[test]
    fn io_errors_convert() {
        let error: SimError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(error, SimError::IoError(_)));
    }

    #[test]
    fn str_errors_convert() {
        let error: SimError = "boom".into();
        assert_eq!(error.to_string(), "Error: boom");
    }
}
