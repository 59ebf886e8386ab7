use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpinnerError {
    #[error("Invalid input: {message}")]
    Input { message: String },

    #[error("Infeasible layout: {parameter} = {value} ({reason})")]
    Layout {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid option {parameter} = {value}, expected {expected}")]
    InvalidOption {
        parameter: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Conversion cancelled after {completed} of {total} frames")]
    Cancelled { completed: usize, total: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpinnerError {
    pub(crate) fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    pub(crate) fn layout(parameter: &'static str, value: f64, reason: &'static str) -> Self {
        Self::Layout {
            parameter,
            value,
            reason,
        }
    }

    pub(crate) fn invalid_option(
        parameter: &'static str,
        value: impl ToString,
        expected: &'static str,
    ) -> Self {
        Self::InvalidOption {
            parameter,
            value: value.to_string(),
            expected,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpinnerError>;
