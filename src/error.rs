use simple_error::SimpleError;
use std::fmt;

/// Errors raised while reading a sweep, converting it or writing the result
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Input row malformed, missing column or unparseable number
    Format { line: usize, message: String },
    /// Sample sits exactly on the pole of the selected formula
    Singularity { index: usize, frequency: f64 },
    /// Bad run parameter, rejected before any sample is processed
    InvalidParameter(String),
    Io(String),
}

impl ConversionError {
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        ConversionError::Format {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        ConversionError::InvalidParameter(message.into())
    }

    pub fn is_format(&self) -> bool {
        matches!(self, ConversionError::Format { .. })
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::Format { line, message } => {
                write!(f, "Format error at line {}: {}", line, message)
            }
            ConversionError::Singularity { index, frequency } => write!(
                f,
                "Singular sample {} at {} Hz: S-parameter lies on the formula pole",
                index, frequency
            ),
            ConversionError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            ConversionError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ConversionError {}

impl From<std::io::Error> for ConversionError {
    fn from(err: std::io::Error) -> Self {
        ConversionError::Io(err.to_string())
    }
}

impl From<SimpleError> for ConversionError {
    fn from(err: SimpleError) -> Self {
        ConversionError::InvalidParameter(err.to_string())
    }
}

impl From<csv::Error> for ConversionError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line() as usize).unwrap_or(0);
        match err.kind() {
            // raised while writing, never tied to an input line
            csv::ErrorKind::Io(_) | csv::ErrorKind::Serialize(_) => {
                ConversionError::Io(err.to_string())
            }
            _ => ConversionError::Format {
                line,
                message: err.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for ConversionError {
    fn from(err: serde_json::Error) -> Self {
        ConversionError::Io(err.to_string())
    }
}
