use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// Document is not shaped like the expected export (wrong top-level type, etc.).
    MalformedDocument { document: &'static str, reason: String },
    /// A mandatory top-level field is absent or blank.
    MissingField { document: &'static str, field: String },
    /// Input parsed but carries none of the structure the parser looks for.
    UnsupportedShape { document: &'static str, reason: String },
    /// Option validation error (threshold out of range, empty alias list, etc.).
    ConfigValidation(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDocument { document, reason } => {
                write!(f, "{document}: malformed document: {reason}")
            }
            Self::MissingField { document, field } => {
                write!(f, "{document}: missing required field '{field}'")
            }
            Self::UnsupportedShape { document, reason } => {
                write!(f, "{document}: unsupported structure: {reason}")
            }
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
