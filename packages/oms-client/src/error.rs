//! Errors of the object memory store client.

/// Errors returned by an object memory server client.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The server could not be reached (connection refused, timeout, DNS).
    #[error("object memory server unreachable: {message}")]
    Unreachable { message: String },

    /// The addressed memory or block does not exist.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The server answered but refused the operation.
    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("could not decode response: {message}")]
    Decode { message: String },

    #[error("invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("invalid header: {message}")]
    InvalidHeader { message: String },
}

impl Error {
    /// True for transport failures, as opposed to answers from the server.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Error::Unreachable { .. })
    }

    /// Status code carried by the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound { .. } => Some(404),
            Error::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::InvalidUrl {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Decode {
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Unreachable {
            message: error.to_string(),
        }
    }
}
