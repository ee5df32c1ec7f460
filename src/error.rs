use std::fmt;

#[derive(Debug)]
pub enum ReporterError {
    /// The HTTP client failed before a response was received
    Http(String),
    /// The endpoint answered with a non-2xx status
    Status { code: i32, body: String },
    JsonError(serde_json::Error),
    InvalidUrl(url::ParseError),
}

impl fmt::Display for ReporterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReporterError::Http(e) => write!(f, "HTTP request failed: {}", e),
            ReporterError::Status { code, body } => {
                if body.is_empty() {
                    write!(f, "Endpoint returned status {}", code)
                } else {
                    write!(f, "Endpoint returned status {}: {}", code, body)
                }
            }
            ReporterError::JsonError(e) => write!(f, "JSON error: {}", e),
            ReporterError::InvalidUrl(e) => write!(f, "Invalid URL: {}", e),
        }
    }
}

impl std::error::Error for ReporterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReporterError::JsonError(e) => Some(e),
            ReporterError::InvalidUrl(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ReporterError {
    fn from(err: serde_json::Error) -> Self {
        ReporterError::JsonError(err)
    }
}

impl From<url::ParseError> for ReporterError {
    fn from(err: url::ParseError) -> Self {
        ReporterError::InvalidUrl(err)
    }
}

impl From<minreq::Error> for ReporterError {
    fn from(err: minreq::Error) -> Self {
        ReporterError::Http(err.to_string())
    }
}
