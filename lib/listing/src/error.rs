//! Error types for the listing crate.

use std::fmt;

/// Errors from fetching a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The URL is malformed or not http(s).
    InvalidUrl { url: String, reason: String },
    /// The HTTP client could not be built.
    ClientBuildFailed { reason: String },
    /// The request could not be sent or the connection failed.
    RequestFailed { url: String, reason: String },
    /// The page did not answer within the fetch timeout.
    Timeout { url: String },
    /// The page answered with a non-success status.
    HttpStatus { url: String, status: u16 },
    /// No listing facts could be extracted from the page.
    EmptyListing { url: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { url, reason } => {
                write!(f, "invalid listing url '{url}': {reason}")
            }
            Self::ClientBuildFailed { reason } => {
                write!(f, "failed to build listing http client: {reason}")
            }
            Self::RequestFailed { url, reason } => {
                write!(f, "failed to fetch listing '{url}': {reason}")
            }
            Self::Timeout { url } => write!(f, "fetching listing '{url}' timed out"),
            Self::HttpStatus { url, status } => {
                write!(f, "listing '{url}' returned HTTP {status}")
            }
            Self::EmptyListing { url } => {
                write!(f, "no listing details found at '{url}'")
            }
        }
    }
}

impl std::error::Error for FetchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_display() {
        let err = FetchError::HttpStatus {
            url: "https://example.test/house/1".to_string(),
            status: 404,
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("house/1"));
    }
}
