//! Unified error types.

use thiserror::Error;

/// The error type returned by the server's fallible operations.
///
/// Application-level outcomes (404, 400, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: a bad bind address or a failed accept.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to decode an `application/x-www-form-urlencoded` payload.
///
/// The `Display` output is what the client sees in the body of the
/// `400 Bad Request` produced by [`MethodOverride`](crate::middleware::MethodOverride).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    /// A `%` not followed by two hex digits. Holds the offending escape.
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),

    #[error("invalid semicolon separator in query")]
    Semicolon,

    #[error("http: POST too large")]
    TooLarge { limit: usize },

    #[error("{0}")]
    Decode(String),
}

impl From<serde_urlencoded::de::Error> for FormError {
    fn from(e: serde_urlencoded::de::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
