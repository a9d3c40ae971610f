//! Unified error type.

use std::net::AddrParseError;

/// The error type returned by strata's fallible operations.
///
/// Application-level outcomes (404, 500, etc.) are expressed on the
/// [`Response`](crate::Response), not as `Error`s. This type surfaces
/// infrastructure failures: bad configuration, binding to a port, accepting
/// a connection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid bind address `{addr}`: {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: AddrParseError,
    },
}
