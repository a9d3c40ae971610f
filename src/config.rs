//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::error::Error;

/// Environment variable holding the bind address, e.g. `127.0.0.1:8080`.
pub const ADDR_VAR: &str = "STRATA_ADDR";

/// Listening on every interface, port 3000.
pub const DEFAULT_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 3000));

/// Settings for a [`Server`](crate::Server).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self { addr: DEFAULT_ADDR }
    }
}

impl Config {
    /// Defaults, overridden by `STRATA_ADDR` when it is set and non-blank.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Config::from_env), reading variables through
    /// `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ADDR_VAR).filter(|v| !v.trim().is_empty()) {
            config.addr = parse_addr(&raw)?;
        }
        Ok(config)
    }
}

pub(crate) fn parse_addr(raw: &str) -> Result<SocketAddr, Error> {
    raw.trim().parse().map_err(|source| Error::InvalidAddr {
        addr: raw.to_owned(),
        source,
    })
}
