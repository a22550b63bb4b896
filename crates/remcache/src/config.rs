// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Connection configuration.

use std::fmt;

use serde::Deserialize;

use crate::ConfigError;

/// The endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "redis://127.0.0.1:6379";

/// The port substituted when an endpoint names none.
pub const DEFAULT_PORT: u16 = 6379;

/// The environment variable read by [`CacheConfig::from_env`].
pub const ENDPOINT_VAR: &str = "REMCACHE_ENDPOINT";

/// Cache configuration.
///
/// Deserializes from any `serde` format, so it can be embedded in an application's own
/// configuration file. Missing fields take their defaults.
///
/// # Examples
///
/// ```
/// use remcache::CacheConfig;
///
/// let config = CacheConfig::new("redis://cache.internal/0");
/// let endpoint = config.endpoint()?;
/// assert_eq!(endpoint.to_string(), "cache.internal:6379");
/// # Ok::<(), remcache::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// The store URI, `scheme://host[:port][/path]`. The scheme may be omitted.
    pub endpoint: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl CacheConfig {
    /// Creates a configuration for `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }

    /// Reads the endpoint from `REMCACHE_ENDPOINT`, falling back to [`DEFAULT_ENDPOINT`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        lookup(ENDPOINT_VAR)
            .filter(|value| !value.trim().is_empty())
            .map_or_else(Self::default, Self::new)
    }

    /// Parses the configured endpoint.
    ///
    /// # Errors
    ///
    /// Fails if the host is empty or the port is not a number in `1..=65535`.
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        Endpoint::parse(&self.endpoint)
    }
}

/// A parsed store address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Parses `scheme://host[:port][/path]` into a host and port.
    ///
    /// Everything after the authority is ignored. When the port is missing, [`DEFAULT_PORT`]
    /// is used. Bracketed IPv6 hosts (`[::1]:6380`) are accepted.
    ///
    /// # Errors
    ///
    /// Fails if the host is empty or the port is not a number in `1..=65535`.
    pub fn parse(uri: &str) -> Result<Self, ConfigError> {
        let rest = uri.trim();
        let rest = rest.split_once("://").map_or(rest, |(_, rest)| rest);
        let authority = rest.split('/').next().unwrap_or_default();

        let (host, port) = split_authority(authority);
        if host.is_empty() {
            return Err(ConfigError::new(format!("endpoint '{uri}' has no host")));
        }

        let port = match port {
            None => DEFAULT_PORT,
            Some(port) => port
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| ConfigError::new(format!("endpoint '{uri}' has an invalid port '{port}'")))?,
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

fn split_authority(authority: &str) -> (&str, Option<&str>) {
    if authority.starts_with('[')
        && let Some((host, after)) = authority.split_once(']')
    {
        return (&authority[..=host.len()], after.strip_prefix(':'));
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
