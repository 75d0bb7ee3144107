use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

pub const HTTP_ADDR_VAR: &str = "HATIM_HTTP_ADDR";
pub const DB_PATH_VAR: &str = "HATIM_DB_PATH";
pub const LOCAL_STORAGE_PATH_VAR: &str = "HATIM_LOCAL_STORAGE_PATH";

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DB_PATH: &str = "hatim.sqlite3";
const DEFAULT_LOCAL_STORAGE_PATH: &str = "hatim-local.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}='{value}' is not a socket address: {source}")]
    InvalidAddr {
        var: &'static str,
        value: String,
        source: AddrParseError,
    },
    #[error("{var} must not be empty")]
    EmptyPath { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub http_addr: SocketAddr,
    /// SQLite file backing signed-in users' hatims and accounts.
    pub db_path: PathBuf,
    /// Guest-mode key/value file.
    pub local_storage_path: PathBuf,
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup(HTTP_ADDR_VAR).unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidAddr {
                var: HTTP_ADDR_VAR,
                value: addr.clone(),
                source,
            })?;

        Ok(Self {
            http_addr,
            db_path: path_var(&lookup, DB_PATH_VAR, DEFAULT_DB_PATH)?,
            local_storage_path: path_var(
                &lookup,
                LOCAL_STORAGE_PATH_VAR,
                DEFAULT_LOCAL_STORAGE_PATH,
            )?,
        })
    }
}

fn path_var<F>(lookup: &F, var: &'static str, default: &str) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(PathBuf::from(default)),
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyPath { var }),
        Some(value) => Ok(PathBuf::from(value.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = PlannerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.http_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.db_path, PathBuf::from("hatim.sqlite3"));
        assert_eq!(config.local_storage_path, PathBuf::from("hatim-local.json"));
    }

    #[test]
    fn overrides_and_errors() {
        let config = PlannerConfig::from_lookup(lookup_from(&[
            (HTTP_ADDR_VAR, "127.0.0.1:8080"),
            (DB_PATH_VAR, "/tmp/planner.db"),
        ]))
        .unwrap();
        assert_eq!(config.http_addr.port(), 8080);
        assert_eq!(config.db_path, PathBuf::from("/tmp/planner.db"));

        let err = PlannerConfig::from_lookup(lookup_from(&[(HTTP_ADDR_VAR, "not-an-addr")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddr { .. }));

        let err = PlannerConfig::from_lookup(lookup_from(&[(LOCAL_STORAGE_PATH_VAR, " ")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPath { .. }));
    }
}
