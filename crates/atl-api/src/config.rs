//! # Service Configuration
//!
//! Built once at startup from environment variables. Cryptographic
//! parameters are explicit values here and are handed to each operation;
//! nothing reads the environment after [`AppConfig::from_env`] returns.
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | `8080` |
//! | `DATABASE_URL` | unset |
//! | `POSTGRES_HOST`, `POSTGRES_PORT`, `POSTGRES_DB`, `POSTGRES_USER`, `POSTGRES_PASSWORD` | unset, port `5432` |
//! | `ATL_DB_MAX_CONNECTIONS` | `20` |
//! | `ATL_KDF_ITERATIONS` | `60000` |
//! | `ATL_HASH_MEMORY_KIB`, `ATL_HASH_ITERATIONS`, `ATL_HASH_PARALLELISM` | Argon2id defaults |
//! | `ATL_CREDENTIAL_PEPPER` | unset (hex) |
//! | `ATL_MAX_BODY_BYTES` | `65536` |
//! | `ATL_LOG_FORMAT` | `text` |
//!
//! With neither `DATABASE_URL` nor `POSTGRES_HOST` set the service runs on
//! the in-memory store.

use std::fmt;
use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;
use zeroize::Zeroizing;

use atl_crypto::{HashParams, KdfParams};

/// Configuration could not be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("invalid value for {var}: {reason}")]
    Invalid {
        /// Environment variable name.
        var: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// A variable required by another was missing.
    #[error("{var} is required when {because} is set")]
    Missing {
        /// The missing variable.
        var: &'static str,
        /// The variable that requires it.
        because: &'static str,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Where the Postgres store lives.
#[derive(Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// A full connection URL.
    Url(Zeroizing<String>),
    /// Discrete connection parameters.
    Parts {
        /// Server host.
        host: String,
        /// Server port.
        port: u16,
        /// Database name.
        database: Option<String>,
        /// Login role.
        user: Option<String>,
        /// Login password.
        password: Option<Zeroizing<String>>,
    },
}

impl fmt::Debug for DatabaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(_) => f.write_str("Url([REDACTED])"),
            Self::Parts {
                host,
                port,
                database,
                user,
                password,
            } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("database", database)
                .field("user", user)
                .field("password", &password.as_ref().map(|_| "[REDACTED]"))
                .finish(),
        }
    }
}

/// Postgres connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection target.
    pub target: DatabaseTarget,
    /// Pool ceiling.
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Build SQLx connect options.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match &self.target {
            DatabaseTarget::Url(url) => PgConnectOptions::from_str(url),
            DatabaseTarget::Parts {
                host,
                port,
                database,
                user,
                password,
            } => {
                let mut opts = PgConnectOptions::new().host(host).port(*port);
                if let Some(db) = database {
                    opts = opts.database(db);
                }
                if let Some(user) = user {
                    opts = opts.username(user);
                }
                if let Some(pw) = password {
                    opts = opts.password(pw);
                }
                Ok(opts)
            }
        }
    }
}

/// Service configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Postgres settings. `None` selects the in-memory store.
    pub database: Option<DatabaseConfig>,
    /// Envelope key derivation parameters.
    pub kdf: KdfParams,
    /// Argon2id parameters for new hashes and the verification sentinel.
    pub hash: HashParams,
    /// Argon2 secret input for credential hashes.
    pub pepper: Option<Zeroizing<Vec<u8>>>,
    /// Largest accepted request body on gated routes.
    pub max_body_bytes: usize,
    /// Log line format.
    pub log_format: LogFormat,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("database", &self.database)
            .field("kdf", &self.kdf)
            .field("hash", &self.hash)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .field("max_body_bytes", &self.max_body_bytes)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database: None,
            kdf: KdfParams::default(),
            hash: HashParams::default(),
            pepper: None,
            max_body_bytes: 64 * 1024,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = parse_or(&get, "PORT", defaults.port)?;
        let max_connections = parse_or(&get, "ATL_DB_MAX_CONNECTIONS", 20u32)?;

        let target = if let Some(url) = get("DATABASE_URL") {
            Some(DatabaseTarget::Url(Zeroizing::new(url)))
        } else if let Some(host) = get("POSTGRES_HOST") {
            Some(DatabaseTarget::Parts {
                host,
                port: parse_or(&get, "POSTGRES_PORT", 5432u16)?,
                database: get("POSTGRES_DB"),
                user: get("POSTGRES_USER"),
                password: get("POSTGRES_PASSWORD").map(Zeroizing::new),
            })
        } else {
            if get("POSTGRES_PASSWORD").is_some() || get("POSTGRES_USER").is_some() {
                return Err(ConfigError::Missing {
                    var: "POSTGRES_HOST",
                    because: "POSTGRES_USER or POSTGRES_PASSWORD",
                });
            }
            None
        };
        let database = target.map(|target| DatabaseConfig {
            target,
            max_connections,
        });

        let kdf = KdfParams::with_iterations(parse_or(
            &get,
            "ATL_KDF_ITERATIONS",
            defaults.kdf.iterations,
        )?);
        kdf.validate().map_err(|e| ConfigError::Invalid {
            var: "ATL_KDF_ITERATIONS",
            reason: e.to_string(),
        })?;

        let hash = HashParams {
            memory_kib: parse_or(&get, "ATL_HASH_MEMORY_KIB", defaults.hash.memory_kib)?,
            iterations: parse_or(&get, "ATL_HASH_ITERATIONS", defaults.hash.iterations)?,
            parallelism: parse_or(&get, "ATL_HASH_PARALLELISM", defaults.hash.parallelism)?,
        };

        let pepper = match get("ATL_CREDENTIAL_PEPPER") {
            Some(hex_pepper) => Some(Zeroizing::new(hex::decode(hex_pepper.trim()).map_err(
                |e| ConfigError::Invalid {
                    var: "ATL_CREDENTIAL_PEPPER",
                    reason: format!("expected hex: {e}"),
                },
            )?)),
            None => None,
        };

        let max_body_bytes = parse_or(&get, "ATL_MAX_BODY_BYTES", defaults.max_body_bytes)?;

        let log_format = match get("ATL_LOG_FORMAT").as_deref().map(str::to_ascii_lowercase) {
            None => LogFormat::Text,
            Some(v) if v == "text" => LogFormat::Text,
            Some(v) if v == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "ATL_LOG_FORMAT",
                    reason: format!("expected text or json, got {other}"),
                })
            }
        };

        Ok(Self {
            port,
            database,
            kdf,
            hash,
            pepper,
            max_body_bytes,
            log_format,
        })
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert!(cfg.database.is_none());
        assert_eq!(cfg.kdf, KdfParams::default());
        assert_eq!(cfg.hash, HashParams::default());
        assert!(cfg.pepper.is_none());
        assert_eq!(cfg.log_format, LogFormat::Text);
    }

    #[test]
    fn database_url_wins_over_parts() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://u:p@db/atl"),
            ("POSTGRES_HOST", "other"),
        ])
        .unwrap();
        let db = cfg.database.unwrap();
        assert!(matches!(db.target, DatabaseTarget::Url(_)));
        assert_eq!(db.max_connections, 20);
    }

    #[test]
    fn postgres_parts_are_collected() {
        let cfg = config(&[
            ("POSTGRES_HOST", "db.internal"),
            ("POSTGRES_PORT", "6543"),
            ("POSTGRES_DB", "translations"),
            ("POSTGRES_USER", "atl"),
            ("POSTGRES_PASSWORD", "hunter2"),
        ])
        .unwrap();
        match cfg.database.unwrap().target {
            DatabaseTarget::Parts {
                host, port, database, user, ..
            } => {
                assert_eq!(host, "db.internal");
                assert_eq!(port, 6543);
                assert_eq!(database.as_deref(), Some("translations"));
                assert_eq!(user.as_deref(), Some("atl"));
            }
            other => panic!("unexpected target {other:?}"),
        }
    }

    #[test]
    fn credentials_without_host_rejected() {
        assert!(matches!(
            config(&[("POSTGRES_PASSWORD", "x")]),
            Err(ConfigError::Missing { var: "POSTGRES_HOST", .. })
        ));
    }

    #[test]
    fn bad_port_rejected() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { var: "PORT", .. })
        ));
    }

    #[test]
    fn zero_kdf_iterations_rejected() {
        assert!(config(&[("ATL_KDF_ITERATIONS", "0")]).is_err());
        assert_eq!(
            config(&[("ATL_KDF_ITERATIONS", "1000")]).unwrap().kdf.iterations,
            1000
        );
    }

    #[test]
    fn pepper_is_hex() {
        let cfg = config(&[("ATL_CREDENTIAL_PEPPER", "deadbeef")]).unwrap();
        assert_eq!(cfg.pepper.unwrap().as_slice(), &[0xde, 0xad, 0xbe, 0xef]);
        assert!(config(&[("ATL_CREDENTIAL_PEPPER", "xyz")]).is_err());
    }

    #[test]
    fn log_format_parses() {
        assert_eq!(
            config(&[("ATL_LOG_FORMAT", "JSON")]).unwrap().log_format,
            LogFormat::Json
        );
        assert!(config(&[("ATL_LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let cfg = config(&[("PORT", ""), ("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert!(cfg.database.is_none());
    }

    #[test]
    fn debug_redacts_secrets() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://u:supersecret@db/atl"),
            ("ATL_CREDENTIAL_PEPPER", "deadbeef"),
        ])
        .unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("supersecret"));
        assert!(!dbg.contains("deadbeef"));
    }

    #[test]
    fn parts_build_connect_options() {
        let cfg = config(&[("POSTGRES_HOST", "localhost"), ("POSTGRES_DB", "atl")]).unwrap();
        let opts = cfg.database.unwrap().connect_options().unwrap();
        assert_eq!(opts.get_host(), "localhost");
        assert_eq!(opts.get_port(), 5432);
        assert_eq!(opts.get_database(), Some("atl"));
    }
}
