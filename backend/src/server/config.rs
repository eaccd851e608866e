//! Server settings loaded via OrthoConfig and the runtime configuration
//! derived from them.
//!
//! The boolean cookie toggles are not part of [`ServerSettings`]; they are
//! read from the environment by [`SessionToggles::from_env`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroize;

use retire_strong_backend::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
pub(crate) const COOKIE_SECURE_ENV: &str = "RETIRE_STRONG_COOKIE_SECURE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "RETIRE_STRONG_ALLOW_EPHEMERAL_KEY";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Errors raised while turning settings into a runnable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidFlag {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("invalid SameSite policy '{0}'; expected Strict|Lax|None")]
    SameSite(String),
    #[error("SameSite=None requires secure cookies")]
    InsecureSameSiteNone,
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Environment-driven server settings (`RETIRE_STRONG_*`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RETIRE_STRONG")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory storage is used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// File holding the cookie signing key material.
    pub session_key_file: Option<PathBuf>,
    /// `SameSite` policy for session cookies.
    pub same_site: Option<String>,
}

/// Cookie toggles read from `RETIRE_STRONG_COOKIE_SECURE` and
/// `RETIRE_STRONG_ALLOW_EPHEMERAL_KEY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToggles {
    /// Mark session cookies `Secure`. Defaults to `true`.
    pub cookie_secure: bool,
    /// Fall back to a generated key when the key file cannot be read.
    /// Defaults to `false`.
    pub allow_ephemeral_key: bool,
}

impl Default for SessionToggles {
    fn default() -> Self {
        Self {
            cookie_secure: true,
            allow_ephemeral_key: false,
        }
    }
}

impl SessionToggles {
    /// Read both toggles, keeping the default for unset variables.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            cookie_secure: flag_from_env(env, COOKIE_SECURE_ENV, defaults.cookie_secure)?,
            allow_ephemeral_key: flag_from_env(
                env,
                ALLOW_EPHEMERAL_ENV,
                defaults.allow_ephemeral_key,
            )?,
        })
    }
}

fn flag_from_env<E: Env>(env: &E, name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = env.string(name) else {
        return Ok(default);
    };
    parse_bool(value.trim()).ok_or(ConfigError::InvalidFlag {
        name,
        value,
        expected: BOOL_EXPECTED,
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| ConfigError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn session_key_file(&self) -> &Path {
        self.session_key_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_SESSION_KEY_FILE))
    }

    pub fn same_site(&self, toggles: SessionToggles) -> Result<SameSite, ConfigError> {
        let policy = match self.same_site.as_deref().map(str::trim) {
            None => SameSite::Lax,
            Some(value) if value.eq_ignore_ascii_case("strict") => SameSite::Strict,
            Some(value) if value.eq_ignore_ascii_case("lax") => SameSite::Lax,
            Some(value) if value.eq_ignore_ascii_case("none") => SameSite::None,
            Some(other) => return Err(ConfigError::SameSite(other.to_owned())),
        };
        if policy == SameSite::None && !toggles.cookie_secure {
            return Err(ConfigError::InsecureSameSiteNone);
        }
        Ok(policy)
    }

    /// Derive the cookie key from the key file.
    ///
    /// Debug builds, or `allow_ephemeral_key`, fall back to a generated key
    /// when the file is unreadable. A short key is always an error.
    pub fn session_key(&self, toggles: SessionToggles) -> Result<Key, ConfigError> {
        let path = self.session_key_file();
        match std::fs::read(path) {
            Ok(mut bytes) => {
                let length = bytes.len();
                if length < SESSION_KEY_MIN_LEN {
                    bytes.zeroize();
                    return Err(ConfigError::KeyTooShort {
                        path: path.to_path_buf(),
                        length,
                        min_len: SESSION_KEY_MIN_LEN,
                    });
                }
                let key = Key::derive_from(&bytes);
                bytes.zeroize();
                Ok(key)
            }
            Err(source) if cfg!(debug_assertions) || toggles.allow_ephemeral_key => {
                warn!(path = %path.display(), error = %source, "using temporary session key");
                Ok(Key::generate())
            }
            Err(source) => Err(ConfigError::KeyRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Everything needed to start the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
        }
    }

    /// Use PostgreSQL-backed repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
