//! Environment-driven settings.
//!
//! Everything the server needs at startup is read through [`mockable::Env`]
//! so parsing can be tested without touching the process environment.
//! Development tolerates missing or invalid values with a warning;
//! production refuses to start instead.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use actix_web::cookie::Key;
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

use crate::inbound::http::error_boundary::ErrorDisclosure;

use super::session_key::{derive_key, key_fingerprint};

pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";
pub const NODE_ENV_ENV: &str = "NODE_ENV";
pub const PORT_ENV: &str = "PORT";
pub const UPLOAD_DIR_ENV: &str = "UPLOAD_DIR";
pub const PUBLIC_DIR_ENV: &str = "PUBLIC_DIR";
pub const VIEWS_DIR_ENV: &str = "VIEWS_DIR";

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_UPLOAD_DIR: &str = "public/uploads";
pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const DEFAULT_VIEWS_DIR: &str = "views";

/// Shortest secret accepted in production, in bytes.
pub const SESSION_SECRET_MIN_LEN: usize = 32;

const DEVELOPMENT_SECRET: &str = "portal-development-session-secret-not-for-production";

/// Whether the process runs as a production deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    /// `production` selects [`RunMode::Production`]; anything else, including
    /// an unset variable, is development.
    ///
    /// # Examples
    /// ```
    /// use portal::server::RunMode;
    ///
    /// assert_eq!(RunMode::from_node_env(Some("production")), RunMode::Production);
    /// assert_eq!(RunMode::from_node_env(Some("staging")), RunMode::Development);
    /// assert_eq!(RunMode::from_node_env(None), RunMode::Development);
    /// ```
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some("production") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Cookie key material, wiped from memory on drop.
pub struct SessionSecret {
    bytes: Vec<u8>,
    placeholder: bool,
}

impl SessionSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            placeholder: false,
        }
    }

    fn development_placeholder() -> Self {
        Self {
            bytes: DEVELOPMENT_SECRET.as_bytes().to_vec(),
            placeholder: true,
        }
    }

    pub fn expose(&self) -> &[u8] {
        &self.bytes
    }

    /// True when no secret was configured and the built-in development value
    /// is in use.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSecret")
            .field("len", &self.bytes.len())
            .field("placeholder", &self.placeholder)
            .finish()
    }
}

impl Drop for SessionSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Errors raised while reading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{name} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        name: &'static str,
        length: usize,
        min_len: usize,
    },
    #[error("failed to derive session key: {0}")]
    Key(String),
}

/// Parsed process settings.
#[derive(Debug)]
pub struct AppSettings {
    pub mode: RunMode,
    pub port: u16,
    pub session_secret: SessionSecret,
    pub upload_dir: PathBuf,
    pub public_dir: PathBuf,
    pub views_dir: PathBuf,
}

impl AppSettings {
    /// Read settings from `env`.
    ///
    /// # Examples
    /// ```
    /// use mockable::MockEnv;
    /// use portal::server::{AppSettings, RunMode};
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| match name {
    ///     "NODE_ENV" => Some("production".into()),
    ///     "SESSION_SECRET" => Some("x".repeat(48)),
    ///     _ => None,
    /// });
    ///
    /// let settings = AppSettings::from_env(&env)?;
    /// assert_eq!(settings.mode, RunMode::Production);
    /// assert_eq!(settings.port, 4000);
    /// # Ok::<(), portal::server::SettingsError>(())
    /// ```
    pub fn from_env<E: Env>(env: &E) -> Result<Self, SettingsError> {
        let mode = RunMode::from_node_env(env.string(NODE_ENV_ENV).as_deref());
        Ok(Self {
            mode,
            port: port_from_env(env, mode)?,
            session_secret: session_secret_from_env(env, mode)?,
            upload_dir: dir_from_env(env, UPLOAD_DIR_ENV, DEFAULT_UPLOAD_DIR),
            public_dir: dir_from_env(env, PUBLIC_DIR_ENV, DEFAULT_PUBLIC_DIR),
            views_dir: dir_from_env(env, VIEWS_DIR_ENV, DEFAULT_VIEWS_DIR),
        })
    }

    /// All interfaces on the configured port.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Session cookies are `Secure` only in production.
    pub fn cookie_secure(&self) -> bool {
        self.mode.is_production()
    }

    pub fn disclosure(&self) -> ErrorDisclosure {
        if self.mode.is_production() {
            ErrorDisclosure::Generic
        } else {
            ErrorDisclosure::Detailed
        }
    }
}

/// Inputs for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) disclosure: ErrorDisclosure,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) public_dir: PathBuf,
}

impl ServerConfig {
    /// Derive the cookie key and log its fingerprint.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SettingsError> {
        let key = derive_key(&settings.session_secret)?;
        tracing::info!(
            fingerprint = %key_fingerprint(&key),
            mode = ?settings.mode,
            "session key ready"
        );
        Ok(Self {
            key,
            cookie_secure: settings.cookie_secure(),
            disclosure: settings.disclosure(),
            bind_addr: settings.bind_addr(),
            public_dir: settings.public_dir.clone(),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

fn port_from_env<E: Env>(env: &E, mode: RunMode) -> Result<u16, SettingsError> {
    let Some(value) = env.string(PORT_ENV) else {
        return Ok(DEFAULT_PORT);
    };
    match value.trim().parse::<u16>() {
        Ok(port) => Ok(port),
        Err(_) if !mode.is_production() => {
            warn!(value = %value, "invalid PORT; defaulting to {DEFAULT_PORT}");
            Ok(DEFAULT_PORT)
        }
        Err(_) => Err(SettingsError::InvalidEnv {
            name: PORT_ENV,
            value,
            expected: "0-65535",
        }),
    }
}

fn session_secret_from_env<E: Env>(
    env: &E,
    mode: RunMode,
) -> Result<SessionSecret, SettingsError> {
    let value = env.string(SESSION_SECRET_ENV).filter(|v| !v.is_empty());
    match (value, mode) {
        (Some(value), RunMode::Production) if value.len() < SESSION_SECRET_MIN_LEN => {
            Err(SettingsError::SecretTooShort {
                name: SESSION_SECRET_ENV,
                length: value.len(),
                min_len: SESSION_SECRET_MIN_LEN,
            })
        }
        (Some(value), RunMode::Development) if value.len() < SESSION_SECRET_MIN_LEN => {
            warn!(
                length = value.len(),
                "SESSION_SECRET shorter than {SESSION_SECRET_MIN_LEN} bytes; acceptable for development only"
            );
            Ok(SessionSecret::new(value))
        }
        (Some(value), _) => Ok(SessionSecret::new(value)),
        (None, RunMode::Production) => Err(SettingsError::MissingEnv {
            name: SESSION_SECRET_ENV,
        }),
        (None, RunMode::Development) => {
            warn!("SESSION_SECRET not set; using an insecure development secret");
            Ok(SessionSecret::development_placeholder())
        }
    }
}

fn dir_from_env<E: Env>(env: &E, name: &'static str, default: &str) -> PathBuf {
    env.string(name)
        .filter(|value| !value.trim().is_empty())
        .map_or_else(|| PathBuf::from(default), PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;
    use std::collections::HashMap;

    fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    fn expect_error(result: Result<AppSettings, SettingsError>, label: &str) -> SettingsError {
        match result {
            Ok(_) => panic!("{label}"),
            Err(error) => error,
        }
    }

    const STRONG: &str = "0123456789abcdef0123456789abcdef";

    #[rstest]
    fn development_defaults() {
        let settings = AppSettings::from_env(&mock_env(&[])).expect("defaults are valid");
        assert_eq!(settings.mode, RunMode::Development);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.bind_addr().to_string(), "0.0.0.0:4000");
        assert!(settings.session_secret.is_placeholder());
        assert!(!settings.cookie_secure());
        assert_eq!(settings.disclosure(), ErrorDisclosure::Detailed);
        assert_eq!(settings.upload_dir, PathBuf::from("public/uploads"));
        assert_eq!(settings.public_dir, PathBuf::from("public"));
        assert_eq!(settings.views_dir, PathBuf::from("views"));
    }

    #[rstest]
    fn production_reads_everything() {
        let settings = AppSettings::from_env(&mock_env(&[
            (NODE_ENV_ENV, "production"),
            (SESSION_SECRET_ENV, STRONG),
            (PORT_ENV, "8081"),
            (UPLOAD_DIR_ENV, "/srv/uploads"),
            (PUBLIC_DIR_ENV, "/srv/public"),
            (VIEWS_DIR_ENV, "/srv/views"),
        ]))
        .expect("valid production settings");
        assert!(settings.cookie_secure());
        assert_eq!(settings.disclosure(), ErrorDisclosure::Generic);
        assert_eq!(settings.port, 8081);
        assert_eq!(settings.session_secret.expose(), STRONG.as_bytes());
        assert!(!settings.session_secret.is_placeholder());
        assert_eq!(settings.upload_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(settings.public_dir, PathBuf::from("/srv/public"));
        assert_eq!(settings.views_dir, PathBuf::from("/srv/views"));
    }

    #[rstest]
    fn production_requires_a_secret() {
        let error = expect_error(
            AppSettings::from_env(&mock_env(&[(NODE_ENV_ENV, "production")])),
            "missing secret must fail",
        );
        assert!(matches!(
            error,
            SettingsError::MissingEnv {
                name: SESSION_SECRET_ENV
            }
        ));
    }

    #[rstest]
    fn production_rejects_short_secrets() {
        let error = expect_error(
            AppSettings::from_env(&mock_env(&[
                (NODE_ENV_ENV, "production"),
                (SESSION_SECRET_ENV, "short"),
            ])),
            "short secret must fail",
        );
        assert!(matches!(
            error,
            SettingsError::SecretTooShort {
                length: 5,
                min_len: SESSION_SECRET_MIN_LEN,
                ..
            }
        ));
    }

    #[rstest]
    fn development_accepts_short_secrets() {
        let settings = AppSettings::from_env(&mock_env(&[(SESSION_SECRET_ENV, "short")]))
            .expect("development tolerates short secrets");
        assert_eq!(settings.session_secret.expose(), b"short");
    }

    #[rstest]
    #[case(RunMode::Development, true)]
    #[case(RunMode::Production, false)]
    fn invalid_port_depends_on_mode(#[case] mode: RunMode, #[case] tolerated: bool) {
        let node_env = if mode.is_production() {
            "production"
        } else {
            "development"
        };
        let result = AppSettings::from_env(&mock_env(&[
            (NODE_ENV_ENV, node_env),
            (SESSION_SECRET_ENV, STRONG),
            (PORT_ENV, "http"),
        ]));
        match result {
            Ok(settings) => {
                assert!(tolerated, "production must reject PORT=http");
                assert_eq!(settings.port, DEFAULT_PORT);
            }
            Err(error) => {
                assert!(!tolerated, "development must tolerate PORT=http");
                assert!(matches!(error, SettingsError::InvalidEnv { name: PORT_ENV, .. }));
            }
        }
    }

    #[rstest]
    fn secret_debug_output_is_redacted() {
        let secret = SessionSecret::new(STRONG);
        let debug = format!("{secret:?}");
        assert!(!debug.contains(STRONG));
        assert!(debug.contains("len: 32"));
    }

    #[rstest]
    fn server_config_follows_settings() {
        let settings = AppSettings::from_env(&mock_env(&[
            (NODE_ENV_ENV, "production"),
            (SESSION_SECRET_ENV, STRONG),
        ]))
        .expect("valid settings");
        let config = ServerConfig::from_settings(&settings).expect("key derives");
        assert!(config.cookie_secure);
        assert_eq!(config.disclosure, ErrorDisclosure::Generic);
        assert_eq!(config.bind_addr().port(), DEFAULT_PORT);
    }
}
