//! Startup configuration.
//!
//! Secrets come straight from the process environment through
//! [`mockable::Env`] so parsing can be tested without touching real
//! variables. Everything else is layered by OrthoConfig (CLI, `INCIDENTS_*`
//! environment variables, config file). Numeric settings carry OrthoConfig
//! defaults; the rest fall back on access.

use std::net::SocketAddr;
use std::time::Duration;

use mockable::Env;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use tracing::warn;

use crate::outbound::persistence::DEFAULT_MAX_CONNECTIONS;

/// Environment variable holding the map and geocoding provider key.
pub const MAPS_API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";
/// Environment variable holding the PostgreSQL connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Key used when [`MAPS_API_KEY_ENV`] is unset.
pub const MAPS_API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_GEOCODING_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const DEFAULT_GEOCODING_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "http://localhost:5173";

/// Errors raised while assembling startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required environment variable is missing or blank.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A setting is present but cannot be parsed.
    #[error("invalid value for {name}='{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Secrets read from the environment.
#[derive(Clone)]
pub struct Secrets {
    /// Provider key shared by geocoding requests and map clients.
    pub maps_api_key: String,
    /// PostgreSQL connection string.
    pub database_url: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("maps_api_key", &"<redacted>")
            .field("database_url", &"<redacted>")
            .finish()
    }
}

/// Read [`Secrets`] from `env`.
///
/// A missing API key degrades to [`MAPS_API_KEY_PLACEHOLDER`] with a warning;
/// a missing database URL is an error.
///
/// # Examples
/// ```
/// use incident_backend::settings::{MAPS_API_KEY_PLACEHOLDER, secrets_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "DATABASE_URL" => Some("postgres://localhost/incidents".to_owned()),
///     _ => None,
/// });
///
/// let secrets = secrets_from_env(&env).expect("database url present");
/// assert_eq!(secrets.maps_api_key, MAPS_API_KEY_PLACEHOLDER);
/// ```
pub fn secrets_from_env<E: Env>(env: &E) -> Result<Secrets, SettingsError> {
    let maps_api_key = match non_blank(env.string(MAPS_API_KEY_ENV)) {
        Some(key) => key,
        None => {
            warn!("GOOGLE_MAPS_API_KEY not set; using placeholder key");
            MAPS_API_KEY_PLACEHOLDER.to_owned()
        }
    };
    let database_url =
        non_blank(env.string(DATABASE_URL_ENV)).ok_or(SettingsError::MissingEnv {
            name: DATABASE_URL_ENV,
        })?;

    Ok(Secrets {
        maps_api_key,
        database_url,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Server settings loaded via OrthoConfig.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "INCIDENTS")]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Geocoding provider endpoint.
    pub geocoding_endpoint: Option<String>,
    /// Geocoding request timeout in seconds.
    #[ortho_config(default = 10)]
    pub geocoding_timeout_secs: u64,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Comma-separated browser origins allowed by CORS.
    pub cors_allowed_origins: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            geocoding_endpoint: None,
            geocoding_timeout_secs: DEFAULT_GEOCODING_TIMEOUT_SECS,
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            cors_allowed_origins: None,
        }
    }
}

impl ServerSettings {
    /// Configured bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
            name: "bind_addr",
            value: raw.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Configured geocoding endpoint.
    pub fn geocoding_endpoint(&self) -> Result<Url, SettingsError> {
        let raw = self
            .geocoding_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GEOCODING_ENDPOINT);
        Url::parse(raw).map_err(|err| SettingsError::Invalid {
            name: "geocoding_endpoint",
            value: raw.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Geocoding timeout; values below one second are raised to one.
    pub fn geocoding_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoding_timeout_secs.max(1))
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.max(1)
    }

    /// Origins allowed to call the API from a browser, defaulting to the
    /// local frontend dev server.
    ///
    /// Every entry must be an absolute URL; wildcards are not accepted.
    pub fn cors_allowed_origins(&self) -> Result<Vec<String>, SettingsError> {
        let raw = self
            .cors_allowed_origins
            .as_deref()
            .unwrap_or(DEFAULT_CORS_ALLOWED_ORIGINS);
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                Url::parse(origin)
                    .map(|_| origin.to_owned())
                    .map_err(|err| SettingsError::Invalid {
                        name: "cors_allowed_origins",
                        value: origin.to_owned(),
                        reason: err.to_string(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for startup configuration parsing.

    use std::collections::HashMap;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use mockable::{DefaultEnv, MockEnv};
    use rstest::rstest;

    use super::*;

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

    #[rstest]
    fn secrets_read_both_variables() {
        let env = mock_env(&[
            (MAPS_API_KEY_ENV, "real-key"),
            (DATABASE_URL_ENV, "postgres://db/incidents"),
        ]);

        let secrets = secrets_from_env(&env).expect("secrets present");

        assert_eq!(secrets.maps_api_key, "real-key");
        assert_eq!(secrets.database_url, "postgres://db/incidents");
    }

    #[rstest]
    #[case(&[(DATABASE_URL_ENV, "postgres://db/incidents")])]
    #[case(&[(MAPS_API_KEY_ENV, "  "), (DATABASE_URL_ENV, "postgres://db/incidents")])]
    fn missing_api_key_falls_back_to_placeholder(#[case] vars: &[(&str, &str)]) {
        let secrets = secrets_from_env(&mock_env(vars)).expect("database url present");
        assert_eq!(secrets.maps_api_key, MAPS_API_KEY_PLACEHOLDER);
    }

    #[rstest]
    #[case(&[(MAPS_API_KEY_ENV, "real-key")])]
    #[case(&[(MAPS_API_KEY_ENV, "real-key"), (DATABASE_URL_ENV, "")])]
    fn missing_database_url_is_an_error(#[case] vars: &[(&str, &str)]) {
        let error = secrets_from_env(&mock_env(vars)).expect_err("database url missing");
        assert!(matches!(
            error,
            SettingsError::MissingEnv {
                name: DATABASE_URL_ENV
            }
        ));
    }

    #[rstest]
    fn secrets_debug_output_is_redacted() {
        let env = mock_env(&[
            (MAPS_API_KEY_ENV, "real-key"),
            (DATABASE_URL_ENV, "postgres://user:pw@db/incidents"),
        ]);
        let rendered = format!("{:?}", secrets_from_env(&env).expect("secrets present"));
        assert!(!rendered.contains("real-key"));
        assert!(!rendered.contains("pw@db"));
    }

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("incident-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env([
            ("INCIDENTS_BIND_ADDR", None::<String>),
            ("INCIDENTS_GEOCODING_ENDPOINT", None::<String>),
            ("INCIDENTS_GEOCODING_TIMEOUT_SECS", None::<String>),
            ("INCIDENTS_DB_MAX_CONNECTIONS", None::<String>),
            ("INCIDENTS_CORS_ALLOWED_ORIGINS", None::<String>),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default parses"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("valid addr")
        );
        assert_eq!(
            settings.geocoding_endpoint().expect("default parses").as_str(),
            DEFAULT_GEOCODING_ENDPOINT
        );
        assert_eq!(settings.geocoding_timeout(), Duration::from_secs(10));
        assert_eq!(settings.db_max_connections(), DEFAULT_MAX_CONNECTIONS);
        assert_eq!(
            settings.cors_allowed_origins().expect("default parses"),
            vec!["http://localhost:5173".to_owned()]
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("INCIDENTS_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "INCIDENTS_GEOCODING_ENDPOINT",
                Some("http://localhost:4010/geocode".to_owned()),
            ),
            ("INCIDENTS_GEOCODING_TIMEOUT_SECS", Some("3".to_owned())),
            ("INCIDENTS_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            (
                "INCIDENTS_CORS_ALLOWED_ORIGINS",
                Some("https://map.example.org, http://localhost:3000".to_owned()),
            ),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("override parses").port(),
            9000
        );
        assert_eq!(
            settings
                .geocoding_endpoint()
                .expect("override parses")
                .host_str(),
            Some("localhost")
        );
        assert_eq!(settings.geocoding_timeout(), Duration::from_secs(3));
        assert_eq!(settings.db_max_connections(), 4);
        assert_eq!(
            settings.cors_allowed_origins().expect("override parses"),
            vec![
                "https://map.example.org".to_owned(),
                "http://localhost:3000".to_owned(),
            ]
        );
    }

    #[rstest]
    fn zero_timeout_is_raised_to_one_second() {
        let settings = ServerSettings {
            geocoding_timeout_secs: 0,
            ..ServerSettings::default()
        };
        assert_eq!(settings.geocoding_timeout(), Duration::from_secs(1));
    }

    #[rstest]
    fn malformed_bind_addr_is_reported() {
        let settings = ServerSettings {
            bind_addr: Some("not-an-address".to_owned()),
            ..ServerSettings::default()
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::Invalid {
                name: "bind_addr",
                ..
            })
        ));
    }

    #[rstest]
    #[case("*")]
    #[case("http://localhost:5173, not an origin")]
    fn malformed_cors_origin_is_reported(#[case] raw: &str) {
        let settings = ServerSettings {
            cors_allowed_origins: Some(raw.to_owned()),
            ..ServerSettings::default()
        };
        assert!(matches!(
            settings.cors_allowed_origins(),
            Err(SettingsError::Invalid {
                name: "cors_allowed_origins",
                ..
            })
        ));
    }

    #[rstest]
    fn secrets_are_read_from_the_process_environment() {
        let _guard = lock_env([
            (MAPS_API_KEY_ENV, Some("process-key".to_owned())),
            (
                DATABASE_URL_ENV,
                Some("postgres://localhost/incidents".to_owned()),
            ),
        ]);

        let secrets = secrets_from_env(&DefaultEnv::new()).expect("secrets present");

        assert_eq!(secrets.maps_api_key, "process-key");
        assert_eq!(secrets.database_url, "postgres://localhost/incidents");
    }
}
