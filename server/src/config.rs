//! Process configuration read from the environment.

use crate::error::ConfigError;

pub const DEFAULT_DATABASE: &str = "todoApp";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Connection string of the document store (`STORE_URI`).
    pub store_uri: String,
    pub database: String,
    /// Host name or address to bind; resolved when the listener is bound.
    pub host: String,
    pub port: u16,
    /// The one origin allowed to make cross-origin calls; `None` disables CORS.
    pub allowed_origin: Option<String>,
    pub log_json: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Absent keys take their defaults;
    /// only `STORE_URI` is required.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store_uri = lookup("STORE_URI")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("STORE_URI"))?;
        let database = lookup("STORE_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let host = match lookup("HOST") {
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::Invalid { var: "HOST", value: raw })
            }
            Some(raw) => raw,
            None => DEFAULT_HOST.to_string(),
        };
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let allowed_origin = match lookup("CORS_ORIGIN") {
            Some(origin) if origin.trim().is_empty() => None,
            Some(origin) => Some(origin),
            None => Some(DEFAULT_CORS_ORIGIN.to_string()),
        };

        let log_json = match lookup("LOG_JSON") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { var: "LOG_JSON", value: raw })?,
            None => false,
        };

        Ok(Self {
            store_uri,
            database,
            host,
            port,
            allowed_origin,
            log_json,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn store_uri_is_required() {
        let err = config(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("STORE_URI")));
        assert_eq!(err.to_string(), "STORE_URI environment variable is not defined");
    }

    #[test]
    fn blank_store_uri_counts_as_missing() {
        assert!(matches!(
            config(&[("STORE_URI", "  ")]),
            Err(ConfigError::Missing("STORE_URI"))
        ));
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("STORE_URI", "memory://todoApp")]).unwrap();
        assert_eq!(cfg.database, "todoApp");
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.allowed_origin.as_deref(), Some("http://localhost:5173"));
        assert!(!cfg.log_json);
    }

    #[test]
    fn overrides_apply() {
        let cfg = config(&[
            ("STORE_URI", "mongodb://db.internal:27017"),
            ("STORE_DATABASE", "other"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("CORS_ORIGIN", "https://todo.example.org"),
            ("LOG_JSON", "true"),
        ])
        .unwrap();
        assert_eq!(cfg.store_uri, "mongodb://db.internal:27017");
        assert_eq!(cfg.database, "other");
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.allowed_origin.as_deref(), Some("https://todo.example.org"));
        assert!(cfg.log_json);
    }

    #[test]
    fn empty_cors_origin_disables_cors() {
        let cfg = config(&[("STORE_URI", "memory://x"), ("CORS_ORIGIN", "")]).unwrap();
        assert!(cfg.allowed_origin.is_none());
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = config(&[("STORE_URI", "memory://x"), ("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
    }

    #[tokio::test]
    async fn host_name_is_resolved_at_bind() {
        let cfg = config(&[("STORE_URI", "memory://x"), ("HOST", "localhost"), ("PORT", "0")]).unwrap();
        assert_eq!(cfg.host, "localhost");
        let listener = tokio::net::TcpListener::bind((cfg.host.as_str(), cfg.port))
            .await
            .unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[test]
    fn blank_host_is_rejected() {
        let err = config(&[("STORE_URI", "memory://x"), ("HOST", " ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "HOST", .. }));
    }

    #[test]
    fn bad_log_flag_is_rejected() {
        let err = config(&[("STORE_URI", "memory://x"), ("LOG_JSON", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "LOG_JSON", .. }));
    }
}
