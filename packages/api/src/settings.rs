//! Server settings: built-in defaults, then an optional `config.toml`, then
//! `CRM_*` environment variables (`CRM_REST_URL` -> `rest.url`).

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    /// Socket address to bind, e.g. `0.0.0.0:8080`.
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rest {
    /// Base URL of the JSON:API backend.
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    /// Name of the session cookie.
    pub cookie: String,
    pub secure: bool,
    /// Inactivity expiry in days.
    pub days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub rest: Rest,
    pub session: Session,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("server.address", "127.0.0.1:8080")?
            .set_default("rest.url", "http://localhost:3000/api/v2")?
            .set_default("session.cookie", "crm.session")?
            .set_default("session.secure", false)?
            .set_default("session.days", 7)?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("CRM")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::set_var;

    #[test]
    fn test_settings() {
        set_var("CRM_REST_URL", "https://api.example.org/api/v2");
        set_var("CRM_SESSION_SECURE", "true");
        let settings = Settings::new().unwrap();
        assert_eq!(settings.rest.url, "https://api.example.org/api/v2");
        assert!(settings.session.secure);
        assert_eq!(settings.session.cookie, "crm.session");
        assert_eq!(settings.session.days, 7);
        assert_eq!(settings.server.address, "127.0.0.1:8080");
    }
}
