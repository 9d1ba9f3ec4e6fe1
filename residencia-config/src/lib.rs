use core::fmt::{Debug, Display};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "residencia.toml";
pub const ENV_PREFIX: &str = "RESIDENCIA_";
/// One year.
pub const MAX_TOKEN_LIFETIME_HOURS: i64 = 24 * 366;

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub token_lifetime_hours: i64,
    /// Treats every request as the built-in administrator. Never enable this in production.
    pub insecure_dev_mode: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_lifetime_hours: 8,
            insecure_dev_mode: false,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct OccupancyConfig {
    /// Reject a room change when the target already holds as many active residents as its type allows.
    pub enforce_room_capacity: bool,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub stock_check_cron: String,
    pub daily_summary_cron: String,
    pub sender: String,
    /// Staff category that receives low-stock alerts.
    pub stock_alert_category: String,
    pub summary_pause_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stock_check_cron: "0 6 * * *".to_owned(),
            daily_summary_cron: "0 6 * * *".to_owned(),
            sender: "Residencia <notificaciones@residencia.com>".to_owned(),
            stock_alert_category: "Enfermero".to_owned(),
            summary_pause_ms: 1000,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: usize,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub occupancy: OccupancyConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

const fn default_listen_address() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 3001))
}

const fn default_max_connections() -> usize {
    10
}

impl Config {
    /// The signing secret, or `None` in dev mode without one.
    #[must_use]
    pub fn jwt_secret(&self) -> Option<&str> {
        self.auth.jwt_secret.as_deref().filter(|secret| !secret.is_empty())
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.jwt_secret().is_none() && !self.auth.insecure_dev_mode {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.auth.token_lifetime_hours <= 0 {
            return Err(ConfigError::Invalid(
                "auth.token_lifetime_hours must be positive".to_owned(),
            ));
        }
        if self.auth.token_lifetime_hours > MAX_TOKEN_LIFETIME_HOURS {
            return Err(ConfigError::Invalid(format!(
                "auth.token_lifetime_hours must be at most {MAX_TOKEN_LIFETIME_HOURS}"
            )));
        }
        if self.database_max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database_max_connections must be positive".to_owned(),
            ));
        }
        Ok(self)
    }
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
    #[error(
        "auth.jwt_secret is not set (set RESIDENCIA_AUTH__JWT_SECRET or enable \
         auth.insecure_dev_mode for local development)"
    )]
    MissingJwtSecret,
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[must_use]
pub fn figment() -> Figment {
    Figment::new()
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn get_config() -> Result<Config, ConfigError> {
    figment().extract::<Config>()?.validate()
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                database_url = "postgres://localhost/residencia"

                [auth]
                jwt_secret = "s3cret"
                "#,
            )?;
            let config = get_config().map_err(|err| err.to_string())?;
            assert_eq!(config.listen_address.port(), 3001);
            assert_eq!(config.database_max_connections, 10);
            assert_eq!(config.auth.token_lifetime_hours, 8);
            assert!(!config.auth.insecure_dev_mode);
            assert!(!config.occupancy.enforce_room_capacity);
            assert_eq!(config.notifications.stock_check_cron, "0 6 * * *");
            assert_eq!(config.notifications.stock_alert_category, "Enfermero");
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                database_url = "postgres://localhost/residencia"
                [auth]
                jwt_secret = "from-file"
                "#,
            )?;
            jail.set_env("RESIDENCIA_AUTH__JWT_SECRET", "from-env");
            jail.set_env("RESIDENCIA_OCCUPANCY__ENFORCE_ROOM_CAPACITY", "true");
            jail.set_env("RESIDENCIA_LISTEN_ADDRESS", "127.0.0.1:8080");
            let config = get_config().map_err(|err| err.to_string())?;
            assert_eq!(config.jwt_secret(), Some("from-env"));
            assert!(config.occupancy.enforce_room_capacity);
            assert_eq!(config.listen_address.port(), 8080);
            Ok(())
        });
    }

    #[test]
    fn missing_secret_is_rejected_outside_dev_mode() {
        Jail::expect_with(|jail| {
            jail.set_env("RESIDENCIA_DATABASE_URL", "postgres://localhost/residencia");
            assert!(matches!(get_config(), Err(ConfigError::MissingJwtSecret)));

            jail.set_env("RESIDENCIA_AUTH__INSECURE_DEV_MODE", "true");
            let config = get_config().map_err(|err| err.to_string())?;
            assert!(config.jwt_secret().is_none());
            Ok(())
        });
    }

    #[test]
    fn token_lifetime_is_bounded() {
        Jail::expect_with(|jail| {
            jail.set_env("RESIDENCIA_DATABASE_URL", "postgres://localhost/residencia");
            jail.set_env("RESIDENCIA_AUTH__JWT_SECRET", "x");
            jail.set_env("RESIDENCIA_AUTH__TOKEN_LIFETIME_HOURS", "9223372036854775807");
            assert!(matches!(get_config(), Err(ConfigError::Invalid(_))));

            jail.set_env("RESIDENCIA_AUTH__TOKEN_LIFETIME_HOURS", "0");
            assert!(matches!(get_config(), Err(ConfigError::Invalid(_))));

            jail.set_env(
                "RESIDENCIA_AUTH__TOKEN_LIFETIME_HOURS",
                MAX_TOKEN_LIFETIME_HOURS.to_string(),
            );
            let config = get_config().map_err(|err| err.to_string())?;
            assert_eq!(config.auth.token_lifetime_hours, MAX_TOKEN_LIFETIME_HOURS);
            Ok(())
        });
    }

    #[test]
    fn missing_database_url_is_an_error() {
        Jail::expect_with(|jail| {
            jail.set_env("RESIDENCIA_AUTH__JWT_SECRET", "x");
            assert!(matches!(get_config(), Err(ConfigError::Figment(_))));
            Ok(())
        });
    }
}
