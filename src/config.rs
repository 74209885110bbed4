use axum::http::HeaderValue;
use envconfig::Envconfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("MEDICINS_ALLOWED_ORIGIN is not a valid origin: {0:?}")]
    InvalidOrigin(String),
}

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    #[envconfig(from = "DATABASE_URL", default = "sqlite://gestion_stock.db")]
    pub database_url: String,

    #[envconfig(from = "SERVER_HOST", default = "0.0.0.0")]
    pub server_host: String,

    #[envconfig(from = "SERVER_PORT", default = "5050")]
    pub server_port: u16,

    /// Only origin allowed to call the stock routes from a browser.
    #[envconfig(from = "MEDICINS_ALLOWED_ORIGIN", default = "http://localhost:5173")]
    pub medicins_allowed_origin: String,

    /// Six-field cron expression; the stock check is off when unset.
    #[envconfig(from = "STOCK_CHECK_CRON")]
    pub stock_check_cron: Option<String>,

    /// Lots expiring within this many days raise an alert.
    #[envconfig(from = "EXPIRY_WINDOW_DAYS", default = "180")]
    pub expiry_window_days: i64,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Parses `MEDICINS_ALLOWED_ORIGIN` into a header value.
    ///
    /// Returns:
    /// - `Err(ConfigError::InvalidOrigin)` if the value is empty or cannot be
    ///   sent as a header.
    pub fn allowed_origin(&self) -> Result<HeaderValue, ConfigError> {
        let origin = self.medicins_allowed_origin.trim();
        if origin.is_empty() {
            return Err(ConfigError::InvalidOrigin(self.medicins_allowed_origin.clone()));
        }
        origin
            .parse()
            .map_err(|_| ConfigError::InvalidOrigin(self.medicins_allowed_origin.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_the_front_end() {
        let config = Config::init_from_hashmap(&HashMap::new()).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5050");
        assert_eq!(config.allowed_origin().unwrap(), "http://localhost:5173");
        assert_eq!(config.stock_check_cron, None);
        assert_eq!(config.expiry_window_days, 180);
    }

    #[test]
    fn overrides_are_read() {
        let vars = HashMap::from([
            ("SERVER_PORT".to_string(), "8081".to_string()),
            ("STOCK_CHECK_CRON".to_string(), "0 0 8 * * *".to_string()),
            ("EXPIRY_WINDOW_DAYS".to_string(), "30".to_string()),
        ]);
        let config = Config::init_from_hashmap(&vars).unwrap();

        assert_eq!(config.server_port, 8081);
        assert_eq!(config.stock_check_cron.as_deref(), Some("0 0 8 * * *"));
        assert_eq!(config.expiry_window_days, 30);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let vars = HashMap::from([("SERVER_PORT".to_string(), "port".to_string())]);
        assert!(Config::init_from_hashmap(&vars).is_err());
    }

    #[test]
    fn invalid_origin_is_an_error() {
        for origin in ["http://local\nhost:5173", "   "] {
            let vars = HashMap::from([("MEDICINS_ALLOWED_ORIGIN".to_string(), origin.to_string())]);
            let config = Config::init_from_hashmap(&vars).unwrap();

            assert!(matches!(
                config.allowed_origin(),
                Err(ConfigError::InvalidOrigin(_))
            ));
        }
    }
}
