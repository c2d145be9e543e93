use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Runtime configuration, loaded once at startup from the environment.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub secret: String,
    pub gateway_url: String,
    pub gateway_key_id: String,
    pub gateway_key_secret: String,
    pub currency: String,
    pub upload_dir: String,
    pub file_size_limit: usize,
    pub admin_password: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "3000"),
            database_url: must_load("DATABASE_URL"),
            secret: must_load("SECRET"),
            gateway_url: try_load("GATEWAY_URL", "https://api.gateway.test"),
            gateway_key_id: try_load("GATEWAY_KEY_ID", ""),
            gateway_key_secret: try_load("GATEWAY_KEY_SECRET", ""),
            currency: try_load("CURRENCY", "INR"),
            upload_dir: try_load("UPLOAD_DIR", "./uploads"),
            file_size_limit: try_load("FILE_SIZE_LIMIT", "5242880"),
            admin_password: try_load("ADMIN_PASSWORD", "ChangeMe15"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| ())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default:?}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured")
}

fn must_load(key: &str) -> String {
    var(key)
        .map_err(|_| {
            warn!("Required environment variable {key} is not set");
        })
        .expect("Environment misconfigured")
}
