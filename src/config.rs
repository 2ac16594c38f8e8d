use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub allowed_origin: String,
    pub uploads_dir: String,
    pub auth_rps: u32,
    pub log_format: LogFormat,
    pub admin: Option<AdminSeed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Credentials for the admin account ensured at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let log_format = match env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Plain,
        };

        let admin = match (
            env::var("ADMIN_EMAIL").ok(),
            env::var("ADMIN_USERNAME").ok(),
            env::var("ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(username), Some(password)) => Some(AdminSeed {
                email,
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            port: get_env_parse_or("PORT", 8000)?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_ttl_hours: get_env_parse_or("JWT_TTL_HOURS", 168)?,
            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            uploads_dir: env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            auth_rps: get_env_parse_or("AUTH_RPS", 20)?,
            log_format,
            admin,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_numeric_variable_falls_back_to_default() {
        let port: u16 = get_env_parse_or("SKILLBRIDGE_TEST_UNSET_PORT", 8123).unwrap();
        assert_eq!(port, 8123);
    }

    #[test]
    fn unparsable_numeric_variable_is_a_config_error() {
        env::set_var("SKILLBRIDGE_TEST_BAD_RPS", "lots");
        let err = get_env_parse_or::<u32>("SKILLBRIDGE_TEST_BAD_RPS", 1).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("SKILLBRIDGE_TEST_BAD_RPS")));
    }
}
