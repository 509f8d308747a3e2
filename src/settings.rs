use chrono_tz::Tz;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub backend_base_url: Url,
    pub debug: bool,
    pub enable_swagger: bool,
    pub port: u16,
    pub timezone: String,
    pub horizon_days: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // Load from environment variables with APP_ prefix
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("backend_base_url", "http://localhost:8000/api/")?
            .set_default("debug", false)?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default("timezone", "UTC")?
            .set_default("horizon_days", 31)?
            .build()?;

        let settings: Self = config.try_deserialize()?;
        settings.tz()?;
        Ok(settings)
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone.parse::<Tz>().map_err(|err| {
            ConfigError::Message(format!("invalid timezone {}: {err}", self.timezone))
        })
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        for key in ["APP_TIMEZONE", "APP_PORT", "APP_BACKEND_BASE_URL"] {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.horizon_days, 31);
        assert_eq!(settings.tz().unwrap(), chrono_tz::UTC);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("APP_TIMEZONE", "Europe/Warsaw");
            std::env::set_var("APP_PORT", "9090");
            std::env::set_var("APP_BACKEND_BASE_URL", "https://api.example.com/v1/");
        }
        let settings = Settings::from_env().unwrap();
        clear_env();
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.tz().unwrap(), chrono_tz::Europe::Warsaw);
        assert_eq!(settings.backend_base_url.as_str(), "https://api.example.com/v1/");
    }

    #[test]
    #[serial]
    fn test_invalid_timezone_rejected() {
        clear_env();
        unsafe { std::env::set_var("APP_TIMEZONE", "Mars/Olympus") };
        let result = Settings::from_env();
        clear_env();
        assert!(result.is_err());
    }
}
