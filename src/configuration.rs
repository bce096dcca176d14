use std::path::PathBuf;

use jsonwebtoken::Algorithm;

use crate::auth::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::error::ConfigError;

/// Fallback secret for local development; startup warns when it is used.
pub const DEVELOPMENT_SECRET: &str = "development-secret-change-me-in-production";

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    pub password: PasswordSettings,
    pub storage: StorageSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub name: String,
    pub version: String,
    pub host: String,
    pub port: u16,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// JWT signing settings
#[derive(serde::Deserialize, Clone, Debug)]
pub struct JwtSettings {
    pub secret: String,
    /// HMAC algorithm name: HS256, HS384 or HS512
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
}

impl JwtSettings {
    /// Parses the configured algorithm, accepting only the HMAC family.
    pub fn signing_algorithm(&self) -> Result<Algorithm, ConfigError> {
        let algorithm: Algorithm = self.algorithm.parse().map_err(|_| {
            ConfigError::InvalidValue(format!("unknown JWT algorithm '{}'", self.algorithm))
        })?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
            other => Err(ConfigError::InvalidValue(format!(
                "JWT algorithm {:?} needs a key pair; only HS256/HS384/HS512 are supported",
                other
            ))),
        }
    }

    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_token_expire_minutes)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct PasswordSettings {
    pub min_length: usize,
    pub max_length: usize,
    pub bcrypt_cost: u32,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct StorageSettings {
    pub users_file: PathBuf,
}

impl Settings {
    pub fn uses_development_secret(&self) -> bool {
        self.jwt.secret == DEVELOPMENT_SECRET
    }

    /// Rejects combinations the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::InvalidValue("jwt.secret must not be empty".into()));
        }
        self.jwt.signing_algorithm()?;

        if self.jwt.access_token_expire_minutes <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt.access_token_expire_minutes must be positive".into(),
            ));
        }

        if self.password.min_length > self.password.max_length {
            return Err(ConfigError::InvalidValue(format!(
                "password.min_length ({}) exceeds password.max_length ({})",
                self.password.min_length, self.password.max_length
            )));
        }

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.password.bcrypt_cost) {
            return Err(ConfigError::InvalidValue(format!(
                "password.bcrypt_cost must be within {}..={}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            )));
        }

        Ok(())
    }
}

/// Loads settings from defaults, an optional `configuration` file and
/// `APP_`-prefixed environment variables, in that order of precedence.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.name", "Auth API")?
        .set_default("application.version", env!("CARGO_PKG_VERSION"))?
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000_i64)?
        .set_default("application.json_logs", true)?
        .set_default("jwt.secret", DEVELOPMENT_SECRET)?
        .set_default("jwt.algorithm", "HS256")?
        .set_default("jwt.access_token_expire_minutes", 30_i64)?
        .set_default("password.min_length", 6_i64)?
        .set_default("password.max_length", 72_i64)?
        .set_default("password.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?
        .set_default("storage.users_file", "users.json")?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            application: ApplicationSettings {
                name: "Auth API".to_string(),
                version: "1.0.0".to_string(),
                host: "127.0.0.1".to_string(),
                port: 0,
                json_logs: false,
            },
            jwt: JwtSettings {
                secret: "test-secret-key-at-least-32-characters-long".to_string(),
                algorithm: "HS256".to_string(),
                access_token_expire_minutes: 30,
            },
            password: PasswordSettings {
                min_length: 6,
                max_length: 72,
                bcrypt_cost: MIN_BCRYPT_COST,
            },
            storage: StorageSettings {
                users_file: PathBuf::from("users.json"),
            },
        }
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(test_settings().validate().is_ok());
    }

    #[test]
    fn test_hmac_algorithms_are_accepted() {
        let mut settings = test_settings();
        for name in ["HS256", "HS384", "HS512"] {
            settings.jwt.algorithm = name.to_string();
            assert!(settings.jwt.signing_algorithm().is_ok(), "{name}");
        }
    }

    #[test]
    fn test_asymmetric_algorithm_is_rejected() {
        let mut settings = test_settings();
        settings.jwt.algorithm = "RS256".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        let mut settings = test_settings();
        settings.jwt.algorithm = "none".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_inverted_password_bounds_are_rejected() {
        let mut settings = test_settings();
        settings.password.min_length = 80;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_non_positive_ttl_is_rejected() {
        let mut settings = test_settings();
        settings.jwt.access_token_expire_minutes = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_defaults_load_without_file_or_env() {
        let settings = get_configuration().expect("defaults should load");
        assert_eq!(settings.jwt.algorithm, "HS256");
        assert_eq!(settings.password.min_length, 6);
        assert_eq!(settings.password.max_length, 72);
    }
}
