use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    pub kafka: KafkaConfig,
    pub payments: PaymentsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// HS256 signing key. No default: startup fails when unset.
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_expiration_days")]
    pub expiration_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    /// Argon2 time cost applied to every hash.
    #[serde(default = "default_password_iterations")]
    pub iterations: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            iterations: default_password_iterations(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,
}

/// Backing store for payment requests.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStoreKind {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentsConfig {
    #[serde(default)]
    pub merchant_id: String,
    #[serde(default = "default_merchant_name")]
    pub merchant_name: String,
    /// HMAC key shared with the payment provider. No default.
    #[serde(default)]
    pub webhook_secret: String,
    #[serde(default = "default_expiry_minutes")]
    pub expiry_minutes: i64,
    #[serde(default = "default_minimum_amount")]
    pub minimum_amount: i64,
    #[serde(default = "default_store")]
    pub store: PaymentStoreKind,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default)]
    pub simulation_enabled: bool,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_expiration_days() -> i64 {
    7
}

fn default_password_iterations() -> u32 {
    2
}

fn default_message_timeout_ms() -> u64 {
    5000
}

fn default_merchant_name() -> String {
    "Marketplace".to_string()
}

fn default_expiry_minutes() -> i64 {
    15
}

fn default_minimum_amount() -> i64 {
    1000
}

fn default_store() -> PaymentStoreKind {
    PaymentStoreKind::Postgres
}

fn default_sweep_interval_secs() -> u64 {
    60
}

/// Configuration that loaded but must not be run with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("jwt.secret must be at least {min} bytes (got {actual})")]
    WeakJwtSecret { min: usize, actual: usize },

    #[error("payments.webhook_secret is required")]
    MissingWebhookSecret,

    #[error("payments.merchant_id is required")]
    MissingMerchantId,

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: i64 },

    #[error("{field} must be at most {max} (got {value})")]
    TooLarge {
        field: &'static str,
        value: i64,
        max: i64,
    },
}

const MAX_EXPIRATION_DAYS: i64 = 365;
const MAX_EXPIRY_MINUTES: i64 = 24 * 60;

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, PAYMENTS__WEBHOOK_SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    /// Refuse configurations that would run without mandatory secrets.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let secret_len = self.jwt.secret.len();
        if secret_len < auth::JwtHandler::MIN_SECRET_LEN {
            return Err(ConfigValidationError::WeakJwtSecret {
                min: auth::JwtHandler::MIN_SECRET_LEN,
                actual: secret_len,
            });
        }

        if self.payments.webhook_secret.trim().is_empty() {
            return Err(ConfigValidationError::MissingWebhookSecret);
        }

        if self.payments.merchant_id.trim().is_empty() {
            return Err(ConfigValidationError::MissingMerchantId);
        }

        for (field, value) in [
            ("jwt.expiration_days", self.jwt.expiration_days),
            ("payments.expiry_minutes", self.payments.expiry_minutes),
            ("payments.minimum_amount", self.payments.minimum_amount),
            ("password.iterations", self.password.iterations as i64),
            (
                "payments.sweep_interval_secs",
                i64::try_from(self.payments.sweep_interval_secs).unwrap_or(i64::MAX),
            ),
        ] {
            if value <= 0 {
                return Err(ConfigValidationError::NotPositive { field, value });
            }
        }

        for (field, value, max) in [
            ("jwt.expiration_days", self.jwt.expiration_days, MAX_EXPIRATION_DAYS),
            ("payments.expiry_minutes", self.payments.expiry_minutes, MAX_EXPIRY_MINUTES),
        ] {
            if value > max {
                return Err(ConfigValidationError::TooLarge { field, value, max });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            database: DatabaseConfig {
                url: "postgres://localhost/marketplace".to_string(),
                max_connections: 5,
                acquire_timeout_secs: 5,
            },
            server: ServerConfig { http_port: 3000 },
            jwt: JwtConfig {
                secret: "0123456789abcdef0123456789abcdef".to_string(),
                expiration_days: 7,
            },
            password: PasswordConfig::default(),
            kafka: KafkaConfig {
                brokers: "localhost:9092".to_string(),
                topic: "payment-events".to_string(),
                message_timeout_ms: 5000,
            },
            payments: PaymentsConfig {
                merchant_id: "ID1020304050607".to_string(),
                merchant_name: "Marketplace".to_string(),
                webhook_secret: "whsec".to_string(),
                expiry_minutes: 15,
                minimum_amount: 1000,
                store: PaymentStoreKind::Memory,
                sweep_interval_secs: 60,
                simulation_enabled: false,
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn test_short_or_missing_jwt_secret_fails_closed() {
        let mut config = valid();
        config.jwt.secret = String::new();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::WeakJwtSecret { min: 32, actual: 0 })
        );

        config.jwt.secret = "short".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::WeakJwtSecret { actual: 5, .. })
        ));
    }

    #[test]
    fn test_payment_secrets_required() {
        let mut config = valid();
        config.payments.webhook_secret = "  ".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::MissingWebhookSecret)
        );

        let mut config = valid();
        config.payments.merchant_id = String::new();
        assert_eq!(config.validate(), Err(ConfigValidationError::MissingMerchantId));
    }

    #[test]
    fn test_durations_must_be_positive_and_bounded() {
        let mut config = valid();
        config.payments.sweep_interval_secs = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::NotPositive {
                field: "payments.sweep_interval_secs",
                value: 0
            })
        );

        let mut config = valid();
        config.payments.expiry_minutes = 1441;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::TooLarge {
                field: "payments.expiry_minutes",
                value: 1441,
                max: 1440
            })
        );

        let mut config = valid();
        config.jwt.expiration_days = i64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::TooLarge {
                field: "jwt.expiration_days",
                ..
            })
        ));

        let mut config = valid();
        config.jwt.expiration_days = 365;
        config.payments.expiry_minutes = 1440;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_double_underscore_env_vars_override_files() {
        let vars = [
            ("JWT__SECRET", "env-secret-env-secret-env-secret-env"),
            ("PAYMENTS__WEBHOOK_SECRET", "env-webhook-secret"),
            ("PAYMENTS__MERCHANT_ID", "ID9988776655443"),
            ("DATABASE__URL", "postgres://env-host/marketplace"),
            ("SERVER__HTTP_PORT", "4010"),
            ("KAFKA__TOPIC", "env-payment-events"),
        ];
        for (key, value) in vars {
            env::set_var(key, value);
        }

        let loaded = Config::load();

        for (key, _) in vars {
            env::remove_var(key);
        }

        let config = loaded.unwrap();
        assert_eq!(config.jwt.secret, "env-secret-env-secret-env-secret-env");
        assert_eq!(config.payments.webhook_secret, "env-webhook-secret");
        assert_eq!(config.payments.merchant_id, "ID9988776655443");
        assert_eq!(config.database.url, "postgres://env-host/marketplace");
        assert_eq!(config.server.http_port, 4010);
        assert_eq!(config.kafka.topic, "env-payment-events");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_payment_store_kind_deserializes_lowercase() {
        let kind: PaymentStoreKind = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(kind, PaymentStoreKind::Memory);
        assert!(serde_json::from_str::<PaymentStoreKind>("\"redis\"").is_err());
    }
}
