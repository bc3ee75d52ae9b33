/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, 署名シークレット, CORS 許可, Stripe など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,

    // HS256 で credential を署名・検証する共有シークレット
    pub access_token_secret: String,
    pub credential_ttl_seconds: u64,
    pub credential_leeway_seconds: u64,

    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: Url,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print secrets
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("credential_ttl_seconds", &self.credential_ttl_seconds)
            .field("stripe_enabled", &self.stripe_secret_key.is_some())
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        );

        let sqids_min_length = std::env::var("SQIDS_MIN_LENGTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        let sqids_alphabet = std::env::var("SQIDS_ALPHABET").unwrap_or_else(|_| {
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string()
        });

        let access_token_secret = std::env::var("ACCESS_TOKEN_SECRET")
            .map_err(|_| ConfigError::Missing("ACCESS_TOKEN_SECRET"))?;
        if access_token_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_SECRET"));
        }

        let credential_ttl_seconds =
            parse_credential_ttl(std::env::var("CREDENTIAL_TTL_SECONDS").ok().as_deref())?;

        let credential_leeway_seconds = std::env::var("CREDENTIAL_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let stripe_secret_key = std::env::var("STRIPE_SECRET_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let stripe_api_base = Url::parse(
            &std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
        )
        .map_err(|_| ConfigError::Invalid("STRIPE_API_BASE"))?;

        Ok(Self {
            addr,
            database_url,
            db_max_connections,
            app_env,
            cors_allowed_origins,
            sqids_min_length,
            sqids_alphabet,
            access_token_secret,
            credential_ttl_seconds,
            credential_leeway_seconds,
            stripe_secret_key,
            stripe_api_base,
        })
    }
}

const DEFAULT_CREDENTIAL_TTL_SECONDS: u64 = 31_536_000; // 365 days
const MAX_CREDENTIAL_TTL_SECONDS: u64 = 100 * 31_536_000;

/// Unset → 365 days. Set but unparseable, zero, or beyond 100 years → Invalid.
fn parse_credential_ttl(raw: Option<&str>) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_CREDENTIAL_TTL_SECONDS);
    };

    match raw.trim().parse::<u64>() {
        Ok(ttl) if (1..=MAX_CREDENTIAL_TTL_SECONDS).contains(&ttl) => Ok(ttl),
        _ => Err(ConfigError::Invalid("CREDENTIAL_TTL_SECONDS")),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_empty_entries_dropped() {
        let origins = parse_origins(" http://localhost:5173 ,, https://teach-em.example.com/ ");
        assert_eq!(
            origins,
            vec![
                "http://localhost:5173".to_string(),
                "https://teach-em.example.com".to_string()
            ]
        );
    }

    #[test]
    fn credential_ttl_defaults_to_a_year() {
        assert_eq!(parse_credential_ttl(None).unwrap(), 31_536_000);
        assert_eq!(parse_credential_ttl(Some(" 3600 ")).unwrap(), 3600);
    }

    #[test]
    fn credential_ttl_out_of_range_is_rejected() {
        let huge = (1u64 << 63).to_string();
        let max = (i64::MAX as u64).to_string();
        for raw in ["0", "-1", "abc", huge.as_str(), max.as_str()] {
            assert!(
                matches!(
                    parse_credential_ttl(Some(raw)),
                    Err(ConfigError::Invalid("CREDENTIAL_TTL_SECONDS"))
                ),
                "{raw}"
            );
        }
    }

    #[test]
    fn config_error_names_the_key() {
        let err = ConfigError::Missing("ACCESS_TOKEN_SECRET");
        assert_eq!(err.to_string(), "missing configuration: ACCESS_TOKEN_SECRET");
    }
}
