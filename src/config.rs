use std::time::Duration;

use anyhow::{bail, Context};
use axum::http::HeaderValue;

const DEFAULT_TOKEN_TTL: &str = "7d";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
/// Longest accepted token lifetime (10 years).
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl: Duration,
}

/// Argon2id cost parameters. Defaults are the argon2 crate's recommended
/// values (19 MiB memory, 2 passes, 1 lane).
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Per-client request limits over a fixed window. `/api/auth` gets its own,
/// stricter budget on top of the global one.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
    pub auth_max_requests: u32,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15 * 60),
            max_requests: 100,
            auth_max_requests: 5,
            trust_proxy: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub cors_origin: HeaderValue,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        let ttl_raw =
            std::env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| DEFAULT_TOKEN_TTL.into());
        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "trossets".into()),
            ttl: parse_ttl(&ttl_raw)
                .with_context(|| format!("invalid JWT_EXPIRES_IN value {ttl_raw:?}"))?,
        };

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: env_or("PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: env_or("PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: env_or("PASSWORD_HASH_PARALLELISM", defaults.parallelism)?,
        };

        let limits = RateLimitConfig::default();
        let window_secs: u64 = env_or("RATE_LIMIT_WINDOW_SECS", limits.window.as_secs())?;
        if window_secs == 0 {
            bail!("RATE_LIMIT_WINDOW_SECS must be positive");
        }
        let rate_limit = RateLimitConfig {
            window: Duration::from_secs(window_secs),
            max_requests: env_or("RATE_LIMIT_MAX", limits.max_requests)?,
            auth_max_requests: env_or("AUTH_RATE_LIMIT_MAX", limits.auth_max_requests)?,
            trust_proxy: env_or("TRUST_PROXY", limits.trust_proxy)?,
        };

        let cors_raw = std::env::var("CORS_ORIGIN")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.into());
        let cors_origin = HeaderValue::from_str(&cors_raw)
            .with_context(|| format!("invalid CORS_ORIGIN value {cors_raw:?}"))?;

        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 3001)?,
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            cors_origin,
            jwt,
            password,
            rate_limit,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid {key} value {v:?}")),
        Err(_) => Ok(default),
    }
}

/// Parses a token lifetime such as `7d`, `12h`, `30m`, `45s` or a bare number
/// of seconds.
pub fn parse_ttl(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let amount: u64 = digits.parse().context("expected a leading number")?;
    let unit_secs: u64 = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        other => bail!("unknown unit {other:?}"),
    };
    let secs = amount
        .checked_mul(unit_secs)
        .context("token lifetime overflows")?;
    if secs == 0 {
        bail!("token lifetime must be positive");
    }
    if secs > MAX_TOKEN_TTL_SECS {
        bail!("token lifetime exceeds {MAX_TOKEN_TTL_SECS} seconds");
    }
    Ok(Duration::from_secs(secs))
}
