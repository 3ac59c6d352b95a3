//! Signing configuration for the token service.

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;

/// Minimum HS256 secret length in bytes (256 bits).
pub const MIN_SECRET_LEN: usize = 32;

/// Default token lifetime when none is configured.
pub const DEFAULT_LIFESPAN_MINUTES: i64 = 15;

/// Signing secret, issuer/audience identity and default lifetime.
///
/// Loaded once at process start and shared read-only. Deserializes from the
/// `JwtSettings` configuration section (`Secret`, `Issuer`, `Audience`,
/// `LifeSpanMinutes`).
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TokenSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    #[serde(default = "default_lifespan_minutes")]
    pub life_span_minutes: i64,
}

fn default_lifespan_minutes() -> i64 {
    DEFAULT_LIFESPAN_MINUTES
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    #[error("signing secret must be at least 32 bytes")]
    SecretTooShort,

    #[error("{0} must not be blank")]
    Blank(&'static str),

    #[error("token lifetime must be positive, got {0} minutes")]
    InvalidLifespan(i64),

    #[error("invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl TokenSettings {
    pub fn new(
        secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        life_span_minutes: i64,
    ) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            life_span_minutes,
        }
    }

    /// Read settings from `JWT_SECRET`, `JWT_ISSUER`, `JWT_AUDIENCE` and
    /// optionally `JWT_LIFESPAN_MINUTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let issuer = lookup("JWT_ISSUER").ok_or(ConfigError::Missing("JWT_ISSUER"))?;
        let audience = lookup("JWT_AUDIENCE").ok_or(ConfigError::Missing("JWT_AUDIENCE"))?;
        let life_span_minutes = match lookup("JWT_LIFESPAN_MINUTES") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
                key: "JWT_LIFESPAN_MINUTES",
                reason: e.to_string(),
            })?,
            None => DEFAULT_LIFESPAN_MINUTES,
        };

        let settings = Self::new(secret, issuer, audience, life_span_minutes);
        settings.validate()?;
        Ok(settings)
    }

    /// Parse a JSON `JwtSettings` section.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json).map_err(|e| ConfigError::Invalid {
            key: "JwtSettings",
            reason: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Startup-time sanity checks. A failure here is fatal for the process.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::Missing("Secret"));
        }
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort);
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::Blank("Issuer"));
        }
        if self.audience.trim().is_empty() {
            return Err(ConfigError::Blank("Audience"));
        }
        if self.life_span_minutes <= 0 {
            return Err(ConfigError::InvalidLifespan(self.life_span_minutes));
        }
        Ok(())
    }

    pub fn default_lifetime(&self) -> Duration {
        Duration::minutes(self.life_span_minutes)
    }
}

impl core::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("life_span_minutes", &self.life_span_minutes)
            .finish()
    }
}
