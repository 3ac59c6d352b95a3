//! HS256 JWT issuance and verification.
//!
//! Issuance reads the injected [`Clock`] and [`TokenIdGenerator`]; verification
//! checks signature, issuer, audience and expiry (zero skew) against the same
//! clock. [`TokenService::validate_token`] collapses every failure into
//! `false`; [`TokenService::verify`] keeps the reason.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use securefile_core::{Clock, SystemClock, UserId};

use crate::claims::{ClaimSet, names};
use crate::principal::Principal;
use crate::settings::{ConfigError, TokenSettings};

/// Source of unique `jti` values.
pub trait TokenIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUIDv4 token ids.
#[derive(Debug, Default, Copy, Clone)]
pub struct RandomTokenIds;

impl TokenIdGenerator for RandomTokenIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenIssueError {
    #[error("token lifetime must be at least one second")]
    InvalidLifetime,

    #[error("token expiry is out of range")]
    ExpiryOutOfRange,

    #[error("scope '{0}' contains whitespace")]
    ScopeContainsWhitespace(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Why a token was rejected.
///
/// Only visible to code calling [`TokenService::verify`]; the boolean
/// boundary never exposes it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("signature does not match")]
    SignatureInvalid,

    #[error("unsupported signing algorithm")]
    UnsupportedAlgorithm,

    #[error("issuer mismatch")]
    IssuerMismatch,

    #[error("audience mismatch")]
    AudienceMismatch,

    #[error("missing required claim '{0}'")]
    MissingClaim(String),

    #[error("token has expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for TokenValidationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenValidationError::SignatureInvalid,
            ErrorKind::InvalidAlgorithm => TokenValidationError::UnsupportedAlgorithm,
            ErrorKind::InvalidIssuer => TokenValidationError::IssuerMismatch,
            ErrorKind::InvalidAudience => TokenValidationError::AudienceMismatch,
            ErrorKind::MissingRequiredClaim(claim) => {
                TokenValidationError::MissingClaim(claim.clone())
            }
            ErrorKind::ExpiredSignature => TokenValidationError::Expired,
            _ => TokenValidationError::Malformed(err.to_string()),
        }
    }
}

/// JWT payload: registered claims plus the flattened principal claims.
///
/// Registered claims default when absent so the decoder's required-claim
/// check reports them instead of a deserialization error.
#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    #[serde(default)]
    iss: String,
    #[serde(default)]
    aud: Audience,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(default)]
    exp: i64,
    #[serde(flatten)]
    claims: ClaimSet,
}

/// `aud` as written by this service (one string) or by other issuers (an
/// array).
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Default for Audience {
    fn default() -> Self {
        Audience::One(String::new())
    }
}

/// A token whose signature, issuer, audience and expiry have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    claims: ClaimSet,
    issuer: String,
    audience: String,
    issued_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
}

impl VerifiedToken {
    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn into_principal(self) -> Principal {
        Principal::from_verified(self.claims)
    }
}

/// Issues and verifies access tokens for one signing configuration.
///
/// Holds only immutable state; share it behind an `Arc` across requests.
pub struct TokenService {
    settings: TokenSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn TokenIdGenerator>,
}

impl TokenService {
    /// Build a service after validating `settings`.
    pub fn new(
        settings: TokenSettings,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn TokenIdGenerator>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;

        let encoding_key = EncodingKey::from_secret(settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.secret.as_bytes());

        // Expiry is checked against the injected clock, not by the decoder.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);

        Ok(Self {
            settings,
            encoding_key,
            decoding_key,
            validation,
            clock,
            ids,
        })
    }

    /// Wall clock and random UUID token ids.
    pub fn with_system_clock(settings: TokenSettings) -> Result<Self, ConfigError> {
        Self::new(settings, Arc::new(SystemClock), Arc::new(RandomTokenIds))
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Token for an authenticated user: `sub`, `name`, `email`, one `groups`
    /// claim per entry (order and duplicates kept) and a fresh `jti`.
    pub fn issue_user_token<G: AsRef<str>>(
        &self,
        user_id: UserId,
        display_name: &str,
        email: &str,
        groups: &[G],
        lifetime: Option<Duration>,
    ) -> Result<String, TokenIssueError> {
        let mut claims = ClaimSet::new()
            .with(names::SUBJECT, user_id.to_string())
            .with(names::NAME, display_name)
            .with(names::EMAIL, email);
        for group in groups {
            claims.push(names::GROUPS, group.as_ref());
        }
        self.sign(claims, lifetime)
    }

    /// Token carrying a single `scope` claim, passed through verbatim.
    pub fn issue_resource_token(
        &self,
        scope: impl Into<String>,
        lifetime: Option<Duration>,
    ) -> Result<String, TokenIssueError> {
        self.sign(ClaimSet::new().with(names::SCOPE, scope), lifetime)
    }

    /// Token whose `scope` claim is `scopes` joined by single spaces.
    ///
    /// A scope containing whitespace would be split apart on read, so it is
    /// rejected instead.
    pub fn issue_multi_resource_token<S: AsRef<str>>(
        &self,
        scopes: &[S],
        lifetime: Option<Duration>,
    ) -> Result<String, TokenIssueError> {
        let scopes: Vec<&str> = scopes.iter().map(|s| s.as_ref()).collect();
        if let Some(bad) = scopes.iter().find(|s| s.chars().any(char::is_whitespace)) {
            return Err(TokenIssueError::ScopeContainsWhitespace(bad.to_string()));
        }
        self.sign(ClaimSet::new().with(names::SCOPE, scopes.join(" ")), lifetime)
    }

    /// `true` iff the token verifies at the clock's current instant.
    pub fn validate_token(&self, token: &str) -> bool {
        match self.verify(token) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(reason = %err, "token rejected");
                false
            }
        }
    }

    /// Verify at the clock's current instant.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenValidationError> {
        self.verify_at(token, self.clock.now())
    }

    /// Verify against an explicit instant. The token is expired once
    /// `now >= exp`.
    ///
    /// An array `aud` is accepted when it contains the configured audience;
    /// [`VerifiedToken::audience`] then reports that entry.
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedToken, TokenValidationError> {
        let data = jsonwebtoken::decode::<TokenPayload>(token, &self.decoding_key, &self.validation)?;
        let payload = data.claims;

        let expires_at = DateTime::from_timestamp(payload.exp, 0)
            .ok_or_else(|| TokenValidationError::Malformed("exp out of range".to_string()))?;
        if now >= expires_at {
            return Err(TokenValidationError::Expired);
        }

        Ok(VerifiedToken {
            claims: payload.claims,
            issuer: payload.iss,
            // The decoder already checked that `aud` holds the configured value.
            audience: match payload.aud {
                Audience::One(aud) => aud,
                Audience::Many(_) => self.settings.audience.clone(),
            },
            issued_at: payload.iat.and_then(|t| DateTime::from_timestamp(t, 0)),
            expires_at,
        })
    }

    fn sign(&self, mut claims: ClaimSet, lifetime: Option<Duration>) -> Result<String, TokenIssueError> {
        let lifetime = lifetime.unwrap_or_else(|| self.settings.default_lifetime());
        let lifetime_secs = lifetime.num_seconds();
        if lifetime_secs < 1 {
            return Err(TokenIssueError::InvalidLifetime);
        }

        // Whole-second resolution: exp = trunc(now) + lifetime, so a clock
        // with a sub-second fraction yields a token up to 1s shorter.
        let issued_at = self.clock.now().timestamp();
        let expires_at = issued_at
            .checked_add(lifetime_secs)
            .filter(|exp| DateTime::from_timestamp(*exp, 0).is_some())
            .ok_or(TokenIssueError::ExpiryOutOfRange)?;

        let jti = self.ids.next_id();
        claims.push(names::TOKEN_ID, jti.as_str());

        let payload = TokenPayload {
            iss: self.settings.issuer.clone(),
            aud: Audience::One(self.settings.audience.clone()),
            iat: Some(issued_at),
            exp: expires_at,
            claims,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| TokenIssueError::Signing(e.to_string()))?;

        tracing::debug!(jti = %jti, exp = expires_at, "issued token");
        Ok(token)
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
