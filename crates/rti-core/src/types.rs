//! Shared data types for the token lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RtiError, RtiResult};

const REDACTED: &str = "[REDACTED]";

/// Which of the authority's API environments a credential set targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = RtiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "test" => Ok(Self::Sandbox),
            "production" | "live" => Ok(Self::Production),
            other => Err(RtiError::Configuration {
                message: format!("unknown environment '{}' (expected sandbox or production)", other),
            }),
        }
    }
}

/// Token issued by the authority's token endpoint.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Bearer token sent on API calls.
    pub access_token: String,

    /// Long-lived token used to obtain a new access token.
    #[serde(default)]
    pub refresh_token: String,

    /// Always "Bearer" for this authority.
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Lifetime in seconds, counted from `issued_at`.
    pub expires_in: i64,

    /// Granted scopes (space separated).
    #[serde(default)]
    pub scope: String,

    /// When the token was received. Not part of the wire response.
    #[serde(default = "Utc::now")]
    pub issued_at: DateTime<Utc>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuthToken {
    /// Instant after which the token is no longer accepted.
    ///
    /// A lifetime that does not fit the calendar is an invalid response.
    pub fn expires_at(&self) -> RtiResult<DateTime<Utc>> {
        TimeDelta::try_seconds(self.expires_in)
            .and_then(|lifetime| self.issued_at.checked_add_signed(lifetime))
            .ok_or_else(|| RtiError::InvalidResponse {
                message: format!("token lifetime out of range: expires_in={}", self.expires_in),
            })
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &REDACTED)
            .field("refresh_token", &redact(&self.refresh_token))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Credentials for one employer, owned and persisted by the caller.
///
/// `Debug` output never contains the secret, refresh token or access token.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialSet {
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,

    /// Expiry instant of `access_token`.
    #[serde(default)]
    pub token_expiry: Option<DateTime<Utc>>,

    #[serde(default)]
    pub environment: Environment,
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = |value: &Option<String>| value.as_deref().map(redact);
        f.debug_struct("CredentialSet")
            .field("client_id", &self.client_id)
            .field("client_secret", &secret(&self.client_secret))
            .field("refresh_token", &secret(&self.refresh_token))
            .field("access_token", &secret(&self.access_token))
            .field("token_expiry", &self.token_expiry)
            .field("environment", &self.environment)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        REDACTED
    }
}

impl CredentialSet {
    /// Store a freshly issued token in this credential set.
    ///
    /// Leaves the set untouched when the token's expiry cannot be computed.
    pub fn apply_token(&mut self, token: &OAuthToken) -> RtiResult<()> {
        let expiry = token.expires_at()?;
        self.access_token = Some(token.access_token.clone());
        if !token.refresh_token.is_empty() {
            self.refresh_token = Some(token.refresh_token.clone());
        }
        self.token_expiry = Some(expiry);
        Ok(())
    }

    /// Where this credential set sits in the token lifecycle at `now`.
    pub fn token_state(&self, buffer_secs: i64, now: DateTime<Utc>) -> TokenState {
        if !matches!(self.access_token.as_deref(), Some(t) if !t.is_empty()) {
            return TokenState::Missing;
        }
        match self.token_expiry {
            None => TokenState::Expired,
            Some(expiry) if now >= expiry => TokenState::Expired,
            Some(expiry) if buffer_deadline(now, buffer_secs) >= expiry => {
                TokenState::ExpiringSoon
            }
            Some(_) => TokenState::Valid,
        }
    }
}

/// `now + buffer_secs`, saturating at the calendar bounds.
pub(crate) fn buffer_deadline(now: DateTime<Utc>, buffer_secs: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(buffer_secs)
        .and_then(|buffer| now.checked_add_signed(buffer))
        .unwrap_or(if buffer_secs < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

/// Lifecycle state of the access token in a credential set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// No access token yet; an authorization code exchange is needed.
    Missing,
    /// Usable as is.
    Valid,
    /// Still accepted upstream but inside the refresh buffer.
    ExpiringSoon,
    /// Past its expiry, or expiry unknown.
    Expired,
}

impl TokenState {
    /// Whether the token must be refreshed before use.
    pub fn needs_refresh(&self) -> bool {
        !matches!(self, Self::Valid)
    }
}
