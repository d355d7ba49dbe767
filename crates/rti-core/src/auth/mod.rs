//! OAuth2 token lifecycle for the authority's API.
//!
//! Covers authorization URL construction, code-for-token exchange, refresh,
//! expiry evaluation, and [`TokenManager::get_valid_access_token`], which
//! returns a usable access token for a caller-owned [`CredentialSet`].
//!
//! Nothing here retries. A failed exchange or refresh is returned to the
//! caller as is.
//!
//! # Concurrency
//!
//! `get_valid_access_token` is not synchronized. Two submissions racing on an
//! expiring token will both refresh. Callers should hold a lock per credential
//! set (for example keyed by employer PAYE reference) around the call so that
//! refresh hooks do not interleave.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngCore;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info};
use url::Url;

use crate::config::RtiConfig;
use crate::error::{RtiError, RtiResult};
use crate::types::{buffer_deadline, CredentialSet, Environment, OAuthToken};

mod http;

use http::TokenEndpoint;

const USER_AGENT_VALUE: &str = concat!("rti-core/", env!("CARGO_PKG_VERSION"));

/// Called with the new token after a successful refresh.
///
/// This is the caller's persistence hook; the core never stores tokens.
#[async_trait]
pub trait RefreshHook: Send + Sync {
    async fn on_refreshed(&self, token: &OAuthToken) -> RtiResult<()>;
}

#[async_trait]
impl<F> RefreshHook for F
where
    F: Fn(&OAuthToken) -> RtiResult<()> + Send + Sync,
{
    async fn on_refreshed(&self, token: &OAuthToken) -> RtiResult<()> {
        self(token)
    }
}

/// Authorization URL together with the anti-forgery state it carries.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: Url,
    /// Must match the `state` echoed back on the redirect.
    pub state: String,
}

/// Token lifecycle manager.
#[derive(Debug, Clone)]
pub struct TokenManager {
    endpoint: TokenEndpoint,
    config: RtiConfig,
}

impl TokenManager {
    pub fn new(config: RtiConfig) -> RtiResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| RtiError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint: TokenEndpoint { client },
            config,
        })
    }

    pub fn from_env() -> RtiResult<Self> {
        Self::new(RtiConfig::from_env())
    }

    pub fn config(&self) -> &RtiConfig {
        &self.config
    }

    /// Build the URL the user is sent to for granting access.
    pub fn authorization_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scope: &str,
        environment: Environment,
    ) -> RtiResult<Url> {
        Ok(self
            .authorization_request(client_id, redirect_uri, scope, environment)?
            .url)
    }

    /// Like [`authorization_url`](Self::authorization_url) but also hands
    /// back the generated `state`.
    pub fn authorization_request(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scope: &str,
        environment: Environment,
    ) -> RtiResult<AuthorizationRequest> {
        let base = self.config.base_url(environment);
        let mut url =
            Url::parse(&format!("{}/oauth/authorize", base)).map_err(|e| {
                RtiError::Configuration {
                    message: format!("invalid {} base URL '{}': {}", environment, base, e),
                }
            })?;

        let state = generate_state();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", scope)
            .append_pair("state", &state);

        Ok(AuthorizationRequest { url, state })
    }

    /// Exchange an authorization code for a token.
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
        environment: Environment,
    ) -> RtiResult<OAuthToken> {
        let token = self
            .endpoint
            .request_token(
                self.config.base_url(environment),
                client_id,
                client_secret,
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", redirect_uri),
                ],
            )
            .await?;

        info!(
            environment = %environment,
            expires_in = token.expires_in,
            token_type = %token.token_type,
            "obtained access token from authorization code"
        );
        Ok(token)
    }

    /// Obtain a new token from a refresh token.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
        client_id: &str,
        client_secret: &str,
        environment: Environment,
    ) -> RtiResult<OAuthToken> {
        let token = self
            .endpoint
            .request_token(
                self.config.base_url(environment),
                client_id,
                client_secret,
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                ],
            )
            .await?;

        info!(
            environment = %environment,
            expires_in = token.expires_in,
            token_type = %token.token_type,
            "refreshed access token"
        );
        Ok(token)
    }

    /// Return a usable access token, refreshing it when needed.
    ///
    /// After a refresh, `on_refreshed` receives the new token before it is
    /// returned. A hook failure is returned to the caller.
    pub async fn get_valid_access_token(
        &self,
        credentials: &CredentialSet,
        on_refreshed: Option<&dyn RefreshHook>,
    ) -> RtiResult<String> {
        if let Some(access_token) = credentials.access_token.as_deref() {
            if !access_token.is_empty()
                && !is_token_expired(credentials.token_expiry, self.config.token_buffer_secs)
            {
                debug!("using current access token");
                return Ok(access_token.to_string());
            }
        }

        let (refresh_token, client_id, client_secret) = require_refresh_fields(credentials)?;

        debug!(environment = %credentials.environment, "access token missing or expiring, refreshing");
        let token = self
            .refresh_access_token(
                refresh_token,
                client_id,
                client_secret,
                credentials.environment,
            )
            .await?;

        if let Some(hook) = on_refreshed {
            hook.on_refreshed(&token).await?;
        }

        Ok(token.access_token)
    }
}

fn require_refresh_fields(credentials: &CredentialSet) -> RtiResult<(&str, &str, &str)> {
    fn present(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }

    match (
        present(&credentials.refresh_token),
        present(&credentials.client_id),
        present(&credentials.client_secret),
    ) {
        (Some(refresh_token), Some(client_id), Some(client_secret)) => {
            Ok((refresh_token, client_id, client_secret))
        }
        (refresh_token, client_id, client_secret) => {
            let missing: Vec<&str> = [
                ("refresh_token", refresh_token.is_none()),
                ("client_id", client_id.is_none()),
                ("client_secret", client_secret.is_none()),
            ]
            .iter()
            .filter(|(_, absent)| *absent)
            .map(|(name, _)| *name)
            .collect();

            Err(RtiError::Configuration {
                message: format!(
                    "cannot refresh access token, missing: {}",
                    missing.join(", ")
                ),
            })
        }
    }
}

/// Whether a token expiring at `expiry` should no longer be used.
///
/// Unknown expiry counts as expired.
pub fn is_token_expired(expiry: Option<DateTime<Utc>>, buffer_secs: i64) -> bool {
    is_token_expired_at(expiry, buffer_secs, Utc::now())
}

/// [`is_token_expired`] evaluated at a fixed instant.
///
/// A buffer beyond the calendar range saturates instead of overflowing.
pub fn is_token_expired_at(
    expiry: Option<DateTime<Utc>>,
    buffer_secs: i64,
    now: DateTime<Utc>,
) -> bool {
    match expiry {
        None => true,
        Some(expiry) => buffer_deadline(now, buffer_secs) >= expiry,
    }
}

/// 32 random bytes, hex encoded.
fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
