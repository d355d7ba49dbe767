//! Token endpoint transport: request building and status mapping.
//!
//! This is the ONLY place for status code handling. auth/mod.rs never
//! interprets status codes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{RtiError, RtiResult};
use crate::types::OAuthToken;

/// Error body returned by the authority. Both the API error shape and the
/// plain OAuth shape are accepted.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP backend for the token endpoint (holds the reqwest client).
#[derive(Debug, Clone)]
pub(crate) struct TokenEndpoint {
    pub(crate) client: reqwest::Client,
}

impl TokenEndpoint {
    /// POST a grant to `{base_url}/oauth/token` and parse the issued token.
    pub(crate) async fn request_token(
        &self,
        base_url: &str,
        client_id: &str,
        client_secret: &str,
        form: &[(&str, &str)],
    ) -> RtiResult<OAuthToken> {
        let url = format!("{}/oauth/token", base_url);
        let grant_type = form
            .iter()
            .find(|(k, _)| *k == "grant_type")
            .map(|(_, v)| *v)
            .unwrap_or("unknown");
        debug!(url = %url, grant_type = grant_type, "requesting token");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, basic_authorization(client_id, client_secret))
            .header(ACCEPT, "application/json")
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = error_from_body(status, &body);
            warn!(status = status.as_u16(), grant_type = grant_type, error = %err, "token request rejected");
            return Err(err);
        }

        let token = response
            .json::<OAuthToken>()
            .await
            .map_err(|e| RtiError::InvalidResponse {
                message: format!("failed to parse token response: {}", e),
            })?;

        // Reject lifetimes that cannot be turned into an expiry instant.
        token.expires_at()?;
        Ok(token)
    }
}

/// `Basic base64(client_id:client_secret)`.
pub(crate) fn basic_authorization(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", client_id, client_secret))
    )
}

/// Map a non-success token response to an auth error.
///
/// Falls back to the HTTP status text when the body is not a recognised
/// error document.
pub(crate) fn error_from_body(status: StatusCode, body: &str) -> RtiError {
    let fallback = || RtiError::Auth {
        status: status.as_u16(),
        code: status.as_u16().to_string(),
        message: status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string(),
    };

    let parsed: ErrorBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => return fallback(),
    };

    let first = parsed.errors.first();
    let code = parsed
        .code
        .or(parsed.error)
        .or_else(|| first.and_then(|d| d.code.clone()));
    let message = parsed
        .message
        .or(parsed.error_description)
        .or_else(|| first.and_then(|d| d.message.clone()));

    match (code, message) {
        (None, None) => fallback(),
        (code, message) => {
            let mut message = message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string()
            });
            if let Some(path) = parsed.path {
                message = format!("{} ({})", message, path);
            }
            RtiError::Auth {
                status: status.as_u16(),
                code: code.unwrap_or_else(|| status.as_u16().to_string()),
                message,
            }
        }
    }
}
