//! Compliance core for UK payroll Real Time Information (RTI) filing.
//!
//! This crate provides the three pieces a submission orchestrator needs
//! before it talks to the authority's gateway:
//!
//! - OAuth2 token lifecycle: authorization URL, code exchange, refresh,
//!   expiry checks ([`auth`])
//! - Fraud prevention headers for every API call ([`fraud`])
//! - FPS, EPS and EYU document generation plus shallow validation ([`xml`])
//!
//! The components do not depend on each other. Transmission, retries and
//! persistence belong to the caller.
//!
//! # Quick Start
//!
//! ```no_run
//! use rti_core::{CredentialSet, HeaderGenerator, MemoryDeviceStore, TokenManager};
//!
//! # async fn example(credentials: CredentialSet, input: rti_core::FpsInput) -> anyhow::Result<()> {
//! let tokens = TokenManager::from_env()?;
//! let access_token = tokens.get_valid_access_token(&credentials, None).await?;
//!
//! let headers = HeaderGenerator::new(MemoryDeviceStore::new()).generate_headers(Some("user-1"))?;
//! let document = rti_core::generate_fps(&input)?;
//! assert!(rti_core::validate_xml(&document).valid);
//! # let _ = (access_token, headers);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `RTI_SANDBOX_URL` | Sandbox API base URL (default: `https://test-api.service.hmrc.gov.uk`) |
//! | `RTI_PRODUCTION_URL` | Production API base URL (default: `https://api.service.hmrc.gov.uk`) |
//! | `RTI_HTTP_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `RTI_TOKEN_BUFFER` | Seconds before expiry a token is refreshed (default: 300) |

pub mod auth;
pub mod config;
pub mod error;
pub mod fraud;
pub mod types;
pub mod xml;

// Re-export main types
pub use auth::{
    is_token_expired, is_token_expired_at, AuthorizationRequest, RefreshHook, TokenManager,
};
pub use config::{RtiConfig, DEFAULT_TOKEN_BUFFER_SECS};
pub use error::{RtiError, RtiResult};
pub use fraud::{
    DeviceContext, DeviceStore, FileDeviceStore, FraudPreventionHeaders, HeaderGenerator,
    MemoryDeviceStore, ScreenInfo, WindowSize, HEADER_NAMES,
};
pub use types::{CredentialSet, Environment, OAuthToken, TokenState};
pub use xml::{
    escape_xml, generate_eps, generate_eyu, generate_fps, period_type_code, validate_xml,
    DateValue, EpsInput, EyuInput, FpsInput, SubmissionInput, ValidationResult,
};
