//! Fraud prevention headers required on every call to the authority.
//!
//! [`HeaderGenerator::generate_headers`] always returns the same 11 keys.
//! Every value is recomputed per call except `Device-ID`, which is read from
//! the injected [`DeviceStore`] and created there on first use.
//!
//! Values that describe the client device come from a [`DeviceContext`].
//! Anything the context does not know falls back to a fixed default, so the
//! header set is complete even for server-side callers with no browser data.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{Local, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RtiError, RtiResult};

mod encoding;
pub mod store;

pub use encoding::{canonical_base64, format_utc_offset};
pub use store::{DeviceStore, FileDeviceStore, MemoryDeviceStore};

pub const CONNECTION_METHOD: &str = "Connection-Method";
pub const DEVICE_ID: &str = "Device-ID";
pub const USER_IDS: &str = "User-IDs";
pub const TIMEZONE: &str = "Timezone";
pub const LOCAL_IPS: &str = "Local-IPs";
pub const SCREENS: &str = "Screens";
pub const WINDOW_SIZE: &str = "Window-Size";
pub const BROWSER_PLUGINS: &str = "Browser-Plugins";
pub const BROWSER_JS_USER_AGENT: &str = "Browser-JS-User-Agent";
pub const BROWSER_DO_NOT_TRACK: &str = "Browser-Do-Not-Track";
pub const MULTI_FACTOR: &str = "Multi-Factor";

/// Every key of a [`FraudPreventionHeaders`] set.
pub const HEADER_NAMES: [&str; 11] = [
    CONNECTION_METHOD,
    DEVICE_ID,
    USER_IDS,
    TIMEZONE,
    LOCAL_IPS,
    SCREENS,
    WINDOW_SIZE,
    BROWSER_PLUGINS,
    BROWSER_JS_USER_AGENT,
    BROWSER_DO_NOT_TRACK,
    MULTI_FACTOR,
];

/// Prefix the authority expects on the wire.
pub const WIRE_PREFIX: &str = "Gov-Client-";

/// Submissions always go through the payroll server.
pub const CONNECTION_METHOD_VALUE: &str = "WEB_APP_VIA_SERVER";

/// Store key holding the device identifier.
pub const DEVICE_ID_KEY: &str = "rti.device_id";

const UNKNOWN_USER_AGENT: &str = "Unknown";

/// Display metadata reported in `Screens`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    pub scaling_factor: f64,
    pub colour_depth: u32,
}

impl Default for ScreenInfo {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            scaling_factor: 1.0,
            colour_depth: 24,
        }
    }
}

/// Browser viewport reported in `Window-Size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// What is known about the device the submission originates from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceContext {
    #[serde(default)]
    pub user_agent: Option<String>,

    #[serde(default)]
    pub screen: Option<ScreenInfo>,

    #[serde(default)]
    pub window: Option<WindowSize>,

    #[serde(default)]
    pub plugins: Option<Vec<String>>,

    #[serde(default)]
    pub do_not_track: Option<bool>,

    /// Seconds east of UTC. Uses the host's local offset when absent.
    #[serde(default)]
    pub utc_offset_secs: Option<i32>,
}

impl DeviceContext {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_screen(mut self, screen: ScreenInfo) -> Self {
        self.screen = Some(screen);
        self
    }

    pub fn with_window(mut self, window: WindowSize) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_plugins(mut self, plugins: Vec<String>) -> Self {
        self.plugins = Some(plugins);
        self
    }

    pub fn with_do_not_track(mut self, do_not_track: bool) -> Self {
        self.do_not_track = Some(do_not_track);
        self
    }

    pub fn with_utc_offset_secs(mut self, offset: i32) -> Self {
        self.utc_offset_secs = Some(offset);
        self
    }
}

/// Multi-factor report. Always `NONE` for now.
#[derive(Debug, Serialize)]
struct MultiFactor<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    timestamp: String,
}

/// The 11 fraud prevention header values for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FraudPreventionHeaders {
    values: BTreeMap<&'static str, String>,
}

impl FraudPreventionHeaders {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Render as HTTP headers named `Gov-Client-{key}`.
    pub fn to_header_map(&self) -> RtiResult<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(self.values.len());
        for (name, value) in self.iter() {
            let wire_name = format!("{}{}", WIRE_PREFIX, name);
            let header_name =
                HeaderName::from_bytes(wire_name.as_bytes()).map_err(|e| RtiError::InvalidHeader {
                    name: wire_name.clone(),
                    message: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| RtiError::InvalidHeader {
                name: wire_name.clone(),
                message: e.to_string(),
            })?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }
}

/// Builds fraud prevention header sets for one device scope.
#[derive(Debug)]
pub struct HeaderGenerator<S> {
    store: S,
    context: DeviceContext,
    init_lock: Mutex<()>,
}

impl<S: DeviceStore> HeaderGenerator<S> {
    pub fn new(store: S) -> Self {
        Self::with_context(store, DeviceContext::default())
    }

    pub fn with_context(store: S, context: DeviceContext) -> Self {
        Self {
            store,
            context,
            init_lock: Mutex::new(()),
        }
    }

    pub fn context(&self) -> &DeviceContext {
        &self.context
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stable device identifier for this scope, created on first use.
    pub fn device_id(&self) -> RtiResult<String> {
        if let Some(id) = self.stored_device_id()? {
            return Ok(id);
        }

        // Re-check under the lock so two first callers agree on one id.
        let _guard = self.init_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(id) = self.stored_device_id()? {
            return Ok(id);
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.store.set(DEVICE_ID_KEY, &id)?;
        debug!("created device identifier");
        Ok(id)
    }

    fn stored_device_id(&self) -> RtiResult<Option<String>> {
        Ok(self
            .store
            .get(DEVICE_ID_KEY)?
            .filter(|id| !id.trim().is_empty()))
    }

    /// Compute the full header set.
    pub fn generate_headers(&self, user_id: Option<&str>) -> RtiResult<FraudPreventionHeaders> {
        let ctx = &self.context;
        let mut values = BTreeMap::new();

        values.insert(CONNECTION_METHOD, CONNECTION_METHOD_VALUE.to_string());
        values.insert(DEVICE_ID, self.device_id()?);

        let user_ids: Vec<&str> = user_id.filter(|id| !id.is_empty()).into_iter().collect();
        values.insert(USER_IDS, encode(USER_IDS, &user_ids)?);

        let offset = ctx
            .utc_offset_secs
            .unwrap_or_else(|| Local::now().offset().local_minus_utc());
        values.insert(TIMEZONE, format_utc_offset(offset));

        values.insert(LOCAL_IPS, encode(LOCAL_IPS, &Vec::<String>::new())?);
        values.insert(SCREENS, encode(SCREENS, &ctx.screen.unwrap_or_default())?);
        values.insert(
            WINDOW_SIZE,
            encode(WINDOW_SIZE, &ctx.window.unwrap_or_default())?,
        );

        let plugins: &[String] = ctx.plugins.as_deref().unwrap_or(&[]);
        values.insert(BROWSER_PLUGINS, encode(BROWSER_PLUGINS, &plugins)?);

        let user_agent = ctx
            .user_agent
            .as_deref()
            .filter(|ua| !ua.is_empty())
            .unwrap_or(UNKNOWN_USER_AGENT);
        values.insert(BROWSER_JS_USER_AGENT, user_agent.to_string());

        values.insert(
            BROWSER_DO_NOT_TRACK,
            ctx.do_not_track.unwrap_or(false).to_string(),
        );

        let multi_factor = MultiFactor {
            kind: "NONE",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        values.insert(MULTI_FACTOR, encode(MULTI_FACTOR, &multi_factor)?);

        Ok(FraudPreventionHeaders { values })
    }
}

fn encode<T: Serialize>(name: &str, value: &T) -> RtiResult<String> {
    canonical_base64(value).map_err(|e| RtiError::InvalidHeader {
        name: name.to_string(),
        message: format!("failed to encode payload: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::sync::Arc;

    fn decode(value: &str) -> String {
        String::from_utf8(STANDARD.decode(value).unwrap()).unwrap()
    }

    fn generator() -> HeaderGenerator<MemoryDeviceStore> {
        HeaderGenerator::new(MemoryDeviceStore::new())
    }

    #[test]
    fn test_exactly_eleven_keys() {
        let headers = generator().generate_headers(None).unwrap();
        assert_eq!(headers.len(), 11);
        let mut expected: Vec<&str> = HEADER_NAMES.to_vec();
        expected.sort_unstable();
        assert_eq!(headers.keys().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_device_id_stable_in_scope() {
        let gen = generator();
        let first = gen.generate_headers(None).unwrap();
        let second = gen.generate_headers(Some("user-1")).unwrap();
        assert_eq!(first.get(DEVICE_ID), second.get(DEVICE_ID));
        assert!(uuid::Uuid::parse_str(first.get(DEVICE_ID).unwrap()).is_ok());
    }

    #[test]
    fn test_device_id_differs_across_scopes() {
        let a = generator().device_id().unwrap();
        let b = generator().device_id().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_device_id_reuses_stored_value() {
        let store = MemoryDeviceStore::new();
        store.set(DEVICE_ID_KEY, "existing-device").unwrap();
        let gen = HeaderGenerator::new(store);
        assert_eq!(gen.device_id().unwrap(), "existing-device");
    }

    #[test]
    fn test_concurrent_first_use_yields_one_id() {
        let gen = Arc::new(generator());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gen = Arc::clone(&gen);
                std::thread::spawn(move || gen.device_id().unwrap())
            })
            .collect();
        let ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_user_ids() {
        let gen = generator();
        let none = gen.generate_headers(None).unwrap();
        assert_eq!(decode(none.get(USER_IDS).unwrap()), "[]");

        let one = gen.generate_headers(Some("emp-42")).unwrap();
        assert_eq!(decode(one.get(USER_IDS).unwrap()), r#"["emp-42"]"#);

        let empty = gen.generate_headers(Some("")).unwrap();
        assert_eq!(decode(empty.get(USER_IDS).unwrap()), "[]");
    }

    #[test]
    fn test_defaults_without_device_data() {
        let headers = HeaderGenerator::with_context(
            MemoryDeviceStore::new(),
            DeviceContext::default().with_utc_offset_secs(0),
        )
        .generate_headers(None)
        .unwrap();

        assert_eq!(headers.get(CONNECTION_METHOD), Some("WEB_APP_VIA_SERVER"));
        assert_eq!(headers.get(TIMEZONE), Some("UTC+00:00"));
        assert_eq!(decode(headers.get(LOCAL_IPS).unwrap()), "[]");
        assert_eq!(decode(headers.get(BROWSER_PLUGINS).unwrap()), "[]");
        assert_eq!(headers.get(BROWSER_JS_USER_AGENT), Some("Unknown"));
        assert_eq!(headers.get(BROWSER_DO_NOT_TRACK), Some("false"));
        assert_eq!(
            decode(headers.get(WINDOW_SIZE).unwrap()),
            r#"{"height":1080,"width":1920}"#
        );

        let screens = decode(headers.get(SCREENS).unwrap());
        assert!(!screens.contains(' '));
        let parsed: serde_json::Value = serde_json::from_str(&screens).unwrap();
        assert_eq!(parsed["width"].as_u64(), Some(1920));
        assert_eq!(parsed["height"].as_u64(), Some(1080));
        assert_eq!(parsed["scalingFactor"].as_f64(), Some(1.0));
        assert_eq!(parsed["colourDepth"].as_u64(), Some(24));
        let order: Vec<usize> = ["colourDepth", "height", "scalingFactor", "width"]
            .iter()
            .map(|k| screens.find(k).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_context_values_used() {
        let ctx = DeviceContext::default()
            .with_user_agent("Mozilla/5.0 (X11; Linux x86_64)")
            .with_window(WindowSize {
                width: 1280,
                height: 720,
            })
            .with_plugins(vec!["PDF Viewer".into(), "Chrome PDF Viewer".into()])
            .with_do_not_track(true)
            .with_utc_offset_secs(3600);
        let headers = HeaderGenerator::with_context(MemoryDeviceStore::new(), ctx)
            .generate_headers(None)
            .unwrap();

        assert_eq!(
            headers.get(BROWSER_JS_USER_AGENT),
            Some("Mozilla/5.0 (X11; Linux x86_64)")
        );
        assert_eq!(headers.get(BROWSER_DO_NOT_TRACK), Some("true"));
        assert_eq!(headers.get(TIMEZONE), Some("UTC+01:00"));
        assert_eq!(
            decode(headers.get(WINDOW_SIZE).unwrap()),
            r#"{"height":720,"width":1280}"#
        );
        assert_eq!(
            decode(headers.get(BROWSER_PLUGINS).unwrap()),
            r#"["PDF Viewer","Chrome PDF Viewer"]"#
        );
    }

    #[test]
    fn test_multi_factor_reports_none() {
        let headers = generator().generate_headers(None).unwrap();
        let mfa = decode(headers.get(MULTI_FACTOR).unwrap());
        assert!(mfa.starts_with(r#"{"timestamp":""#));
        let parsed: serde_json::Value = serde_json::from_str(&mfa).unwrap();
        assert_eq!(parsed["type"], "NONE");
        let ts = parsed["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn test_header_map_uses_wire_prefix() {
        let headers = generator().generate_headers(Some("u")).unwrap();
        let map = headers.to_header_map().unwrap();
        assert_eq!(map.len(), 11);
        assert_eq!(
            map.get("gov-client-connection-method").unwrap(),
            "WEB_APP_VIA_SERVER"
        );
        assert!(map.contains_key("gov-client-device-id"));
    }

    #[test]
    fn test_header_map_rejects_control_characters() {
        let ctx = DeviceContext::default().with_user_agent("bad\nagent");
        let headers = HeaderGenerator::with_context(MemoryDeviceStore::new(), ctx)
            .generate_headers(None)
            .unwrap();
        assert!(matches!(
            headers.to_header_map(),
            Err(RtiError::InvalidHeader { .. })
        ));
    }
}
