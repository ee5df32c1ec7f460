use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::payload::EventPayload;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Hook run on every payload right before it is sent.
///
/// Returning `None` cancels the send. Returning `Some` replaces the payload
/// as a whole; fields missing from the returned payload are not sent.
#[derive(Clone)]
pub struct BeforeSend(Arc<dyn Fn(EventPayload) -> Option<EventPayload> + Send + Sync>);

impl BeforeSend {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(EventPayload) -> Option<EventPayload> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, payload: EventPayload) -> Option<EventPayload> {
        (self.0)(payload)
    }
}

impl fmt::Debug for BeforeSend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BeforeSend(..)")
    }
}

/// Reporter configuration.
///
/// Replaced as a whole by `Reporter::configure`. The data fields can be
/// deserialized from any serde format; `before_send` has to be attached in
/// code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Endpoint base URL; `/api/send` is appended. Empty disables sending.
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub website_id: String,
    /// Overrides the ambient hostname in every payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub honor_do_not_track: bool,
    /// Hostnames tracking is limited to. Empty means no restriction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_domains: Vec<String>,
    #[serde(default)]
    pub exclude_search: bool,
    #[serde(default)]
    pub exclude_hash: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip)]
    pub before_send: Option<BeforeSend>,
}

impl ReporterConfig {
    pub fn new(base_url: impl Into<String>, website_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            website_id: website_id.into(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            ..Default::default()
        }
    }

    pub fn hostname(mut self, value: impl Into<String>) -> Self {
        self.hostname = Some(value.into());
        self
    }

    pub fn tag(mut self, value: impl Into<String>) -> Self {
        self.tag = Some(value.into());
        self
    }

    pub fn honor_do_not_track(mut self, value: bool) -> Self {
        self.honor_do_not_track = value;
        self
    }

    pub fn allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_search(mut self, value: bool) -> Self {
        self.exclude_search = value;
        self
    }

    pub fn exclude_hash(mut self, value: bool) -> Self {
        self.exclude_hash = value;
        self
    }

    pub fn timeout_secs(mut self, value: u64) -> Self {
        self.timeout_secs = Some(value);
        self
    }

    pub fn before_send<F>(mut self, f: F) -> Self
    where
        F: Fn(EventPayload) -> Option<EventPayload> + Send + Sync + 'static,
    {
        self.before_send = Some(BeforeSend::new(f));
        self
    }

    /// Full URL of the send endpoint, or `None` when no base URL is set.
    pub fn send_endpoint(&self) -> Option<String> {
        if self.base_url.is_empty() {
            return None;
        }
        Some(format!("{}/api/send", self.base_url.trim_end_matches('/')))
    }

    /// Empty allow-list never blocks.
    pub fn is_allowed_domain(&self, hostname: &str) -> bool {
        self.allowed_domains.is_empty() || self.allowed_domains.iter().any(|d| d == hostname)
    }
}
