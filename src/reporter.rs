//! The reporter: owns configuration and session identity, builds payloads
//! and performs the send.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Value, json};

use crate::config::ReporterConfig;
use crate::environment::{Environment, StaticEnvironment, do_not_track_enabled};
use crate::error::ReporterError;
use crate::observability::{Diagnostics, LEVEL_DEBUG};
use crate::payload::{Envelope, EventData, EventPayload, SendResponse};
use crate::transport::{HttpRequest, MinreqTransport, Transport};

/// What `Reporter::track` should send.
#[derive(Default)]
pub enum TrackArg {
    /// Same as `track_page_view(None)`
    #[default]
    PageView,
    /// Custom event with this name
    Named(String),
    /// Called with the base payload; the result is merged over it
    Transform(Box<dyn FnOnce(&EventPayload) -> EventPayload + Send>),
    /// Merged over the base payload
    Fields(EventPayload),
}

impl TrackArg {
    pub fn transform<F>(f: F) -> Self
    where
        F: FnOnce(&EventPayload) -> EventPayload + Send + 'static,
    {
        TrackArg::Transform(Box::new(f))
    }
}

impl fmt::Debug for TrackArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackArg::PageView => f.write_str("PageView"),
            TrackArg::Named(name) => f.debug_tuple("Named").field(name).finish(),
            TrackArg::Transform(_) => f.write_str("Transform(..)"),
            TrackArg::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
        }
    }
}

impl From<()> for TrackArg {
    fn from(_: ()) -> Self {
        TrackArg::PageView
    }
}

impl From<&str> for TrackArg {
    fn from(name: &str) -> Self {
        TrackArg::Named(name.to_string())
    }
}

impl From<String> for TrackArg {
    fn from(name: String) -> Self {
        TrackArg::Named(name)
    }
}

impl From<EventPayload> for TrackArg {
    fn from(fields: EventPayload) -> Self {
        TrackArg::Fields(fields)
    }
}

/// First argument of `Reporter::identify`.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifyArg {
    Id(String),
    Data(EventData),
}

impl From<&str> for IdentifyArg {
    fn from(id: &str) -> Self {
        IdentifyArg::Id(id.to_string())
    }
}

impl From<String> for IdentifyArg {
    fn from(id: String) -> Self {
        IdentifyArg::Id(id)
    }
}

impl From<EventData> for IdentifyArg {
    fn from(data: EventData) -> Self {
        IdentifyArg::Data(data)
    }
}

/// Session identity attached to every payload until cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identity {
    pub id: Option<String>,
    pub data: Option<EventData>,
}

#[derive(Default)]
struct ReporterState {
    config: Option<ReporterConfig>,
    identity: Identity,
}

pub struct Reporter {
    state: Mutex<ReporterState>,
    environment: Arc<dyn Environment>,
    transport: Arc<dyn Transport>,
    diagnostics: Arc<Diagnostics>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Reporter")
            .field("config", &state.config)
            .field("identity", &state.identity)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    /// Unconfigured reporter with no page context, sending over HTTP and
    /// printing failures to stderr.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ReporterState::default()),
            environment: Arc::new(StaticEnvironment::default()),
            transport: Arc::new(MinreqTransport),
            diagnostics: Arc::new(Diagnostics::default()),
        }
    }

    pub fn with_environment<E: Environment + 'static>(mut self, environment: E) -> Self {
        self.environment = Arc::new(environment);
        self
    }

    pub fn with_transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Replace the configuration wholesale.
    pub fn configure(&self, config: ReporterConfig) {
        self.lock().config = Some(config);
    }

    pub fn configuration(&self) -> Option<ReporterConfig> {
        self.lock().config.clone()
    }

    /// Drop configuration and identity, back to the freshly created state.
    pub fn reset(&self) {
        *self.lock() = ReporterState::default();
    }

    pub fn session_id(&self) -> Option<String> {
        self.lock().identity.id.clone()
    }

    pub fn session_data(&self) -> Option<EventData> {
        self.lock().identity.data.clone()
    }

    pub fn clear_identity(&self) {
        self.lock().identity = Identity::default();
    }

    /// Set the tag on the live configuration. No-op when unconfigured.
    pub fn set_tag(&self, tag: impl Into<String>) {
        if let Some(config) = self.lock().config.as_mut() {
            config.tag = Some(tag.into());
        }
    }

    pub fn clear_tag(&self) {
        if let Some(config) = self.lock().config.as_mut() {
            config.tag = None;
        }
    }

    /// Page URL for a payload: path (or `override_url`), then the ambient
    /// query string and fragment unless excluded.
    pub fn build_url(&self, override_url: Option<&str>) -> String {
        let config = self.configuration().unwrap_or_default();
        self.url_for(&config, override_url)
    }

    /// Base payload every call extends. `None` when unconfigured.
    pub fn build_base_payload(&self, override_url: Option<&str>) -> Option<EventPayload> {
        let (config, identity) = self.snapshot()?;
        Some(self.base_payload(&config, &identity, override_url))
    }

    pub fn is_tracking_blocked(&self) -> bool {
        match self.configuration() {
            Some(config) => self.blocked_by(&config),
            None => true,
        }
    }

    pub fn track_page_view(&self, override_url: Option<&str>) -> Option<SendResponse> {
        let (config, identity) = self.snapshot()?;
        if self.blocked_by(&config) {
            return None;
        }

        let mut payload = self.base_payload(&config, &identity, override_url);
        if let Some(data) = identity.data {
            payload.data = Some(data);
        }
        self.send(&config, payload)
    }

    /// Dispatch on the shape of `arg`. `data` is only used for named events.
    pub fn track(&self, arg: impl Into<TrackArg>, data: Option<EventData>) -> Option<SendResponse> {
        let arg = arg.into();
        if let TrackArg::PageView = arg {
            return self.track_page_view(None);
        }

        let (config, identity) = self.snapshot()?;
        if self.blocked_by(&config) {
            return None;
        }

        let base = self.base_payload(&config, &identity, None);
        let payload = match arg {
            TrackArg::PageView => base,
            TrackArg::Named(name) => EventPayload {
                name: Some(name),
                data,
                ..base
            },
            TrackArg::Transform(f) => {
                let over = f(&base);
                base.merge(over)
            }
            TrackArg::Fields(fields) => base.merge(fields),
        };
        self.send(&config, payload)
    }

    /// Named event. Ignored when `name` is empty; `data` defaults to `{}`.
    pub fn log_event(&self, name: &str, data: Option<EventData>) -> Option<SendResponse> {
        if name.is_empty() {
            return None;
        }
        self.send_named(name, data.unwrap_or_default())
    }

    /// Revenue event. `extra` is applied after `revenue` and `currency`, so
    /// it can override either. Integer amounts are sent as JSON integers.
    pub fn track_revenue(
        &self,
        name: &str,
        amount: impl Into<Value>,
        currency: &str,
        extra: Option<EventData>,
    ) -> Option<SendResponse> {
        if name.is_empty() {
            return None;
        }

        let mut data = EventData::new();
        data.insert("revenue".to_string(), amount.into());
        data.insert("currency".to_string(), json!(currency));
        if let Some(extra) = extra {
            data.extend(extra);
        }
        self.send_named(name, data)
    }

    /// Update the session identity, then send it.
    ///
    /// An id replaces the session id and, if `data` is given, the session
    /// data. A data bag replaces the session data and leaves the id alone.
    pub fn identify(
        &self,
        arg: Option<IdentifyArg>,
        data: Option<EventData>,
    ) -> Option<SendResponse> {
        let config = self.configuration()?;
        if self.blocked_by(&config) {
            return None;
        }

        // The config gated above is the one sent with, even if `configure`
        // ran in between
        let identity = {
            let mut state = self.lock();
            match arg {
                Some(IdentifyArg::Id(id)) => {
                    state.identity.id = Some(id);
                    if let Some(data) = data {
                        state.identity.data = Some(data);
                    }
                }
                Some(IdentifyArg::Data(data)) => state.identity.data = Some(data),
                None => {}
            }
            state.identity.clone()
        };

        let mut payload = self.base_payload(&config, &identity, None);
        payload.data = identity.data;
        self.send(&config, payload)
    }

    fn send_named(&self, name: &str, data: EventData) -> Option<SendResponse> {
        let (config, identity) = self.snapshot()?;
        if self.blocked_by(&config) {
            return None;
        }

        let payload = EventPayload {
            name: Some(name.to_string()),
            data: Some(data),
            ..self.base_payload(&config, &identity, None)
        };
        self.send(&config, payload)
    }

    fn send(&self, config: &ReporterConfig, payload: EventPayload) -> Option<SendResponse> {
        let endpoint = config.send_endpoint()?;

        let payload = match &config.before_send {
            Some(hook) => {
                let name = payload.name.clone();
                match hook.call(payload) {
                    Some(replaced) => replaced,
                    None => {
                        self.diagnostics.log_message(
                            "Send cancelled by before_send",
                            LEVEL_DEBUG,
                            Some(json!({ "name": name })),
                        );
                        return None;
                    }
                }
            }
            None => payload,
        };

        let name = payload.name.clone();
        match self.post(&endpoint, config, payload) {
            Ok(response) => Some(response),
            Err(e) => {
                self.diagnostics.log_error(
                    &e,
                    Some(json!({ "endpoint": endpoint, "name": name })),
                );
                None
            }
        }
    }

    fn post(
        &self,
        endpoint: &str,
        config: &ReporterConfig,
        payload: EventPayload,
    ) -> Result<SendResponse, ReporterError> {
        let user_agent = self.environment.user_agent();
        let request = HttpRequest::json(
            endpoint,
            &Envelope::event(payload),
            user_agent.as_deref(),
            config.timeout_secs,
        )?;

        let response = self.transport.post(&request)?;
        if !response.is_success() {
            return Err(ReporterError::Status {
                code: response.status_code,
                body: response.body,
            });
        }

        if response.body.trim().is_empty() {
            return Ok(SendResponse::default());
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    fn blocked_by(&self, config: &ReporterConfig) -> bool {
        let do_not_track = config.honor_do_not_track
            && do_not_track_enabled(&self.environment.do_not_track_signals());
        do_not_track || !config.is_allowed_domain(&self.environment.hostname())
    }

    fn url_for(&self, config: &ReporterConfig, override_url: Option<&str>) -> String {
        let mut url = match override_url {
            Some(path) => path.to_string(),
            None => self.environment.pathname(),
        };
        if !config.exclude_search {
            url.push_str(&self.environment.search());
        }
        if !config.exclude_hash {
            url.push_str(&self.environment.hash());
        }
        url
    }

    fn base_payload(
        &self,
        config: &ReporterConfig,
        identity: &Identity,
        override_url: Option<&str>,
    ) -> EventPayload {
        let env = &self.environment;
        EventPayload {
            hostname: Some(
                config
                    .hostname
                    .clone()
                    .unwrap_or_else(|| env.hostname()),
            ),
            language: Some(env.language()),
            referrer: Some(env.referrer().unwrap_or_default()),
            screen: Some(format!("{}x{}", env.screen_width(), env.screen_height())),
            title: Some(env.title()),
            url: Some(self.url_for(config, override_url)),
            website: Some(config.website_id.clone()),
            tag: config.tag.clone(),
            id: identity.id.clone(),
            ..Default::default()
        }
    }

    /// Configuration and identity as of now; `None` when unconfigured.
    fn snapshot(&self) -> Option<(ReporterConfig, Identity)> {
        let state = self.lock();
        let config = state.config.clone()?;
        Some((config, state.identity.clone()))
    }

    fn lock(&self) -> MutexGuard<'_, ReporterState> {
        // before_send and Environment are host code; a panic in one must not
        // leave the reporter unusable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
