//! Wire types for `POST /api/send`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form key/value bag attached to events and sessions.
pub type EventData = Map<String, Value>;

/// The only envelope type the endpoint accepts from this client.
pub const EVENT_TYPE: &str = "event";

/// One tracked occurrence.
///
/// Every field is optional so a `before_send` hook can drop fields, and so a
/// partial payload can be merged over a base one. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EventData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Keys outside the standard set, sent as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = Some(value.into());
        self
    }

    pub fn data(mut self, value: EventData) -> Self {
        self.data = Some(value);
        self
    }

    pub fn url(mut self, value: impl Into<String>) -> Self {
        self.url = Some(value.into());
        self
    }

    pub fn title(mut self, value: impl Into<String>) -> Self {
        self.title = Some(value.into());
        self
    }

    pub fn referrer(mut self, value: impl Into<String>) -> Self {
        self.referrer = Some(value.into());
        self
    }

    pub fn tag(mut self, value: impl Into<String>) -> Self {
        self.tag = Some(value.into());
        self
    }

    pub fn id(mut self, value: impl Into<String>) -> Self {
        self.id = Some(value.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Shallow merge: every field set on `over` replaces the one on `self`.
    /// `data` is replaced as a whole, never merged key by key.
    pub fn merge(self, over: EventPayload) -> EventPayload {
        let mut extra = self.extra;
        extra.extend(over.extra);

        EventPayload {
            hostname: over.hostname.or(self.hostname),
            language: over.language.or(self.language),
            referrer: over.referrer.or(self.referrer),
            screen: over.screen.or(self.screen),
            title: over.title.or(self.title),
            url: over.url.or(self.url),
            website: over.website.or(self.website),
            name: over.name.or(self.name),
            data: over.data.or(self.data),
            tag: over.tag.or(self.tag),
            id: over.id.or(self.id),
            extra,
        }
    }
}

/// Wire wrapper around a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub payload: EventPayload,
    #[serde(rename = "type")]
    pub event_type: String,
}

impl Envelope {
    pub fn event(payload: EventPayload) -> Self {
        Self {
            payload,
            event_type: EVENT_TYPE.to_string(),
        }
    }
}

/// Parsed body of a successful send, handed back to the caller verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,
    #[serde(
        rename = "sessionId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub session_id: Option<String>,
    #[serde(rename = "visitId", default, skip_serializing_if = "Option::is_none")]
    pub visit_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
