//! Process-wide reporter for callers that don't want to thread a `Reporter`
//! through their code. Every function forwards to [`reporter()`].

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::ReporterConfig;
use crate::payload::{EventData, SendResponse};
use crate::reporter::{IdentifyArg, Reporter, TrackArg};

#[cfg(any(test, feature = "test-support"))]
use std::sync::RwLock;

static GLOBAL_REPORTER: Lazy<Arc<Reporter>> = Lazy::new(|| Arc::new(Reporter::new()));

#[cfg(any(test, feature = "test-support"))]
static TEST_REPORTER_OVERRIDE: RwLock<Option<Arc<Reporter>>> = RwLock::new(None);

/// The shared reporter.
pub fn reporter() -> Arc<Reporter> {
    #[cfg(any(test, feature = "test-support"))]
    if let Ok(guard) = TEST_REPORTER_OVERRIDE.read()
        && let Some(reporter) = guard.as_ref()
    {
        return reporter.clone();
    }

    GLOBAL_REPORTER.clone()
}

/// Route the global functions to `reporter` (for example one built on a
/// recording transport) until [`clear_test_reporter`] is called.
#[cfg(any(test, feature = "test-support"))]
pub fn set_test_reporter(reporter: Reporter) {
    if let Ok(mut guard) = TEST_REPORTER_OVERRIDE.write() {
        *guard = Some(Arc::new(reporter));
    }
}

#[cfg(any(test, feature = "test-support"))]
pub fn clear_test_reporter() {
    if let Ok(mut guard) = TEST_REPORTER_OVERRIDE.write() {
        *guard = None;
    }
}

pub fn initialize(config: ReporterConfig) {
    reporter().configure(config);
}

pub fn track_event(name: &str, data: Option<EventData>) -> Option<SendResponse> {
    reporter().log_event(name, data)
}

pub fn track_page_view(override_url: Option<&str>) -> Option<SendResponse> {
    reporter().track_page_view(override_url)
}

pub fn track(arg: impl Into<TrackArg>, data: Option<EventData>) -> Option<SendResponse> {
    reporter().track(arg, data)
}

pub fn track_revenue(
    name: &str,
    amount: impl Into<serde_json::Value>,
    currency: &str,
    extra: Option<EventData>,
) -> Option<SendResponse> {
    reporter().track_revenue(name, amount, currency, extra)
}

pub fn identify(arg: Option<IdentifyArg>, data: Option<EventData>) -> Option<SendResponse> {
    reporter().identify(arg, data)
}

pub fn session_id() -> Option<String> {
    reporter().session_id()
}

pub fn session_data() -> Option<EventData> {
    reporter().session_data()
}

pub fn clear_identity() {
    reporter().clear_identity();
}

pub fn set_tag(tag: impl Into<String>) {
    reporter().set_tag(tag);
}

pub fn clear_tag() {
    reporter().clear_tag();
}

pub fn configuration() -> Option<ReporterConfig> {
    reporter().configuration()
}

pub fn reset() {
    reporter().reset();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_global_starts_unconfigured_after_reset() {
        clear_test_reporter();
        reset();
        assert!(configuration().is_none());
        assert_eq!(session_id(), None);
        // No configuration: nothing is sent and nothing fails
        assert!(track_page_view(None).is_none());
    }

    #[test]
    #[serial]
    fn test_initialize_and_tag_round_trip() {
        clear_test_reporter();
        reset();
        initialize(ReporterConfig::new("", "w1"));
        set_tag("nightly");
        assert_eq!(configuration().unwrap().tag.as_deref(), Some("nightly"));
        clear_tag();
        assert_eq!(configuration().unwrap().tag, None);
        reset();
        assert!(configuration().is_none());
    }
}
