use std::sync::Arc;

use serde_json::json;
use serial_test::serial;
use umami_reporter::global;
use umami_reporter::testing::RecordingTransport;
use umami_reporter::{Diagnostics, IdentifyArg, Reporter, ReporterConfig, StaticEnvironment};

fn install() -> RecordingTransport {
    let transport = RecordingTransport::new();
    global::set_test_reporter(
        Reporter::new()
            .with_environment(
                StaticEnvironment::from_url("https://shop.example/cart?step=2")
                    .unwrap()
                    .title("Cart"),
            )
            .with_transport(transport.clone())
            .with_diagnostics(Arc::new(Diagnostics::buffered())),
    );
    transport
}

#[test]
#[serial]
fn test_calls_before_initialize_are_no_ops() {
    let transport = install();

    assert!(global::configuration().is_none());
    assert!(global::track_page_view(None).is_none());
    assert!(global::track_event("click", None).is_none());
    assert!(global::identify(Some("u1".into()), None).is_none());
    assert_eq!(transport.request_count(), 0);

    global::clear_test_reporter();
}

#[test]
#[serial]
fn test_facade_forwards_to_shared_reporter() {
    let transport = install();
    global::initialize(ReporterConfig::new("https://u.is", "w1"));

    global::identify(Some("u1".into()), None);
    global::track_page_view(None);
    global::track_event("add-to-cart", None);
    global::track_revenue("purchase", 19.5, "EUR", None);
    global::track("custom", None);

    let bodies = transport.bodies();
    assert_eq!(bodies.len(), 5);
    assert!(bodies.iter().all(|b| b["payload"]["id"] == "u1"));
    assert_eq!(bodies[1]["payload"]["url"], "/cart?step=2");
    assert_eq!(bodies[2]["payload"]["name"], "add-to-cart");
    assert_eq!(
        bodies[3]["payload"]["data"],
        json!({ "revenue": 19.5, "currency": "EUR" })
    );
    assert_eq!(global::session_id().as_deref(), Some("u1"));

    global::clear_identity();
    assert_eq!(global::session_id(), None);

    global::reset();
    assert!(global::configuration().is_none());
    global::clear_test_reporter();
}

#[test]
#[serial]
fn test_facade_identify_with_data() {
    let transport = install();
    global::initialize(ReporterConfig::new("https://u.is", "w1"));

    let data = json!({ "name": "John" }).as_object().cloned().unwrap();
    global::identify(Some(IdentifyArg::Data(data.clone())), None);
    assert_eq!(global::session_data(), Some(data));
    assert_eq!(global::session_id(), None);
    assert_eq!(transport.request_count(), 1);

    global::set_tag("beta");
    global::track_page_view(None);
    assert_eq!(transport.last_payload().unwrap()["tag"], "beta");

    global::reset();
    global::clear_test_reporter();
}
