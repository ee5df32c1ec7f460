//! Client for Umami-compatible analytics endpoints.
//!
//! A [`Reporter`] holds the configuration and session identity, builds an
//! event payload from the ambient [`Environment`] plus call-site arguments,
//! and posts it to `<base_url>/api/send`. Tracking never fails from the
//! caller's point of view: problems are reported through [`Diagnostics`].

pub mod config;
pub mod environment;
pub mod error;
pub mod global;
pub mod observability;
pub mod payload;
pub mod reporter;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::{BeforeSend, ReporterConfig};
pub use environment::{DoNotTrack, Environment, StaticEnvironment};
pub use error::ReporterError;
pub use observability::{DiagnosticEnvelope, Diagnostics};
pub use payload::{Envelope, EventData, EventPayload, SendResponse};
pub use reporter::{IdentifyArg, Identity, Reporter, TrackArg};
pub use transport::{HttpRequest, HttpResponse, MinreqTransport, Transport};
