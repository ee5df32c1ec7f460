//! Diagnostics channel for failures the reporter swallows.
//!
//! Tracking calls never return errors to the caller. Anything worth knowing
//! about (transport failures, vetoed sends) is recorded here as a structured
//! envelope, which the host can print, buffer or subscribe to.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

pub const LEVEL_ERROR: &str = "error";
pub const LEVEL_DEBUG: &str = "debug";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEnvelope {
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: String,
    pub message: String,
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl DiagnosticEnvelope {
    pub fn is_error(&self) -> bool {
        self.event_type == "error"
    }
}

pub type Subscriber = Arc<dyn Fn(&DiagnosticEnvelope) + Send + Sync>;

enum DiagnosticMode {
    /// Print errors to stderr, drop everything else
    Stderr,
    Buffered(Vec<DiagnosticEnvelope>),
    Subscriber(Subscriber),
}

pub struct Diagnostics {
    mode: Mutex<DiagnosticMode>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::stderr()
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match &*self.lock() {
            DiagnosticMode::Stderr => "stderr",
            DiagnosticMode::Buffered(_) => "buffered",
            DiagnosticMode::Subscriber(_) => "subscriber",
        };
        f.debug_struct("Diagnostics").field("mode", &mode).finish()
    }
}

impl Diagnostics {
    pub fn stderr() -> Self {
        Self {
            mode: Mutex::new(DiagnosticMode::Stderr),
        }
    }

    pub fn buffered() -> Self {
        Self {
            mode: Mutex::new(DiagnosticMode::Buffered(Vec::new())),
        }
    }

    pub fn with_subscriber<F>(callback: F) -> Self
    where
        F: Fn(&DiagnosticEnvelope) + Send + Sync + 'static,
    {
        Self {
            mode: Mutex::new(DiagnosticMode::Subscriber(Arc::new(callback))),
        }
    }

    /// Route all further envelopes to `callback`. Buffered envelopes are
    /// replayed to it first.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&DiagnosticEnvelope) + Send + Sync + 'static,
    {
        let callback: Subscriber = Arc::new(callback);
        let previous = {
            let mut mode = self.lock();
            std::mem::replace(&mut *mode, DiagnosticMode::Subscriber(callback.clone()))
        };

        if let DiagnosticMode::Buffered(pending) = previous {
            for envelope in &pending {
                callback(envelope);
            }
        }
    }

    /// Take everything buffered so far. Empty unless in buffered mode.
    pub fn drain(&self) -> Vec<DiagnosticEnvelope> {
        match &mut *self.lock() {
            DiagnosticMode::Buffered(buffer) => std::mem::take(buffer),
            _ => Vec::new(),
        }
    }

    pub fn log_error(&self, error: &dyn std::error::Error, context: Option<serde_json::Value>) {
        self.append(DiagnosticEnvelope {
            event_type: "error".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            message: error.to_string(),
            level: LEVEL_ERROR.to_string(),
            context,
        });
    }

    pub fn log_message(&self, message: &str, level: &str, context: Option<serde_json::Value>) {
        self.append(DiagnosticEnvelope {
            event_type: "message".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            message: message.to_string(),
            level: level.to_string(),
            context,
        });
    }

    fn append(&self, envelope: DiagnosticEnvelope) {
        let mut mode = self.lock();

        match &mut *mode {
            DiagnosticMode::Buffered(buffer) => buffer.push(envelope),
            DiagnosticMode::Stderr => {
                drop(mode);
                if envelope.is_error() {
                    eprintln!("[umami] {}", envelope.message);
                }
            }
            DiagnosticMode::Subscriber(callback) => {
                let callback = callback.clone();
                drop(mode); // Release lock before running host code
                callback(&envelope);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, DiagnosticMode> {
        // A panicking subscriber must not disable diagnostics for good
        self.mode.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
