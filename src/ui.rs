// src/ui.rs

//! Informational log sink for build decisions.
//!
//! The orchestrator reports skips, compiles and failures as advisory text
//! lines through this trait rather than a global logger, so embedders and
//! tests can capture the messages without global state.

use std::sync::Mutex;

use tracing::info;

/// One-method collaborator consuming informational text lines.
pub trait Ui: Send + Sync {
    fn info(&self, message: &str);
}

/// Default sink: forward everything to `tracing::info!`.
#[derive(Debug, Default)]
pub struct TracingUi;

impl Ui for TracingUi {
    fn info(&self, message: &str) {
        info!("{message}");
    }
}

/// Sink that collects messages in memory, for tests and embedders that want
/// to inspect build decisions.
#[derive(Debug, Default)]
pub struct MemoryUi {
    messages: Mutex<Vec<String>>,
}

impl MemoryUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("ui lock poisoned").clone()
    }
}

impl Ui for MemoryUi {
    fn info(&self, message: &str) {
        self.messages
            .lock()
            .expect("ui lock poisoned")
            .push(message.to_string());
    }
}
