#![allow(dead_code)]

use conduit::{Extension, Hooks, Message, Next, RequestContext};
use std::sync::{Arc, Mutex};

// ============================================================================
// Logging
// ============================================================================

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Test Extensions
// ============================================================================

/// Writes `key` into ext after recording which keys it found.
pub struct KeyWriter {
    pub key: String,
    pub observed: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl Extension for KeyWriter {
    fn hooks(&self) -> Hooks {
        Hooks::INCOMING
    }

    fn name(&self) -> &str {
        &self.key
    }

    async fn incoming(&self, mut message: Message, _context: &RequestContext, next: Next) {
        let mut keys: Vec<String> = message
            .ext()
            .map(|ext| ext.iter().map(|(key, _)| key.clone()).collect())
            .unwrap_or_default();
        keys.sort();
        self.observed.lock().unwrap().push((self.key.clone(), keys));
        message
            .ext_mut()
            .insert(self.key.clone(), serde_json::Value::Bool(true));
        next.resume(message);
    }
}

/// Resumes its continuation `calls` times.
pub struct Resumer {
    pub calls: usize,
}

impl Extension for Resumer {
    fn hooks(&self) -> Hooks {
        Hooks::INCOMING
    }

    fn name(&self) -> &str {
        "resumer"
    }

    async fn incoming(&self, message: Message, _context: &RequestContext, next: Next) {
        let next = next.shared();
        for _ in 0..self.calls {
            next.resume(message.clone());
        }
    }
}
