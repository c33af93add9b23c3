//! Recording transport for client unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Barrier;

use crate::client::{Transport, TransportRequest};
use crate::error::{ApiError, Result};

/// Echoes every request back with a call counter, or fails on demand.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    sent: Arc<Mutex<Vec<TransportRequest>>>,
    failing: Arc<AtomicBool>,
    /// When set, every send waits here before answering
    gate: Option<Arc<Barrier>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that answers only once `parties` sends are in flight at
    /// the same time.
    pub fn gated(parties: usize) -> Self {
        Self {
            gate: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<TransportRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<Value> {
        let call = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(request.clone());
            sent.len()
        };

        if let Some(gate) = &self.gate {
            gate.wait().await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Server("mock failure".to_string()));
        }

        Ok(json!({
            "call": call,
            "method": request.method.as_str(),
            "endpoint": request.endpoint,
        }))
    }
}
