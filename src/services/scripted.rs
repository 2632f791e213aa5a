//! In-process services that answer from a script.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::{EtaPredictor, OptimizerService, ServiceError};
use crate::model::{EtaPrediction, EtaRequest, OptimizerResponse, WorkOrder};

/// Optimizer that replays queued replies in order.
///
/// With a gate installed, every call parks until [`ScriptedOptimizer::release`] is called, which
/// lets a test observe the orchestrator mid-request. An exhausted script answers with
/// [`ServiceError::Network`].
#[derive(Clone, Default)]
pub struct ScriptedOptimizer {
    replies: Arc<Mutex<VecDeque<Result<OptimizerResponse, ServiceError>>>>,
    gate: Option<Arc<Notify>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls wait for [`release`](Self::release) before answering.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::default()
        }
    }

    pub fn push(&self, reply: Result<OptimizerResponse, ServiceError>) -> &Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    /// Lets one parked call through.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OptimizerService for ScriptedOptimizer {
    async fn submit(&self, _snapshot: &[WorkOrder]) -> Result<OptimizerResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front());
        next.unwrap_or_else(|| Err(ServiceError::Network("no scripted reply".to_string())))
    }
}

/// Predictor that always gives the same answer.
#[derive(Debug, Clone)]
pub struct FixedEta {
    reply: Result<EtaPrediction, ServiceError>,
}

impl FixedEta {
    pub fn new(eta_minutes: f64, distance_km: f64) -> Self {
        Self {
            reply: Ok(EtaPrediction {
                eta_minutes,
                distance_km,
            }),
        }
    }

    pub fn failing(error: ServiceError) -> Self {
        Self { reply: Err(error) }
    }
}

#[async_trait]
impl EtaPredictor for FixedEta {
    async fn predict(&self, _request: &EtaRequest) -> Result<EtaPrediction, ServiceError> {
        self.reply.clone()
    }
}
