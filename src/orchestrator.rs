//! # Optimization Orchestrator
//!
//! Runs one optimization at a time: `Idle -> Requesting -> {Succeeded, Failed}`, and back to
//! `Idle` when the operator acknowledges the result.
//!
//! A run snapshots the order store, hands the snapshot to the optimizer, reconciles the answer
//! against that same snapshot and applies every patch in one batch. Any failure along the way
//! leaves the order store untouched.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn, Instrument};

use crate::clients::OrderClient;
use crate::error::ErrorKind;
use crate::model::RouteMap;
use crate::notify::{Notification, Notifier};
use crate::order_actor::OrderError;
use crate::reconciler::{reconcile, ReconcileError, Rejection};
use crate::services::{OptimizerService, ServiceError};

pub const GENERIC_FAILURE_DETAIL: &str = "Please check your optimizer.";
pub const CANCELLED_DETAIL: &str = "Optimization run was cancelled before it finished";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrchestratorError {
    #[error("An optimization run is already in progress")]
    AlreadyRequesting,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("Order store error: {0}")]
    Store(#[from] OrderError),
}

impl OrchestratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestratorError::AlreadyRequesting => ErrorKind::ValidationError,
            OrchestratorError::Service(e) => e.kind(),
            OrchestratorError::Reconcile(_) => ErrorKind::MalformedResponse,
            OrchestratorError::Store(_) => ErrorKind::Store,
        }
    }

    /// Text shown to the operator.
    fn detail(&self) -> String {
        match self {
            OrchestratorError::Service(ServiceError::Status { body, .. }) if body.trim().is_empty() => {
                GENERIC_FAILURE_DETAIL.to_string()
            }
            OrchestratorError::Service(ServiceError::Status { body, .. }) => body.clone(),
            other => other.to_string(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub applied: usize,
    pub rejections: Vec<Rejection>,
    pub unmatched: usize,
    pub skipped: usize,
    pub routes: RouteMap,
    pub optimized_s3_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunFailure {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum OrchestratorState {
    #[default]
    Idle,
    Requesting,
    Succeeded(RunSummary),
    Failed(RunFailure),
}

pub struct Orchestrator {
    orders: OrderClient,
    optimizer: Arc<dyn OptimizerService>,
    notifier: Notifier,
    timeout: Duration,
    state: watch::Sender<OrchestratorState>,
}

impl Orchestrator {
    pub fn new(
        orders: OrderClient,
        optimizer: Arc<dyn OptimizerService>,
        notifier: Notifier,
        timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(OrchestratorState::Idle);
        Self {
            orders,
            optimizer,
            notifier,
            timeout,
            state,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OrchestratorState> {
        self.state.subscribe()
    }

    /// Runs one optimization. Refused while another run is in flight.
    ///
    /// Dropping the returned future mid-run settles the state as `Failed` with
    /// [`ErrorKind::Cancelled`], so the next trigger is accepted.
    pub async fn run(&self) -> Result<RunSummary, OrchestratorError> {
        let accepted = self.state.send_if_modified(|state| {
            if matches!(state, OrchestratorState::Requesting) {
                false
            } else {
                *state = OrchestratorState::Requesting;
                true
            }
        });
        if !accepted {
            warn!("Optimization already in progress");
            return Err(OrchestratorError::AlreadyRequesting);
        }

        let guard = RunGuard::arm(&self.state, &self.notifier);
        let span = tracing::info_span!("optimization");
        let outcome = self.execute().instrument(span).await;
        guard.disarm();
        match outcome {
            Ok(summary) => {
                self.state
                    .send_replace(OrchestratorState::Succeeded(summary.clone()));
                for rejection in &summary.rejections {
                    self.notifier.send(Notification::warning(
                        format!("Order {} not assigned", rejection.order),
                        rejection.reason.clone(),
                    ));
                }
                self.notifier.send(Notification::success(
                    "Optimization complete",
                    format!("{} assignments updated successfully", summary.applied),
                ));
                Ok(summary)
            }
            Err(e) => {
                warn!(kind = %e.kind(), error = %e, "Optimization failed");
                self.state.send_replace(OrchestratorState::Failed(RunFailure {
                    kind: e.kind(),
                    message: e.to_string(),
                }));
                self.notifier
                    .send(Notification::error("Optimization failed", e.detail()));
                Err(e)
            }
        }
    }

    /// Returns a settled run to `Idle`. Has no effect while idle or requesting.
    pub fn acknowledge(&self) -> bool {
        self.state.send_if_modified(|state| match state {
            OrchestratorState::Succeeded(_) | OrchestratorState::Failed(_) => {
                *state = OrchestratorState::Idle;
                true
            }
            _ => false,
        })
    }

    async fn execute(&self) -> Result<RunSummary, OrchestratorError> {
        let snapshot = self.orders.snapshot().await?;
        info!(orders = snapshot.len(), "Requesting optimization");

        let response = tokio::time::timeout(self.timeout, self.optimizer.submit(&snapshot))
            .await
            .map_err(|_| ServiceError::Timeout(self.timeout))??;

        let reconciliation = reconcile(&snapshot, &response)?;
        let applied = reconciliation.patches.len();
        if applied > 0 {
            self.orders.apply_patches(reconciliation.patches).await?;
        }
        info!(
            applied,
            rejected = reconciliation.rejections.len(),
            "Optimization applied"
        );

        Ok(RunSummary {
            applied,
            rejections: reconciliation.rejections,
            unmatched: reconciliation.unmatched.len(),
            skipped: reconciliation.skipped.len(),
            routes: response.routes,
            optimized_s3_key: response.optimized_s3_key,
        })
    }
}

/// Settles a run whose future was dropped while `Requesting`.
struct RunGuard<'a> {
    state: &'a watch::Sender<OrchestratorState>,
    notifier: &'a Notifier,
    armed: bool,
}

impl<'a> RunGuard<'a> {
    fn arm(state: &'a watch::Sender<OrchestratorState>, notifier: &'a Notifier) -> Self {
        Self {
            state,
            notifier,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("Optimization run dropped before completion");
        self.state.send_replace(OrchestratorState::Failed(RunFailure {
            kind: ErrorKind::Cancelled,
            message: CANCELLED_DETAIL.to_string(),
        }));
        self.notifier
            .send(Notification::error("Optimization failed", CANCELLED_DETAIL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AssignmentRecord, GeoPoint, JobRef, OptimizerResponse, OrderStatus, WorkOrder, WorkOrderId,
    };
    use crate::notify::NotificationKind;
    use crate::services::ScriptedOptimizer;
    use chrono::Utc;
    use fleet_actor::mock::MockClient;

    fn pending(id: &str) -> WorkOrder {
        WorkOrder {
            id: WorkOrderId::from(id),
            client_name: "Acme".to_string(),
            requested_at: Utc::now(),
            pickup: None,
            dropoff: GeoPoint::new(39.0, -76.9),
            distance_km: 1.0,
            eta_minutes: 3.0,
            status: OrderStatus::Pending,
            carrier: None,
        }
    }

    fn answer(records: Vec<(&str, Option<&str>, Option<&str>)>) -> OptimizerResponse {
        OptimizerResponse {
            assignments: records
                .into_iter()
                .map(|(job, carrier, reason)| AssignmentRecord {
                    job_id: JobRef::Id(WorkOrderId::from(job)),
                    carrier_id: carrier.map(Into::into),
                    p90_time_min: Some(14.0),
                    reason: reason.map(str::to_string),
                })
                .collect(),
            optimized_s3_key: Some("out/1.json".to_string()),
            routes: RouteMap::new(),
            deleted_input_file: true,
            deleted_key: None,
        }
    }

    fn orchestrator(mock: &MockClient<WorkOrder>, optimizer: ScriptedOptimizer) -> Orchestrator {
        Orchestrator::new(
            OrderClient::new(mock.client()),
            Arc::new(optimizer),
            Notifier::new(16),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_success_applies_one_batch_and_notifies() {
        let mut mock = MockClient::<WorkOrder>::new();
        mock.expect_list().return_ok(vec![pending("A"), pending("B")]);
        mock.expect_update_batch().return_ok(Vec::new());

        let optimizer = ScriptedOptimizer::new();
        optimizer.push(Ok(answer(vec![
            ("A", Some("C2"), None),
            ("B", None, Some("No capacity")),
        ])));
        let orch = orchestrator(&mock, optimizer);
        let mut notes = orch.notifier.subscribe();

        let summary = orch.run().await.unwrap();
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.optimized_s3_key.as_deref(), Some("out/1.json"));
        assert!(matches!(orch.state(), OrchestratorState::Succeeded(_)));

        let warning = notes.recv().await.unwrap();
        assert_eq!(warning.kind, NotificationKind::Warning);
        assert_eq!(warning.description, "No capacity");
        let success = notes.recv().await.unwrap();
        assert_eq!(success.title, "Optimization complete");
        assert!(success.description.starts_with('1'));

        assert_eq!(mock.received(), vec!["List", "UpdateBatch"]);
        mock.verify();
    }

    #[tokio::test]
    async fn test_service_failure_leaves_store_untouched() {
        let mut mock = MockClient::<WorkOrder>::new();
        mock.expect_list().return_ok(vec![pending("A")]);

        let optimizer = ScriptedOptimizer::new();
        optimizer.push(Err(ServiceError::Status {
            status: 500,
            body: String::new(),
        }));
        let orch = orchestrator(&mock, optimizer);
        let mut notes = orch.notifier.subscribe();

        let result = orch.run().await;
        assert!(matches!(result, Err(OrchestratorError::Service(_))));
        match orch.state() {
            OrchestratorState::Failed(failure) => assert_eq!(failure.kind, ErrorKind::ServiceError),
            other => panic!("unexpected state {other:?}"),
        }

        let note = notes.recv().await.unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.title, "Optimization failed");
        assert_eq!(note.description, GENERIC_FAILURE_DETAIL);
        assert_eq!(mock.received(), vec!["List"]);
    }

    #[tokio::test]
    async fn test_malformed_answer_is_not_applied() {
        let mut mock = MockClient::<WorkOrder>::new();
        mock.expect_list().return_ok(vec![pending("A")]);

        let optimizer = ScriptedOptimizer::new();
        optimizer.push(Ok(answer(vec![("A", Some("C1"), None), ("A", Some("C2"), None)])));
        let orch = orchestrator(&mock, optimizer);

        let result = orch.run().await;
        assert!(matches!(result, Err(OrchestratorError::Reconcile(_))));
        assert_eq!(mock.received(), vec!["List"]);
    }

    #[tokio::test]
    async fn test_second_trigger_is_refused_while_requesting() {
        let mut mock = MockClient::<WorkOrder>::new();
        mock.expect_list().return_ok(vec![pending("A")]);
        mock.expect_update_batch().return_ok(Vec::new());

        let optimizer = ScriptedOptimizer::gated();
        optimizer.push(Ok(answer(vec![("A", Some("C1"), None)])));
        let orch = Arc::new(orchestrator(&mock, optimizer.clone()));

        let first = tokio::spawn({
            let orch = orch.clone();
            async move { orch.run().await }
        });
        while optimizer.calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(orch.state(), OrchestratorState::Requesting);
        assert_eq!(orch.run().await, Err(OrchestratorError::AlreadyRequesting));

        optimizer.release();
        assert!(first.await.unwrap().is_ok());
        assert_eq!(optimizer.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_the_run() {
        let mut mock = MockClient::<WorkOrder>::new();
        mock.expect_list().return_ok(vec![pending("A")]);

        let optimizer = ScriptedOptimizer::gated();
        let orch = orchestrator(&mock, optimizer);

        let result = orch.run().await;
        assert_eq!(
            result,
            Err(OrchestratorError::Service(ServiceError::Timeout(
                Duration::from_secs(5)
            )))
        );
        match orch.state() {
            OrchestratorState::Failed(failure) => assert_eq!(failure.kind, ErrorKind::Timeout),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_run_does_not_block_next_trigger() {
        let mut mock = MockClient::<WorkOrder>::new();
        mock.expect_list().return_ok(vec![pending("A")]);
        mock.expect_list().return_ok(vec![pending("A")]);
        mock.expect_update_batch().return_ok(Vec::new());

        let optimizer = ScriptedOptimizer::gated();
        optimizer.push(Ok(answer(vec![("A", Some("C1"), None)])));
        let orch = orchestrator(&mock, optimizer.clone());
        let mut notes = orch.notifier.subscribe();

        let abandoned = tokio::time::timeout(Duration::from_millis(50), orch.run()).await;
        assert!(abandoned.is_err());
        assert_eq!(optimizer.calls(), 1);
        match orch.state() {
            OrchestratorState::Failed(failure) => {
                assert_eq!(failure.kind, ErrorKind::Cancelled);
                assert_eq!(failure.message, CANCELLED_DETAIL);
            }
            other => panic!("unexpected state {other:?}"),
        }
        let note = notes.recv().await.unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.description, CANCELLED_DETAIL);

        optimizer.release();
        let summary = orch.run().await.unwrap();
        assert_eq!(summary.applied, 1);
        assert!(matches!(orch.state(), OrchestratorState::Succeeded(_)));
        assert_eq!(mock.received(), vec!["List", "List", "UpdateBatch"]);
    }

    #[tokio::test]
    async fn test_acknowledge_returns_to_idle() {
        let mut mock = MockClient::<WorkOrder>::new();
        mock.expect_list().return_err(fleet_actor::FrameworkError::ActorClosed);
        let orch = orchestrator(&mock, ScriptedOptimizer::new());

        assert!(!orch.acknowledge());
        assert!(orch.run().await.is_err());
        assert!(matches!(orch.state(), OrchestratorState::Failed(ref f) if f.kind == ErrorKind::Store));
        assert!(orch.acknowledge());
        assert_eq!(orch.state(), OrchestratorState::Idle);
    }
}
