//! # Result Reconciler
//!
//! Turns an optimizer response into per-order patches against the order snapshot that was
//! captured when the request was made. Pure: the caller decides whether to apply the result.
//!
//! Records are matched by order identity. A numeric `job_id` is a 0-based position in the
//! request-time snapshot, never in the live order list, so orders created while the optimizer
//! was running cannot shift the mapping.

use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

use crate::model::{
    JobRef, OptimizerResponse, OrderPatch, OrderStatus, WorkOrder, WorkOrderId,
};

pub const DEFAULT_REJECTION_REASON: &str = "No carrier assigned";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReconcileError {
    #[error("Malformed optimizer response: {0}")]
    MalformedResponse(String),
}

/// An order the optimizer could not place. Shown to the operator, never stored on the order.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub order: WorkOrderId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub patches: Vec<(WorkOrderId, OrderPatch)>,
    pub rejections: Vec<Rejection>,
    /// References that resolve to no order in the snapshot.
    pub unmatched: Vec<JobRef>,
    /// Orders already completed; reconciliation never touches them.
    pub skipped: Vec<WorkOrderId>,
}

pub fn reconcile(
    snapshot: &[WorkOrder],
    response: &OptimizerResponse,
) -> Result<Reconciliation, ReconcileError> {
    let by_id: HashMap<&WorkOrderId, &WorkOrder> =
        snapshot.iter().map(|order| (&order.id, order)).collect();
    let mut seen: HashSet<&WorkOrderId> = HashSet::new();
    let mut result = Reconciliation::default();

    for (position, record) in response.assignments.iter().enumerate() {
        if let JobRef::Id(id) = &record.job_id {
            if id.as_str().trim().is_empty() {
                return Err(malformed(position, "empty job_id"));
            }
        }
        if let Some(carrier) = &record.carrier_id {
            if carrier.as_str().trim().is_empty() {
                return Err(malformed(position, "empty carrier_id"));
            }
        }
        if let Some(minutes) = record.p90_time_min {
            if !minutes.is_finite() || minutes < 0.0 {
                return Err(malformed(position, &format!("invalid p90_time_min {minutes}")));
            }
        }

        let order = match &record.job_id {
            JobRef::Id(id) => by_id.get(id).copied(),
            JobRef::Index(index) => snapshot.get(*index),
        };
        let Some(order) = order else {
            debug!(job_id = %record.job_id, "Unmatched assignment");
            result.unmatched.push(record.job_id.clone());
            continue;
        };
        if !seen.insert(&order.id) {
            return Err(malformed(
                position,
                &format!("second record for order {}", order.id),
            ));
        }

        if order.status == OrderStatus::Completed {
            result.skipped.push(order.id.clone());
            continue;
        }

        match (&record.carrier_id, &record.reason) {
            (Some(carrier), None) => {
                result.patches.push((
                    order.id.clone(),
                    OrderPatch::assign(carrier.clone(), record.p90_time_min),
                ));
            }
            (_, reason) => {
                let reason = reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .unwrap_or(DEFAULT_REJECTION_REASON);
                result.rejections.push(Rejection {
                    order: order.id.clone(),
                    reason: reason.to_string(),
                });
            }
        }
    }

    debug!(
        patches = result.patches.len(),
        rejections = result.rejections.len(),
        unmatched = result.unmatched.len(),
        skipped = result.skipped.len(),
        "Reconciled"
    );
    Ok(result)
}

fn malformed(position: usize, detail: &str) -> ReconcileError {
    ReconcileError::MalformedResponse(format!("assignment {position}: {detail}"))
}
