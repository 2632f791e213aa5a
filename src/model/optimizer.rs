//! Wire types exchanged with the external services.

use serde::{Deserialize, Serialize};

use super::{CarrierId, RouteMap, WorkOrderId};

/// How an assignment record refers to its order.
///
/// Either the order's id, or its 0-based position in the snapshot that was sent with the
/// request. Never a position in the live order list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobRef {
    Index(usize),
    Id(WorkOrderId),
}

impl std::fmt::Display for JobRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobRef::Index(index) => write!(f, "#{index}"),
            JobRef::Id(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub job_id: JobRef,
    pub carrier_id: Option<CarrierId>,
    pub p90_time_min: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl AssignmentRecord {
    /// `"14.00 min"`, or `"N/A"` when the optimizer gave no time.
    pub fn time_label(&self) -> String {
        match self.p90_time_min {
            Some(minutes) => format!("{minutes:.2} min"),
            None => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerResponse {
    pub assignments: Vec<AssignmentRecord>,
    #[serde(default)]
    pub optimized_s3_key: Option<String>,
    #[serde(default)]
    pub routes: RouteMap,
    #[serde(default)]
    pub deleted_input_file: bool,
    #[serde(default)]
    pub deleted_key: Option<String>,
}

/// Body sent to the optimizer. The service reads its job list from shared storage.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizerTrigger {
    pub trigger: &'static str,
}

impl Default for OptimizerTrigger {
    fn default() -> Self {
        Self {
            trigger: "run_optimizer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtaRequest {
    pub client_name: String,
    pub dropoff_lat: f64,
    pub dropoff_lon: f64,
    /// 0 = Sunday.
    pub day_of_week: u32,
    pub hour: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtaPrediction {
    pub eta_minutes: f64,
    pub distance_km: f64,
}
