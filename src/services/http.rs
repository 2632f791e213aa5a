//! reqwest-backed service adapters.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{EtaPredictor, OptimizerService, RosterSource, ServiceError};
use crate::model::{
    CarrierCreate, EtaPrediction, EtaRequest, OptimizerResponse, OptimizerTrigger, WorkOrder,
};

/// Sends the request and decodes a JSON body.
///
/// Non-2xx becomes [`ServiceError::Status`] carrying the body text; a body that does not decode
/// as `T` becomes [`ServiceError::Malformed`].
async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    timeout: Duration,
) -> Result<T, ServiceError> {
    let response = request
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| transport_error(e, timeout))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(e, timeout))?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "Service returned an error status");
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| ServiceError::Malformed(e.to_string()))
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout(timeout)
    } else {
        ServiceError::Network(e.to_string())
    }
}

/// POSTs `{"trigger": "run_optimizer"}` to the optimizer endpoint.
#[derive(Clone)]
pub struct HttpOptimizer {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpOptimizer {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl OptimizerService for HttpOptimizer {
    /// Sends only the trigger. The service reads its job list from shared storage, so
    /// `snapshot` is not transmitted; it is recorded on the span. Integer `job_id`s in the
    /// answer are positions in the snapshot the caller captured just before this call, and
    /// the reconciler resolves them against that same snapshot.
    #[instrument(skip(self, snapshot), fields(url = %self.url, orders = snapshot.len()))]
    async fn submit(&self, snapshot: &[WorkOrder]) -> Result<OptimizerResponse, ServiceError> {
        debug!("Triggering optimizer");
        let request = self
            .client
            .post(&self.url)
            .json(&OptimizerTrigger::default());
        send_json(request, self.timeout).await
    }
}

#[derive(Clone)]
pub struct HttpEtaPredictor {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpEtaPredictor {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl EtaPredictor for HttpEtaPredictor {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn predict(&self, request: &EtaRequest) -> Result<EtaPrediction, ServiceError> {
        let prediction: EtaPrediction =
            send_json(self.client.post(&self.url).json(request), self.timeout).await?;
        if !prediction.eta_minutes.is_finite()
            || prediction.eta_minutes < 0.0
            || !prediction.distance_km.is_finite()
            || prediction.distance_km < 0.0
        {
            return Err(ServiceError::Malformed(format!(
                "prediction out of range: eta {} min, distance {} km",
                prediction.eta_minutes, prediction.distance_km
            )));
        }
        Ok(prediction)
    }
}

/// GETs `[{id, lat, lng, hours_worked}]`.
#[derive(Clone)]
pub struct HttpRoster {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpRoster {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl RosterSource for HttpRoster {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<CarrierCreate>, ServiceError> {
        send_json(self.client.get(&self.url), self.timeout).await
    }
}
