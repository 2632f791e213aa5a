use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Instrument};

use crate::carrier_actor;
use crate::clients::{CarrierClient, OrderClient};
use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::intake::WorkOrderForm;
use crate::model::{Carrier, CarrierId, RouteMap, WorkOrder, WorkOrderId};
use crate::notify::{Notification, Notifier};
use crate::orchestrator::{Orchestrator, OrchestratorState, RunSummary};
use crate::order_actor;
use crate::services::{
    EtaPredictor, HttpEtaPredictor, HttpOptimizer, HttpRoster, OptimizerService, RosterSource,
    ServiceError, StaticRoster,
};
use crate::simulator::{PositionSimulator, Progress, StartReport};
use fleet_actor::ActorClient;

/// The external capabilities the system depends on.
#[derive(Clone)]
pub struct Services {
    pub optimizer: Arc<dyn OptimizerService>,
    pub eta: Arc<dyn EtaPredictor>,
    pub roster: Arc<dyn RosterSource>,
}

impl Services {
    /// HTTP adapters for the configured endpoints. Without a roster URL the built-in roster
    /// is used.
    pub fn http(config: &DispatchConfig) -> Self {
        let client = reqwest::Client::new();
        let timeout = config.request_timeout();
        let roster: Arc<dyn RosterSource> = match &config.roster_url {
            Some(url) => Arc::new(HttpRoster::new(client.clone(), url, timeout)),
            None => Arc::new(StaticRoster::seed()),
        };
        Self {
            optimizer: Arc::new(HttpOptimizer::new(
                client.clone(),
                &config.optimizer_url,
                timeout,
            )),
            eta: Arc::new(HttpEtaPredictor::new(client, &config.eta_url, timeout)),
            roster,
        }
    }
}

/// The running dispatch core.
///
/// `DispatchSystem` is responsible for:
/// - **Lifecycle Management**: spawning the order and carrier stores and stopping them
/// - **Dependency Wiring**: handing store clients to the orchestrator and the simulator
/// - **Operator Surface**: the operations a dashboard calls
///
/// # Example
///
/// ```rust,ignore
/// let config = DispatchConfig::load(None)?;
/// let mut system = DispatchSystem::start(&config, Services::http(&config)).await?;
///
/// let id = system.submit_work_order(&form).await?;
/// let summary = system.run_optimization().await?;
/// system.start_simulation(&summary.routes).await?;
///
/// system.shutdown().await?;
/// ```
pub struct DispatchSystem {
    /// Client for the Order store
    pub order_client: OrderClient,

    /// Client for the Carrier store
    pub carrier_client: CarrierClient,

    orchestrator: Orchestrator,
    simulator: PositionSimulator,
    eta: Arc<dyn EtaPredictor>,
    notifier: Notifier,
    request_timeout: Duration,

    /// Store tasks, awaited on shutdown
    handles: Vec<JoinHandle<()>>,
}

impl DispatchSystem {
    /// Spawns both stores and seeds the carrier store from the roster.
    pub async fn start(config: &DispatchConfig, services: Services) -> Result<Self, DispatchError> {
        config.validate()?;

        // =====================================================================
        // 1. Stores (no dependencies)
        // =====================================================================

        let (order_actor, order_client) = order_actor::new(config.store_buffer);
        let order_handle = tokio::spawn(order_actor.run(()));

        let (carrier_actor, carrier_client) = carrier_actor::new(config.store_buffer);
        let carrier_handle = tokio::spawn(carrier_actor.run(()));

        // =====================================================================
        // 2. Roster
        // =====================================================================

        let roster = tokio::time::timeout(config.request_timeout(), services.roster.fetch())
            .await
            .map_err(|_| ServiceError::Timeout(config.request_timeout()))??;
        for entry in roster {
            carrier_client.register(entry).await?;
        }
        info!(carriers = carrier_client.list().await?.len(), "Roster loaded");

        // =====================================================================
        // 3. Workflows
        // =====================================================================

        let notifier = Notifier::new(64);
        let orchestrator = Orchestrator::new(
            order_client.clone(),
            services.optimizer,
            notifier.clone(),
            config.request_timeout(),
        );
        let simulator = PositionSimulator::new(carrier_client.clone(), config.tick_interval());

        Ok(Self {
            order_client,
            carrier_client,
            orchestrator,
            simulator,
            eta: services.eta,
            notifier,
            request_timeout: config.request_timeout(),
            handles: vec![order_handle, carrier_handle],
        })
    }

    /// Validates the form, creates the order and records its predicted ETA.
    ///
    /// A failed prediction does not block the order: it keeps zero ETA and distance and a
    /// warning is sent.
    pub async fn submit_work_order(&self, form: &WorkOrderForm) -> Result<WorkOrderId, DispatchError> {
        let order = form.validate(Utc::now())?;
        let request = order.eta_request();
        let client_name = order.client_name.clone();

        let span = tracing::info_span!("work_order_intake", client = %client_name);
        async {
            let id = self.order_client.submit(order.into_create()).await?;

            let prediction = tokio::time::timeout(self.request_timeout, self.eta.predict(&request))
                .await
                .map_err(|_| ServiceError::Timeout(self.request_timeout))
                .and_then(|result| result);
            match prediction {
                Ok(prediction) => {
                    self.order_client
                        .record_prediction(id.clone(), prediction)
                        .await?;
                }
                Err(e) => {
                    warn!(%id, error = %e, "ETA prediction failed");
                    self.notifier.send(Notification::warning(
                        "ETA prediction unavailable",
                        format!("Order {id} was created without an estimate: {e}"),
                    ));
                }
            }

            self.notifier.send(Notification::success(
                "Work order submitted successfully",
                format!("Order for {client_name} has been added to the queue."),
            ));
            Ok::<_, DispatchError>(id)
        }
        .instrument(span)
        .await
    }

    pub async fn run_optimization(&self) -> Result<RunSummary, DispatchError> {
        Ok(self.orchestrator.run().await?)
    }

    pub fn optimization_state(&self) -> OrchestratorState {
        self.orchestrator.state()
    }

    pub fn watch_optimization(&self) -> watch::Receiver<OrchestratorState> {
        self.orchestrator.subscribe()
    }

    /// Clears a finished optimization result.
    pub fn acknowledge_optimization(&self) -> bool {
        self.orchestrator.acknowledge()
    }

    pub async fn start_simulation(&mut self, routes: &RouteMap) -> Result<StartReport, DispatchError> {
        let report = self.simulator.start(routes).await?;
        if !report.unknown.is_empty() {
            let names: Vec<String> = report.unknown.iter().map(ToString::to_string).collect();
            self.notifier.send(Notification::warning(
                "Unknown carriers in route map",
                names.join(", "),
            ));
        }
        Ok(report)
    }

    pub fn simulation_progress(&self, carrier: &CarrierId) -> Option<Progress> {
        self.simulator.progress(carrier)
    }

    /// Waits for every running route to play out.
    pub async fn wait_for_simulation(&mut self) {
        self.simulator.wait_all().await;
    }

    pub async fn complete_order(&self, id: WorkOrderId) -> Result<WorkOrder, DispatchError> {
        Ok(self.order_client.complete(id).await?)
    }

    pub async fn orders(&self) -> Result<Vec<WorkOrder>, DispatchError> {
        Ok(self.order_client.snapshot().await?)
    }

    pub async fn carriers(&self) -> Result<Vec<Carrier>, DispatchError> {
        Ok(self.carrier_client.list().await?)
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Stops the simulation, closes both stores and waits for them to exit.
    pub async fn shutdown(self) -> Result<(), DispatchError> {
        info!("Shutting down dispatch system...");
        let DispatchSystem {
            order_client,
            carrier_client,
            orchestrator,
            mut simulator,
            handles,
            ..
        } = self;

        simulator.cancel_all().await;

        // Every client clone must go before the stores see their channels close.
        drop(simulator);
        drop(orchestrator);
        drop(order_client);
        drop(carrier_client);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Store task failed: {:?}", e);
                return Err(DispatchError::Shutdown(e.to_string()));
            }
        }

        info!("Dispatch system shutdown complete.");
        Ok(())
    }
}
