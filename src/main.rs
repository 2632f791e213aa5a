//! Demo entry point.
//!
//! Loads configuration (`dispatch.toml` if present, then `DISPATCH_*` variables), starts the
//! dispatch system against the configured services, submits one work order, runs an
//! optimization and plays back whatever routes come back.

use std::path::Path;

use fleet_dispatch::config::DispatchConfig;
use fleet_dispatch::intake::WorkOrderForm;
use fleet_dispatch::lifecycle::{setup_tracing, DispatchSystem, Services};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let config = DispatchConfig::load(Some(Path::new("dispatch.toml")))?;
    info!(optimizer = %config.optimizer_url, eta = %config.eta_url, "Starting dispatch system");

    let mut system = DispatchSystem::start(&config, Services::http(&config)).await?;

    let form = WorkOrderForm {
        client_name: "Terrapin Hardware".to_string(),
        dropoff_lat: "38.9897".to_string(),
        dropoff_lon: "-76.9378".to_string(),
        ..Default::default()
    };
    let order_id = system.submit_work_order(&form).await?;
    info!(order_id = %order_id, "Work order queued");

    let span = tracing::info_span!("optimization");
    let outcome = async {
        info!("Requesting optimized assignments");
        system.run_optimization().await
    }
    .instrument(span)
    .await;

    match outcome {
        Ok(summary) => {
            info!(
                applied = summary.applied,
                rejected = summary.rejections.len(),
                "Optimization applied"
            );
            let report = system.start_simulation(&summary.routes).await?;
            info!(carriers = report.started.len(), "Route playback started");
            system.wait_for_simulation().await;

            for carrier in system.carriers().await? {
                info!(carrier = %carrier.id, position = %carrier.position, "Final position");
            }
        }
        Err(e) => error!(error = %e, "Optimization failed"),
    }

    system.shutdown().await?;
    info!("Dispatch demo completed");
    Ok(())
}
