//! # Position Simulator
//!
//! Plays precomputed routes back on the carrier store: once per tick each running carrier is
//! moved to its next waypoint. One task per carrier, owned by the simulator. Starting a new
//! route for a carrier aborts and joins its previous task first, so a carrier never has two
//! writers.
//!
//! Playback is presentation only. There is no notion of speed, distance or collisions.

pub mod playback;

pub use playback::{PlaybackState, Progress, RoutePlayback};

use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn, Instrument};

use crate::carrier_actor::CarrierError;
use crate::clients::CarrierClient;
use crate::model::{CarrierId, RouteMap};
use fleet_actor::ActorClient;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulatorError {
    #[error("Carrier store error: {0}")]
    Store(#[from] CarrierError),
}

/// What a call to [`PositionSimulator::start`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartReport {
    pub started: Vec<CarrierId>,
    /// Carriers named in the route map that the carrier store does not know.
    pub unknown: Vec<CarrierId>,
}

pub struct PositionSimulator {
    carriers: CarrierClient,
    tick: Duration,
    tasks: HashMap<CarrierId, JoinHandle<()>>,
    progress: HashMap<CarrierId, watch::Receiver<Progress>>,
}

impl PositionSimulator {
    pub fn new(carriers: CarrierClient, tick: Duration) -> Self {
        Self {
            carriers,
            tick,
            tasks: HashMap::new(),
            progress: HashMap::new(),
        }
    }

    /// Starts playback for every carrier in `routes`.
    ///
    /// Carriers absent from `routes` keep whatever run they have.
    pub async fn start(&mut self, routes: &RouteMap) -> Result<StartReport, SimulatorError> {
        let mut ids: Vec<&CarrierId> = routes.keys().collect();
        ids.sort();

        let mut report = StartReport::default();
        for id in ids {
            if self.carriers.get(id.clone()).await?.is_none() {
                warn!(carrier = %id, "Route for unknown carrier skipped");
                report.unknown.push(id.clone());
                continue;
            }
            if let Some(previous) = self.tasks.remove(id) {
                previous.abort();
                let _ = previous.await;
                debug!(carrier = %id, "Previous run replaced");
            }

            let playback = RoutePlayback::new(routes[id].clone());
            let (progress_tx, progress_rx) = watch::channel(playback.progress());
            let span = tracing::info_span!("playback", carrier = %id);
            let handle = tokio::spawn(
                play(
                    self.carriers.clone(),
                    id.clone(),
                    playback,
                    self.tick,
                    progress_tx,
                )
                .instrument(span),
            );
            self.tasks.insert(id.clone(), handle);
            self.progress.insert(id.clone(), progress_rx);
            report.started.push(id.clone());
        }

        info!(
            started = report.started.len(),
            unknown = report.unknown.len(),
            "Simulation started"
        );
        Ok(report)
    }

    pub fn progress(&self, carrier: &CarrierId) -> Option<Progress> {
        self.progress.get(carrier).map(|rx| *rx.borrow())
    }

    /// Number of playback tasks still running.
    pub fn active_runs(&self) -> usize {
        self.tasks.values().filter(|h| !h.is_finished()).count()
    }

    /// Waits until every current run has played its whole route.
    ///
    /// A run whose task died has its progress entry dropped, since it will never finish.
    pub async fn wait_all(&mut self) {
        for (id, handle) in self.tasks.drain() {
            if let Err(e) = handle.await {
                error!(carrier = %id, error = %e, "Playback task failed");
                self.progress.remove(&id);
            }
        }
    }

    /// Aborts and joins every run. No position is written after this returns.
    ///
    /// Progress is kept only for runs that had already finished.
    pub async fn cancel_all(&mut self) {
        let count = self.tasks.len();
        for (id, handle) in self.tasks.drain() {
            handle.abort();
            if let Err(e) = handle.await {
                if e.is_panic() {
                    error!(carrier = %id, error = %e, "Playback task failed");
                }
            }
        }
        self.progress
            .retain(|_, rx| rx.borrow().state == PlaybackState::Finished);
        // A write sent just before the abort may still be queued in the store; a read
        // round-trip lets it drain first.
        let _ = self.carriers.list().await;
        info!(count, "Simulation cancelled");
    }
}

impl Drop for PositionSimulator {
    fn drop(&mut self) {
        for handle in self.tasks.values() {
            handle.abort();
        }
    }
}

async fn play(
    carriers: CarrierClient,
    id: CarrierId,
    mut playback: RoutePlayback,
    tick: Duration,
    progress: watch::Sender<Progress>,
) {
    playback.start();
    progress.send_replace(playback.progress());

    let mut interval = interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while playback.state() == PlaybackState::Running {
        interval.tick().await;
        let Some(waypoint) = playback.tick() else {
            break;
        };
        if let Err(e) = carriers.move_to(id.clone(), waypoint).await {
            warn!(error = %e, "Position write failed");
        }
        progress.send_replace(playback.progress());
    }
    debug!(steps = playback.progress().steps, "Route finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier_actor;
    use crate::model::{CarrierCreate, GeoPoint};

    async fn carrier_store(ids: &[&str]) -> CarrierClient {
        let (actor, client) = carrier_actor::new(32);
        tokio::spawn(actor.run(()));
        for id in ids {
            client
                .register(CarrierCreate::new(*id, 0.0, 0.0, 1.0))
                .await
                .unwrap();
        }
        client
    }

    fn route(points: &[(f64, f64)]) -> Vec<GeoPoint> {
        points.iter().map(|(lat, lng)| GeoPoint::new(*lat, *lng)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_waypoints_end_on_last_point() {
        let carriers = carrier_store(&["C1"]).await;
        let before = carriers.subscribe().borrow().revision;
        let mut sim = PositionSimulator::new(carriers.clone(), Duration::from_secs(1));

        let routes = RouteMap::from([(CarrierId::from("C1"), route(&[(1.0, 1.0), (2.0, 2.0)]))]);
        sim.start(&routes).await.unwrap();
        sim.wait_all().await;

        let c1 = carriers.get(CarrierId::from("C1")).await.unwrap().unwrap();
        assert_eq!(c1.position, GeoPoint::new(2.0, 2.0));
        assert_eq!(
            sim.progress(&CarrierId::from("C1")),
            Some(Progress {
                state: PlaybackState::Finished,
                steps: 2,
                total: 2
            })
        );
        assert_eq!(carriers.subscribe().borrow().revision, before + 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_write_waits_one_tick() {
        let carriers = carrier_store(&["C1"]).await;
        let mut sim = PositionSimulator::new(carriers.clone(), Duration::from_secs(1));
        let routes = RouteMap::from([(CarrierId::from("C1"), route(&[(5.0, 5.0), (6.0, 6.0)]))]);
        sim.start(&routes).await.unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;
        let c1 = carriers.get(CarrierId::from("C1")).await.unwrap().unwrap();
        assert_eq!(c1.position, GeoPoint::new(0.0, 0.0));

        tokio::time::sleep(Duration::from_millis(600)).await;
        let c1 = carriers.get(CarrierId::from("C1")).await.unwrap().unwrap();
        assert_eq!(c1.position, GeoPoint::new(5.0, 5.0));
        sim.cancel_all().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_route_writes_nothing() {
        let carriers = carrier_store(&["C1"]).await;
        let before = carriers.subscribe().borrow().revision;
        let mut sim = PositionSimulator::new(carriers.clone(), Duration::from_secs(1));

        sim.start(&RouteMap::from([(CarrierId::from("C1"), Vec::new())]))
            .await
            .unwrap();
        sim.wait_all().await;

        assert_eq!(
            sim.progress(&CarrierId::from("C1")).map(|p| p.state),
            Some(PlaybackState::Finished)
        );
        assert_eq!(carriers.subscribe().borrow().revision, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_replaces_run() {
        let carriers = carrier_store(&["C1", "C2"]).await;
        let mut sim = PositionSimulator::new(carriers.clone(), Duration::from_secs(1));

        let long: Vec<(f64, f64)> = (1..=10).map(|i| (i as f64, 0.0)).collect();
        sim.start(&RouteMap::from([
            (CarrierId::from("C1"), route(&long)),
            (CarrierId::from("C2"), route(&long)),
        ]))
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        sim.start(&RouteMap::from([(
            CarrierId::from("C1"),
            route(&[(50.0, 50.0)]),
        )]))
        .await
        .unwrap();
        assert_eq!(sim.active_runs(), 2);

        sim.wait_all().await;
        assert_eq!(sim.active_runs(), 0);

        let c1 = carriers.get(CarrierId::from("C1")).await.unwrap().unwrap();
        let c2 = carriers.get(CarrierId::from("C2")).await.unwrap().unwrap();
        assert_eq!(c1.position, GeoPoint::new(50.0, 50.0));
        assert_eq!(c2.position, GeoPoint::new(10.0, 0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_carrier_is_reported() {
        let carriers = carrier_store(&["C1"]).await;
        let mut sim = PositionSimulator::new(carriers, Duration::from_secs(1));

        let report = sim
            .start(&RouteMap::from([
                (CarrierId::from("C1"), route(&[(1.0, 1.0)])),
                (CarrierId::from("C9"), route(&[(1.0, 1.0)])),
            ]))
            .await
            .unwrap();

        assert_eq!(report.started, vec![CarrierId::from("C1")]);
        assert_eq!(report.unknown, vec![CarrierId::from("C9")]);
        assert!(sim.progress(&CarrierId::from("C9")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_writes_after_cancel() {
        let carriers = carrier_store(&["C1"]).await;
        let mut sim = PositionSimulator::new(carriers.clone(), Duration::from_secs(1));
        let long: Vec<(f64, f64)> = (1..=10).map(|i| (i as f64, 0.0)).collect();
        sim.start(&RouteMap::from([(CarrierId::from("C1"), route(&long))]))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        sim.cancel_all().await;
        let frozen = carriers.subscribe().borrow().revision;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(carriers.subscribe().borrow().revision, frozen);
        assert_eq!(sim.active_runs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_progress_of_unfinished_runs() {
        let carriers = carrier_store(&["C1", "C2"]).await;
        let mut sim = PositionSimulator::new(carriers, Duration::from_secs(1));
        let long: Vec<(f64, f64)> = (1..=10).map(|i| (i as f64, 0.0)).collect();
        sim.start(&RouteMap::from([
            (CarrierId::from("C1"), route(&long)),
            (CarrierId::from("C2"), route(&[(3.0, 3.0)])),
        ]))
        .await
        .unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(
            sim.progress(&CarrierId::from("C1")).map(|p| p.state),
            Some(PlaybackState::Running)
        );
        sim.cancel_all().await;

        assert_eq!(sim.progress(&CarrierId::from("C1")), None);
        assert_eq!(
            sim.progress(&CarrierId::from("C2")).map(|p| p.state),
            Some(PlaybackState::Finished)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_run_does_not_look_alive() {
        let carriers = carrier_store(&["C1"]).await;
        // A zero period makes the playback timer panic inside the task.
        let mut sim = PositionSimulator::new(carriers.clone(), Duration::ZERO);
        sim.start(&RouteMap::from([(CarrierId::from("C1"), route(&[(1.0, 1.0)]))]))
            .await
            .unwrap();

        sim.wait_all().await;

        assert_eq!(sim.active_runs(), 0);
        assert_eq!(sim.progress(&CarrierId::from("C1")), None);
        let c1 = carriers.get(CarrierId::from("C1")).await.unwrap().unwrap();
        assert_eq!(c1.position, GeoPoint::new(0.0, 0.0));
    }
}
