// tracking_session.rs
//
// The ticker around a `RouteSimulator`: one tokio task calls `advance()` per
// interval and republishes the snapshot on a watch channel. A second,
// independent task keeps the wall clock for the tracking header.

use crate::shared_data::SimulationState;
use crate::simulation_engine::simulator::RouteSimulator;
use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

/// A published snapshot and the simulator tick that produced it.
///
/// The watch channel keeps only the latest value, so a lagging reader can
/// skip ticks; `tick` still names the one it is looking at.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSnapshot {
    pub tick: u64,
    pub state: SimulationState,
}

// Everything a tick touches lives behind one lock. `generation` is bumped by
// every start and stop, so a ticker from an earlier run sees a mismatch and
// leaves without advancing.
struct SessionCore {
    simulator: RouteSimulator,
    generation: u64,
}

impl SessionCore {
    fn publish(&self, snapshot_tx: &watch::Sender<TickSnapshot>) {
        snapshot_tx.send_replace(TickSnapshot {
            tick: self.simulator.ticks(),
            state: self.simulator.snapshot(),
        });
    }
}

pub struct TrackingSession {
    core: Arc<Mutex<SessionCore>>,
    snapshot_tx: watch::Sender<TickSnapshot>,
    tick_interval: Duration,
    ticker: Option<JoinHandle<()>>,
}

impl TrackingSession {
    pub fn new(simulator: RouteSimulator, tick_interval: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(TickSnapshot {
            tick: simulator.ticks(),
            state: simulator.snapshot(),
        });
        Self {
            core: Arc::new(Mutex::new(SessionCore {
                simulator,
                generation: 0,
            })),
            snapshot_tx,
            tick_interval,
            ticker: None,
        }
    }

    /// Resets the simulator and starts ticking. Restarting a running session
    /// retires the old ticker first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.cancel_ticker();
        let generation = {
            let mut core = lock_core(&self.core);
            core.generation += 1;
            core.simulator.start();
            core.publish(&self.snapshot_tx);
            core.generation
        };

        let core = Arc::clone(&self.core);
        let snapshot_tx = self.snapshot_tx.clone();
        let period = self.tick_interval;
        self.ticker = Some(tokio::spawn(async move {
            // First tick lands one period after start, not immediately.
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if !run_tick(&core, generation, &snapshot_tx) {
                    break;
                }
            }
        }));
    }

    /// Stops the simulator, keeping its last state, and retires the ticker.
    /// Safe to call when already stopped.
    pub fn stop(&mut self) {
        {
            let mut core = lock_core(&self.core);
            core.generation += 1;
            core.simulator.stop();
        }
        self.cancel_ticker();
    }

    pub fn is_running(&self) -> bool {
        lock_core(&self.core).simulator.is_running()
    }

    pub fn subscribe(&self) -> watch::Receiver<TickSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> SimulationState {
        self.snapshot_tx.borrow().state.clone()
    }

    /// Ticks applied since the last start.
    pub fn ticks(&self) -> u64 {
        lock_core(&self.core).simulator.ticks()
    }

    fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

// One ticker step for the run tagged `generation`. Advances and publishes
// under the lock; returns false once the ticker should exit.
fn run_tick(
    core: &Mutex<SessionCore>,
    generation: u64,
    snapshot_tx: &watch::Sender<TickSnapshot>,
) -> bool {
    let mut core = lock_core(core);
    if core.generation != generation {
        return false;
    }
    match core.simulator.advance() {
        Ok(true) => {
            core.publish(snapshot_tx);
            true
        }
        Ok(false) => false,
        Err(e) => {
            log::error!("Simulation tick failed: {}", e);
            core.simulator.stop();
            false
        }
    }
}

// A panic mid-tick leaves the state from the last completed tick, which is
// still a valid snapshot.
fn lock_core(core: &Mutex<SessionCore>) -> MutexGuard<'_, SessionCore> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Publishes the local wall-clock time once per `period`, independently of
/// any simulation. Abort the returned handle to stop it.
pub fn spawn_wall_clock(
    period: Duration,
) -> (watch::Receiver<DateTime<Local>>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(Local::now());
    let handle = tokio::spawn(async move {
        let mut ticks = interval_at(Instant::now() + period, period);
        loop {
            ticks.tick().await;
            if tx.send(Local::now()).is_err() {
                break;
            }
        }
    });
    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route_data::RouteConfig;
    use crate::simulation_engine::metrics::ScriptedSpeed;

    fn session() -> TrackingSession {
        let simulator = RouteSimulator::with_speed_source(
            Arc::new(RouteConfig::default()),
            Box::new(ScriptedSpeed::new(vec![25])),
        )
        .unwrap();
        TrackingSession::new(simulator, Duration::from_millis(1000))
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_interval() {
        let mut session = session();
        session.start();
        tokio::time::sleep(Duration::from_millis(3500)).await;

        assert_eq!(session.ticks(), 3);
        let snapshot = session.snapshot();
        assert!((snapshot.progress - 0.024).abs() < 1e-9);
        assert_eq!(snapshot.speed_kmh, 25);
        session.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_future_ticks() {
        let mut session = session();
        session.start();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        session.stop();
        let frozen = session.snapshot();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!session.is_running());
        assert_eq!(session.ticks(), 2);
        assert_eq!(session.snapshot(), frozen);

        // Idempotent.
        session.stop();
        assert_eq!(session.snapshot(), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resets_state() {
        let mut session = session();
        session.start();
        tokio::time::sleep(Duration::from_millis(5500)).await;
        session.stop();
        assert!(session.snapshot().progress > 0.0);

        session.start();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.progress, 0.0);
        assert_eq!(snapshot.speed_kmh, 24);
        assert_eq!(snapshot.distance_km, 1.7);
        assert_eq!(snapshot.eta_minutes, 5);
        assert_eq!(session.ticks(), 0);
        session.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_each_tick() {
        let mut session = session();
        let mut rx = session.subscribe();
        session.start();
        rx.borrow_and_update();

        rx.changed().await.unwrap();
        assert!((rx.borrow_and_update().state.progress - 0.008).abs() < 1e-9);
        rx.changed().await.unwrap();
        let latest = rx.borrow_and_update().clone();
        assert_eq!(latest.tick, 2);
        assert!((latest.state.progress - 0.016).abs() < 1e-9);
        session.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn lagging_subscriber_sees_simulator_tick() {
        let mut session = session();
        let mut rx = session.subscribe();
        session.start();
        rx.borrow_and_update();

        // Five ticks land while nobody reads; the channel keeps only the last.
        tokio::time::sleep(Duration::from_millis(5500)).await;
        assert!(rx.has_changed().unwrap());
        let latest = rx.borrow_and_update().clone();
        assert_eq!(latest.tick, 5);
        assert_eq!(latest.tick, session.ticks());
        assert!((latest.state.progress - 0.040).abs() < 1e-9);
        session.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn retired_ticker_cannot_advance_a_new_run() {
        let mut session = session();
        session.start();
        let old_generation = lock_core(&session.core).generation;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        session.stop();
        session.start();

        // An old ticker that already woke up and is waiting on the lock.
        assert!(!run_tick(&session.core, old_generation, &session.snapshot_tx));
        assert_eq!(session.ticks(), 0);
        assert_eq!(session.snapshot().progress, 0.0);
        assert_eq!(session.subscribe().borrow().tick, 0);

        // The current run's ticker still advances.
        let generation = lock_core(&session.core).generation;
        assert!(run_tick(&session.core, generation, &session.snapshot_tx));
        assert_eq!(session.ticks(), 1);
        session.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_retires_ticker_before_returning() {
        let mut session = session();
        session.start();
        let generation = lock_core(&session.core).generation;
        session.stop();
        assert!(!run_tick(&session.core, generation, &session.snapshot_tx));
        assert_eq!(session.ticks(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn rapid_restarts_on_worker_threads_stay_consistent() {
        let simulator = RouteSimulator::with_speed_source(
            Arc::new(RouteConfig::default()),
            Box::new(ScriptedSpeed::new(vec![25])),
        )
        .unwrap();
        let mut session = TrackingSession::new(simulator, Duration::from_millis(1));
        let rx = session.subscribe();

        for _ in 0..200 {
            session.start();
            // Nothing from an earlier run may overwrite the reset snapshot.
            let published = rx.borrow().clone();
            assert!(published.tick <= session.ticks());
            if published.tick == 0 {
                assert_eq!(published.state.progress, 0.0);
            }
            tokio::time::sleep(Duration::from_millis(3)).await;

            session.stop();
            let frozen_ticks = session.ticks();
            let frozen = rx.borrow().clone();
            assert_eq!(frozen.tick, frozen_ticks);
            tokio::time::sleep(Duration::from_millis(2)).await;
            assert_eq!(session.ticks(), frozen_ticks);
            assert_eq!(*rx.borrow(), frozen);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wall_clock_publishes_independently() {
        let (mut rx, handle) = spawn_wall_clock(Duration::from_millis(1000));
        rx.borrow_and_update();
        rx.changed().await.unwrap();
        handle.abort();
    }
}
