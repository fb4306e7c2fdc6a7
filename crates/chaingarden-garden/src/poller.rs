//! Background garden polling.
//!
//! The poller runs as its own Tokio task: one load right away, then one
//! per interval, each applied to the shared [`GardenState`]. The
//! [`PollerHandle`] is the only way to stop it. Dropping the handle
//! aborts the task, so a forgotten poller can't outlive its session.

use std::sync::Arc;

use chaingarden_poll::{PollConfig, PollMetrics, PollScheduler};
use chaingarden_protocol::{GardenApi, SessionToken};
use chaingarden_transport::Transport;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{GardenState, refresh_garden};

/// Spawns garden polling tasks.
pub struct GardenPoller;

impl GardenPoller {
    /// Starts polling with `token` until the returned handle is stopped
    /// or dropped.
    pub fn spawn<T: Transport>(
        api: Arc<GardenApi<T>>,
        token: SessionToken,
        state: Arc<Mutex<GardenState>>,
        config: PollConfig,
    ) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let scheduler = PollScheduler::new(config);
        let task = tokio::spawn(run(api, token, state, scheduler, shutdown_rx));
        PollerHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Owner of a running poller task.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<PollMetrics>>,
}

impl PollerHandle {
    /// Stops the poller and waits for it to finish.
    ///
    /// A load already in flight completes and is applied before this
    /// returns; nothing is applied afterwards. Returns the final metrics,
    /// or `None` if the task panicked.
    pub async fn stop(mut self) -> Option<PollMetrics> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let task = self.task.take()?;
        match task.await {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                warn!(error = %e, "garden poller ended abnormally");
                None
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<T: Transport>(
    api: Arc<GardenApi<T>>,
    token: SessionToken,
    state: Arc<Mutex<GardenState>>,
    mut scheduler: PollScheduler,
    mut shutdown: oneshot::Receiver<()>,
) -> PollMetrics {
    info!(
        interval_ms = scheduler.interval().as_millis() as u64,
        "garden poller started"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            tick = scheduler.wait_for_tick() => {
                match refresh_garden(&api, &token, &state).await {
                    Ok(()) => {
                        scheduler.record_success();
                        debug!(tick = tick.tick, "garden poll applied");
                    }
                    Err(e) => {
                        scheduler.record_failure();
                        warn!(
                            tick = tick.tick,
                            consecutive = scheduler.metrics().consecutive_failures,
                            error = %e,
                            "garden poll failed"
                        );
                    }
                }
            }
        }
    }

    info!(ticks = scheduler.tick_count(), "garden poller stopped");
    scheduler.metrics().clone()
}
