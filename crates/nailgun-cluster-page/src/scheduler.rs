/*
[INPUT]:  schedule_update requests, qualifying-task checks from the coordinator
[OUTPUT]: At most one poll loop per page, one refresh cycle per interval
[POS]:    Scheduling layer - poll timer of the cluster page
[UPDATE]: When changing poll timing or re-arm rules
*/

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::sync::SyncCoordinator;

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Polling,
}

#[derive(Debug)]
struct Control {
    phase: PollPhase,
    /// A schedule request arrived while a loop was running
    rearm: bool,
    handle: Option<JoinHandle<()>>,
}

#[derive(Debug)]
struct Inner {
    interval: Duration,
    control: Mutex<Control>,
    cycles: AtomicU64,
    phase_tx: watch::Sender<PollPhase>,
    shutdown: CancellationToken,
}

impl Inner {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_idle(&self, control: &mut Control) {
        control.phase = PollPhase::Idle;
        control.rearm = false;
        control.handle = None;
        self.phase_tx.send_replace(PollPhase::Idle);
    }

    async fn run(self: Arc<Self>, coordinator: Arc<SyncCoordinator>) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            let report = coordinator.run_cycle().await;
            let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(
                cluster_id = coordinator.cluster_id(),
                cycle,
                failures = report.failures,
                synced_at = %report.synced_at,
                "Refresh cycle settled"
            );
            if self.shutdown.is_cancelled() {
                break;
            }

            let qualifies = coordinator.should_poll().await;
            let mut control = self.control();
            let rearm = std::mem::take(&mut control.rearm);
            if qualifies || rearm {
                continue;
            }
            info!(cluster_id = coordinator.cluster_id(), "No running tasks left, polling stopped");
            self.set_idle(&mut control);
            return;
        }
        let mut control = self.control();
        self.set_idle(&mut control);
    }
}

/// Poll timer: armed only while a qualifying task exists.
///
/// The next cycle is scheduled only after the previous one settled, so cycles
/// never overlap. Requests while polling fold into the running loop.
#[derive(Debug, Clone)]
pub struct PollScheduler {
    inner: Arc<Inner>,
}

impl PollScheduler {
    pub fn new(interval: Duration, shutdown: CancellationToken) -> Self {
        let (phase_tx, _) = watch::channel(PollPhase::Idle);
        Self {
            inner: Arc::new(Inner {
                interval,
                control: Mutex::new(Control {
                    phase: PollPhase::Idle,
                    rearm: false,
                    handle: None,
                }),
                cycles: AtomicU64::new(0),
                phase_tx,
                shutdown,
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    pub fn phase(&self) -> PollPhase {
        self.inner.control().phase
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<PollPhase> {
        self.inner.phase_tx.subscribe()
    }

    /// Completed refresh cycles
    pub fn cycles(&self) -> u64 {
        self.inner.cycles.load(Ordering::SeqCst)
    }

    /// Arm the timer if a qualifying task exists and no loop is running
    pub async fn schedule_update(&self, coordinator: &Arc<SyncCoordinator>) -> PollPhase {
        if self.inner.shutdown.is_cancelled() {
            return PollPhase::Idle;
        }
        let qualifies = coordinator.should_poll().await;

        let mut control = self.inner.control();
        if control.phase == PollPhase::Polling {
            control.rearm |= qualifies;
            return PollPhase::Polling;
        }
        if !qualifies || self.inner.shutdown.is_cancelled() {
            return PollPhase::Idle;
        }

        control.phase = PollPhase::Polling;
        self.inner.phase_tx.send_replace(PollPhase::Polling);
        debug!(
            cluster_id = coordinator.cluster_id(),
            interval_ms = self.inner.interval.as_millis() as u64,
            "Poll timer armed"
        );
        let inner = Arc::clone(&self.inner);
        control.handle = Some(tokio::spawn(inner.run(Arc::clone(coordinator))));
        PollPhase::Polling
    }

    /// Stop polling now; an in-flight cycle is dropped before it applies anything
    pub fn cancel(&self) {
        self.inner.shutdown.cancel();
        let mut control = self.inner.control();
        if let Some(handle) = control.handle.take() {
            handle.abort();
        }
        self.inner.set_idle(&mut control);
    }
}
