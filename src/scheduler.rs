//! Background generation scheduler
//!
//! Explicit component owning its own timer task: injected where needed
//! instead of living as a module global, so tests can drive it with a fake
//! clock. `start` replaces any active timer; `stop` aborts it.

use crate::events::{EventBus, RadioEvent};
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Job invoked on every tick (and by `trigger_now`)
pub type SchedulerJob = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Periodic trigger for background generation and cleanup
pub struct BackgroundScheduler {
    job: SchedulerJob,
    bus: EventBus,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BackgroundScheduler {
    pub fn new(job: SchedulerJob, bus: EventBus) -> Self {
        Self {
            job,
            bus,
            task: Mutex::new(None),
        }
    }

    /// Start the timer, replacing any active one
    pub fn start(&self, interval_minutes: u64) {
        self.stop();

        if interval_minutes == 0 {
            warn!("Scheduler start requested with zero interval, ignoring");
            return;
        }

        info!(
            "Starting background generation every {} minutes",
            interval_minutes
        );

        let job = Arc::clone(&self.job);
        let handle = tokio::spawn(async move {
            let period = Duration::from_secs(interval_minutes.saturating_mul(60));
            let mut interval = tokio::time::interval(period);
            // The first tick of a tokio interval completes immediately;
            // consume it so the job first runs after one full period
            interval.tick().await;
            loop {
                interval.tick().await;
                job().await;
            }
        });

        *self.task.lock().unwrap() = Some(handle);
        self.bus.broadcast(RadioEvent::SchedulerStateChanged {
            active: true,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Stop the timer if one is active
    pub fn stop(&self) {
        let handle = self.task.lock().unwrap().take();
        if let Some(handle) = handle {
            handle.abort();
            info!("Stopped background generation");
            self.bus.broadcast(RadioEvent::SchedulerStateChanged {
                active: false,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// Whether a timer task is currently running
    pub fn is_active(&self) -> bool {
        self.task
            .lock()
            .unwrap()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Run the job immediately, independent of the timer
    pub fn trigger_now(&self) {
        info!("Triggering background generation now");
        let job = Arc::clone(&self.job);
        tokio::spawn(async move {
            job().await;
        });
    }
}

impl Drop for BackgroundScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
    }
}
