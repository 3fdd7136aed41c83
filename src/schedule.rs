//! Cancelable fixed-interval background task.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Runs a tick function every `period` until stopped. The first tick fires
/// one full period after `start`. Stopping aborts the task, and dropping the
/// handle stops it too.
#[derive(Debug)]
pub struct PollTask {
    name: &'static str,
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl PollTask {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period,
            handle: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts ticking, replacing a previous run if there is one.
    pub fn start<F, Fut>(&mut self, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();

        let name = self.name;
        let period = self.period;
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                tracing::debug!("Scheduled {} poll", name);
                tick().await;
            }
        }));

        tracing::info!("Started {} polling every {}s", self.name, period.as_secs());
    }

    /// Returns true if the task was running.
    pub fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                tracing::info!("Stopped {} polling", self.name);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.stop();
    }
}
