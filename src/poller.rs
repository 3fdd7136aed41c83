//! Change-detecting poller for the profile and links feeds.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::card::{Card, PollOutcome};
use crate::feeds::{FeedClient, FeedKind};
use crate::schedule::PollTask;

/// Everything a poll needs, cheap to clone into scheduled tasks.
#[derive(Clone)]
struct PollContext {
    card: Arc<Card>,
    feeds: FeedClient,
    active: Arc<AtomicBool>,
    sequence: Arc<AtomicU64>,
}

impl PollContext {
    async fn poll(&self, kind: FeedKind) -> PollOutcome {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);

        match kind {
            FeedKind::Profile => {
                let result = self.feeds.fetch_profile().await;
                if !self.active.load(Ordering::Acquire) {
                    return inactive(kind);
                }
                self.card.apply_profile(seq, result)
            }
            FeedKind::Links => {
                let result = self.feeds.fetch_links().await;
                if !self.active.load(Ordering::Acquire) {
                    return inactive(kind);
                }
                self.card.apply_links(seq, result)
            }
        }
    }
}

fn inactive(kind: FeedKind) -> PollOutcome {
    tracing::debug!("Ignoring {} fetch completed after teardown", kind.name());
    PollOutcome::Inactive
}

/// Polls both feeds on independent intervals and hands results to the card.
pub struct Poller {
    ctx: PollContext,
    profile_task: PollTask,
    links_task: PollTask,
}

impl Poller {
    pub fn new(
        card: Arc<Card>,
        feeds: FeedClient,
        profile_every: Duration,
        links_every: Duration,
    ) -> Self {
        Self {
            ctx: PollContext {
                card,
                feeds,
                active: Arc::new(AtomicBool::new(true)),
                // Zero is the "nothing applied yet" marker
                sequence: Arc::new(AtomicU64::new(1)),
            },
            profile_task: PollTask::new(FeedKind::Profile.name(), profile_every),
            links_task: PollTask::new(FeedKind::Links.name(), links_every),
        }
    }

    pub fn card(&self) -> &Arc<Card> {
        &self.ctx.card
    }

    /// Fetches one feed now and applies the result.
    pub async fn poll(&self, kind: FeedKind) -> PollOutcome {
        self.ctx.poll(kind).await
    }

    /// Fetches both feeds concurrently; neither waits on the other's
    /// failure.
    pub async fn refresh_now(&self) -> (PollOutcome, PollOutcome) {
        futures_util::future::join(
            self.ctx.poll(FeedKind::Profile),
            self.ctx.poll(FeedKind::Links),
        )
        .await
    }

    /// Initial concurrent load, then interval polling. Timers start only
    /// once both initial fetches have settled.
    pub async fn start(&mut self) {
        self.ctx.active.store(true, Ordering::Release);

        let (profile, links) = self.refresh_now().await;
        tracing::info!("Initial load: profile {:?}, links {:?}", profile, links);

        let ctx = self.ctx.clone();
        self.profile_task.start(move || {
            let ctx = ctx.clone();
            async move {
                ctx.poll(FeedKind::Profile).await;
            }
        });

        let ctx = self.ctx.clone();
        self.links_task.start(move || {
            let ctx = ctx.clone();
            async move {
                ctx.poll(FeedKind::Links).await;
            }
        });
    }

    /// Stops both timers. Fetches still in flight are discarded when they
    /// complete. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.ctx.active.store(false, Ordering::Release);
        let profile = self.profile_task.stop();
        let links = self.links_task.stop();
        if profile || links {
            tracing::info!("Poller torn down");
        }
    }

    pub fn is_running(&self) -> bool {
        self.profile_task.is_running() || self.links_task.is_running()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.teardown();
    }
}
