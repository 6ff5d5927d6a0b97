//! Polling read-model for the watching status.
//!
//! The poller owns the resolver, runs one tick per interval, and publishes
//! every result into a `watch` channel. Each result replaces the previous
//! one wholesale; readers only ever see the latest.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use foxden_api::StatusSource;
use foxden_core::models::WatchingRecord;

use crate::resolver::StatusResolver;

/// Default refresh interval.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handle to a running poller.
///
/// The task stops on its own once every receiver is dropped, or when
/// [`PollerHandle::abort`] is called.
pub struct PollerHandle {
    pub status: watch::Receiver<WatchingRecord>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Drop the receiver and wait for the task to wind down.
    pub async fn shutdown(self) {
        let Self { status, task } = self;
        drop(status);
        let _ = task.await;
    }
}

/// Start polling on the current tokio runtime.
pub fn spawn_poller<C, L>(resolver: StatusResolver<C, L>, interval: Duration) -> PollerHandle
where
    C: StatusSource + 'static,
    L: StatusSource + 'static,
{
    let (tx, rx) = watch::channel(WatchingRecord::not_watching());
    let task = tokio::spawn(run(resolver, interval, tx));
    PollerHandle { status: rx, task }
}

/// Tick loop. The first tick fires immediately; a tick that overruns the
/// interval delays the next one instead of bunching them up.
///
/// Returns as soon as every receiver is gone, even mid-tick or while a
/// resolution is in flight.
pub async fn run<C, L>(
    mut resolver: StatusResolver<C, L>,
    interval: Duration,
    tx: watch::Sender<WatchingRecord>,
) where
    C: StatusSource,
    L: StatusSource,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tx.closed() => break,
            _ = ticker.tick() => {}
        }

        let resolved = tokio::select! {
            _ = tx.closed() => break,
            resolved = resolver.resolve_detailed() => resolved,
        };
        tracing::debug!(
            origin = ?resolved.origin,
            is_watching = resolved.record.is_watching,
            "status resolved"
        );

        if tx.send(resolved.record).is_err() {
            break;
        }
    }

    tracing::debug!("poller stopped");
}
