//! Timer-driven inventory polling.
//!
//! [`InventoryPoller`] owns one repeating timer. Every tick spawns an
//! independent fetch task against an [`InventorySource`]; a successful fetch
//! replaces the single "latest snapshot" cell, a failed one is logged and
//! changes nothing. Consumers observe the cell through a `watch` receiver.
//!
//! Fetches are never serialized against each other. If a slow fetch is still
//! running when the next tick fires, both run and whichever finishes last
//! determines the published snapshot.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::errors::RcaError;
use crate::source::InventorySource;
use crate::types::InventorySnapshot;

/// The latest-snapshot cell. `None` means nothing has been received yet.
pub type LatestSnapshot = Option<Arc<InventorySnapshot>>;

/// Write side of the latest-snapshot cell.
///
/// [`InventoryPoller::stop`] closes the gate and bumps its epoch; fetches
/// issued under an older epoch complete but are not published, and no new
/// fetch is issued until [`InventoryPoller::start`] reopens it. The epoch
/// check and the send happen under the same lock as `stop`, so nothing
/// lands once `stop` has returned, whatever the runtime flavor.
struct Publisher {
    tx: watch::Sender<LatestSnapshot>,
    gate: Mutex<Gate>,
}

#[derive(Debug, Default)]
struct Gate {
    epoch: u64,
    closed: bool,
}

impl Publisher {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Publisher {
            tx,
            gate: Mutex::new(Gate::default()),
        }
    }

    fn gate(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The epoch a new fetch should carry, or `None` while stopped.
    fn epoch(&self) -> Option<u64> {
        let gate = self.gate();
        (!gate.closed).then_some(gate.epoch)
    }

    fn open(&self) {
        self.gate().closed = false;
    }

    fn close(&self) {
        let mut gate = self.gate();
        gate.epoch += 1;
        gate.closed = true;
    }

    /// Replace the current snapshot. Returns whether it was published.
    fn publish(&self, issued_epoch: u64, snapshot: InventorySnapshot) -> bool {
        let gate = self.gate();
        if gate.closed || issued_epoch != gate.epoch {
            tracing::debug!(
                event = "core.inventory.publish_discarded",
                reason = "poller_stopped",
            );
            return false;
        }
        if self.tx.is_closed() {
            tracing::debug!(
                event = "core.inventory.publish_discarded",
                reason = "no_subscribers",
            );
            return false;
        }
        self.tx.send_replace(Some(Arc::new(snapshot)));
        drop(gate);
        true
    }
}

/// Polls an inventory source on a fixed period and publishes snapshots.
///
/// `start` and `refresh_now` spawn tokio tasks, so they must be called from
/// within a runtime.
pub struct InventoryPoller {
    source: Arc<dyn InventorySource>,
    interval: Duration,
    publisher: Arc<Publisher>,
    timer: Option<JoinHandle<()>>,
}

impl InventoryPoller {
    pub fn new(source: Arc<dyn InventorySource>, interval: Duration) -> Self {
        InventoryPoller {
            source,
            // tokio::time::interval panics on a zero period.
            interval: interval.max(Duration::from_millis(1)),
            publisher: Arc::new(Publisher::new()),
            timer: None,
        }
    }

    /// Observe the latest-snapshot cell.
    ///
    /// Subscribe before calling [`start`](Self::start): snapshots completing
    /// while nobody is subscribed are dropped.
    pub fn subscribe(&self) -> watch::Receiver<LatestSnapshot> {
        self.publisher.tx.subscribe()
    }

    /// The most recently published snapshot, if any.
    pub fn latest(&self) -> LatestSnapshot {
        self.publisher.tx.borrow().clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    /// Fetch immediately, then once per interval. No-op while running.
    pub fn start(&mut self) {
        if self.is_running() {
            tracing::debug!(event = "core.poller.start_skipped", reason = "already_running");
            return;
        }

        self.publisher.open();
        let source = Arc::clone(&self.source);
        let publisher = Arc::clone(&self.publisher);
        let period = self.interval;

        tracing::info!(
            event = "core.poller.started",
            source = %source.describe(),
            interval_ms = period.as_millis() as u64,
        );

        self.timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // The first tick completes immediately.
                ticker.tick().await;
                tracing::debug!(event = "core.poller.tick");
                spawn_fetch(Arc::clone(&source), Arc::clone(&publisher));
            }
        }));
    }

    /// Cancel the timer. Fetches already in flight run to completion but
    /// their results are discarded, and [`refresh_now`](Self::refresh_now)
    /// publishes nothing until the next `start`, so nothing is published
    /// after this returns. Safe to call when stopped or never started.
    pub fn stop(&mut self) {
        self.publisher.close();
        if let Some(timer) = self.timer.take() {
            timer.abort();
            tracing::info!(event = "core.poller.stopped");
        }
    }

    /// Issue one fetch outside the timer schedule. Resolves to whether a
    /// snapshot was published; always `false` on a stopped poller.
    pub fn refresh_now(&self) -> JoinHandle<bool> {
        tracing::debug!(event = "core.poller.manual_refresh");
        spawn_fetch(Arc::clone(&self.source), Arc::clone(&self.publisher))
    }
}

impl Drop for InventoryPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_fetch(source: Arc<dyn InventorySource>, publisher: Arc<Publisher>) -> JoinHandle<bool> {
    let Some(epoch) = publisher.epoch() else {
        tracing::debug!(event = "core.inventory.fetch_skipped", reason = "poller_stopped");
        return tokio::spawn(async { false });
    };
    tokio::spawn(async move { fetch_and_publish(source.as_ref(), &publisher, epoch).await })
}

/// One fetch attempt. Failures are logged and swallowed.
async fn fetch_and_publish(
    source: &dyn InventorySource,
    publisher: &Publisher,
    epoch: u64,
) -> bool {
    tracing::debug!(event = "core.inventory.fetch_started", source = %source.describe());

    match source.fetch().await {
        Ok(snapshot) => {
            let resource_count = snapshot.len();
            let duplicates = snapshot.duplicate_ids().len();
            if duplicates > 0 {
                tracing::warn!(
                    event = "core.inventory.duplicate_ids",
                    duplicate_count = duplicates,
                );
            }
            let published = publisher.publish(epoch, snapshot);
            if published {
                tracing::debug!(
                    event = "core.inventory.fetch_completed",
                    resource_count = resource_count,
                );
            }
            published
        }
        Err(e) => {
            tracing::warn!(
                event = "core.inventory.fetch_failed",
                error_code = e.error_code(),
                error = %e,
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;
    use crate::source::ScriptedSource;
    use crate::types::Resource;

    const PERIOD: Duration = Duration::from_secs(5);

    fn snapshot(id: &str) -> InventorySnapshot {
        InventorySnapshot::new(vec![Resource::new(id, "EC2", "healthy", "us-east-1")])
    }

    fn ids(rx: &watch::Receiver<LatestSnapshot>) -> Vec<String> {
        rx.borrow()
            .as_ref()
            .map(|s| s.resources.iter().map(|r| r.id.clone()).collect())
            .unwrap_or_default()
    }

    fn poller(source: &Arc<ScriptedSource>) -> InventoryPoller {
        let source: Arc<dyn InventorySource> = source.clone();
        InventoryPoller::new(source, PERIOD)
    }

    #[tokio::test(start_paused = true)]
    async fn start_fetches_immediately() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(snapshot("i-1"));
        let mut poller = poller(&source);
        let mut rx = poller.subscribe();
        assert!(rx.borrow().is_none());

        poller.start();
        assert!(poller.is_running());
        rx.changed().await.unwrap();

        assert_eq!(ids(&rx), vec!["i-1"]);
        assert_eq!(source.calls(), 1);
        assert_eq!(poller.latest().unwrap().resources[0].id, "i-1");
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_fixed_period() {
        let source = Arc::new(ScriptedSource::new());
        for i in 0..3 {
            source.push_ok(snapshot(&format!("i-{}", i)));
        }
        let mut poller = poller(&source);
        let rx = poller.subscribe();
        poller.start();

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(ids(&rx), vec!["i-0"]);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(ids(&rx), vec!["i-1"]);

        tokio::time::sleep(PERIOD).await;
        assert_eq!(source.calls(), 3);
        assert_eq!(ids(&rx), vec!["i-2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_tick_keeps_previous_snapshot() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(snapshot("i-1"));
        source.push_err(ScriptedSource::unreachable());
        let mut poller = poller(&source);
        let mut rx = poller.subscribe();
        poller.start();
        rx.changed().await.unwrap();

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(source.calls(), 2);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(ids(&rx), vec!["i-1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn parse_failure_keeps_previous_snapshot() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(snapshot("i-1"));
        source.push_err(FetchError::Parse {
            message: "expected `{`".into(),
        });
        source.push_ok(snapshot("i-3"));
        let mut poller = poller(&source);
        let rx = poller.subscribe();
        poller.start();

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(ids(&rx), vec!["i-1"]);

        tokio::time::sleep(PERIOD).await;
        assert_eq!(ids(&rx), vec!["i-3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn stays_loading_until_first_success() {
        let source = Arc::new(ScriptedSource::new());
        let mut poller = poller(&source);
        let rx = poller.subscribe();
        poller.start();

        tokio::time::sleep(Duration::from_secs(21)).await;
        assert_eq!(source.calls(), 5);
        assert!(rx.borrow().is_none());
        assert!(poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_fetches_last_completion_wins() {
        let source = Arc::new(ScriptedSource::new());
        // Issued at t=0, completes at t=7s.
        source.push_delayed(Duration::from_secs(7), Ok(snapshot("slow")));
        // Issued at t=5s, completes at t=6s.
        source.push_delayed(Duration::from_secs(1), Ok(snapshot("fast")));
        let mut poller = poller(&source);
        let rx = poller.subscribe();
        poller.start();

        tokio::time::sleep(Duration::from_millis(6_500)).await;
        assert_eq!(ids(&rx), vec!["fast"]);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ids(&rx), vec!["slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_timer_and_discards_in_flight_result() {
        let source = Arc::new(ScriptedSource::new());
        source.push_delayed(Duration::from_secs(3), Ok(snapshot("late")));
        let mut poller = poller(&source);
        let rx = poller.subscribe();
        poller.start();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.calls(), 1);
        poller.stop();
        assert!(!poller.is_running());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(source.remaining(), 0);
        assert!(rx.borrow().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_after_stop_does_not_publish() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(snapshot("i-1"));
        source.push_ok(snapshot("after-stop"));
        let mut poller = poller(&source);
        let mut rx = poller.subscribe();
        poller.start();
        rx.changed().await.unwrap();

        poller.stop();
        assert!(!poller.refresh_now().await.unwrap());
        assert_eq!(ids(&rx), vec!["i-1"]);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_publishes_again() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(snapshot("first"));
        source.push_ok(snapshot("second"));
        let mut poller = poller(&source);
        let mut rx = poller.subscribe();
        poller.start();
        rx.changed().await.unwrap();
        poller.stop();

        poller.start();
        rx.changed().await.unwrap();
        assert_eq!(ids(&rx), vec!["second"]);
    }

    #[test]
    fn fetch_issued_before_stop_stays_discarded_after_restart() {
        let publisher = Publisher::new();
        let _rx = publisher.tx.subscribe();
        let stale = publisher.epoch().unwrap();
        publisher.close();
        assert_eq!(publisher.epoch(), None);
        publisher.open();

        assert!(!publisher.publish(stale, snapshot("stale")));
        let current = publisher.epoch().unwrap();
        assert!(publisher.publish(current, snapshot("fresh")));
    }

    #[test]
    fn nothing_lands_after_close_returns_across_threads() {
        let publisher = Arc::new(Publisher::new());
        let mut rx = publisher.tx.subscribe();
        let epoch = publisher.epoch().unwrap();

        let writers: Vec<_> = (0..4)
            .map(|n| {
                let publisher = Arc::clone(&publisher);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        publisher.publish(epoch, snapshot(&format!("w{}-{}", n, i)));
                    }
                })
            })
            .collect();

        std::thread::sleep(Duration::from_millis(1));
        publisher.close();
        rx.borrow_and_update();

        for writer in writers {
            writer.join().unwrap();
        }
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(snapshot("i-1"));
        let mut poller = poller(&source);
        let mut rx = poller.subscribe();
        poller.start();
        poller.start();
        rx.changed().await.unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_start_is_safe() {
        let source = Arc::new(ScriptedSource::new());
        let mut poller = poller(&source);
        poller.stop();
        poller.stop();
        assert!(!poller.is_running());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_now_publishes_without_timer() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(snapshot("manual"));
        let poller = poller(&source);
        let rx = poller.subscribe();

        assert!(poller.refresh_now().await.unwrap());
        assert_eq!(ids(&rx), vec!["manual"]);
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn completion_after_teardown_is_dropped() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(snapshot("orphan"));
        let poller = poller(&source);

        // No receiver: the consuming side has gone away.
        assert!(!poller.refresh_now().await.unwrap());
        assert!(poller.latest().is_none());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_ids_are_published_as_is() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(InventorySnapshot::new(vec![
            Resource::new("dup", "EC2", "healthy", "us-east-1"),
            Resource::new("dup", "RDS", "critical", "us-east-1"),
        ]));
        let poller = poller(&source);
        let rx = poller.subscribe();

        assert!(poller.refresh_now().await.unwrap());
        assert_eq!(ids(&rx), vec!["dup", "dup"]);
    }
}
