//! Countdown overlay driver

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::ports::{OverlayError, OverlaySurface};
use crate::domain::target::TabId;

const TICK: Duration = Duration::from_secs(1);

/// How a countdown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    Finished,
    Cancelled,
}

/// Show a countdown of `seconds` on `tab` and resolve when it reaches zero
/// or when `cancel` completes, whichever comes first.
///
/// Zero or negative durations resolve immediately without touching the page.
/// Only a failure to mount is an error; later render failures are logged
/// and the count continues. A mounted overlay is always removed.
pub async fn run_countdown<O, F>(
    surface: &O,
    tab: TabId,
    seconds: i64,
    cancel: F,
) -> Result<CountdownOutcome, OverlayError>
where
    O: OverlaySurface + ?Sized,
    F: Future<Output = ()>,
{
    if seconds <= 0 {
        return Ok(CountdownOutcome::Finished);
    }
    let mut remaining = u32::try_from(seconds).unwrap_or(u32::MAX);

    surface.mount(tab, remaining).await?;
    debug!(tab = %tab, seconds = remaining, "Countdown started");

    // The interval lives only in this future, so it is gone once we return.
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(cancel);
    let mut outcome = CountdownOutcome::Finished;
    while remaining > 0 {
        tokio::select! {
            _ = &mut cancel => {
                debug!(tab = %tab, remaining, "Countdown cancelled");
                outcome = CountdownOutcome::Cancelled;
                break;
            }
            _ = ticker.tick() => {}
        }
        remaining -= 1;
        if remaining > 0 {
            if let Err(err) = surface.update(tab, remaining).await {
                warn!(tab = %tab, error = %err, "Countdown render failed");
            }
        }
    }

    if let Err(err) = surface.unmount(tab).await {
        warn!(tab = %tab, error = %err, "Countdown overlay could not be removed");
    }
    debug!(tab = %tab, "Countdown finished");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::future::pending;
    use std::sync::Mutex;
    use tokio::time::sleep;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Mount(u32),
        Update(u32),
        Unmount,
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Mutex<Vec<(Call, Instant)>>,
        fail_mount: bool,
        fail_updates: bool,
    }

    impl RecordingSurface {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
        }
    }

    #[async_trait]
    impl OverlaySurface for RecordingSurface {
        async fn mount(&self, _tab: TabId, remaining: u32) -> Result<(), OverlayError> {
            if self.fail_mount {
                return Err(OverlayError::InjectionFailed("scripting blocked".into()));
            }
            self.calls
                .lock()
                .unwrap()
                .push((Call::Mount(remaining), Instant::now()));
            Ok(())
        }

        async fn update(&self, _tab: TabId, remaining: u32) -> Result<(), OverlayError> {
            self.calls
                .lock()
                .unwrap()
                .push((Call::Update(remaining), Instant::now()));
            if self.fail_updates {
                return Err(OverlayError::PageGone);
            }
            Ok(())
        }

        async fn unmount(&self, _tab: TabId) -> Result<(), OverlayError> {
            self.calls
                .lock()
                .unwrap()
                .push((Call::Unmount, Instant::now()));
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_resolves_without_rendering() {
        let surface = RecordingSurface::default();
        let start = Instant::now();

        assert_eq!(
            run_countdown(&surface, TabId(1), 0, pending()).await.unwrap(),
            CountdownOutcome::Finished
        );
        run_countdown(&surface, TabId(1), -3, pending()).await.unwrap();

        assert!(surface.calls().is_empty());
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_once_per_second() {
        let surface = RecordingSurface::default();
        let start = Instant::now();

        let outcome = run_countdown(&surface, TabId(1), 3, pending()).await.unwrap();

        assert_eq!(outcome, CountdownOutcome::Finished);
        assert_eq!(
            surface.calls(),
            vec![Call::Mount(3), Call::Update(2), Call::Update(1), Call::Unmount]
        );
        assert_eq!(Instant::now() - start, Duration::from_secs(3));
        let stamps: Vec<_> = surface.calls.lock().unwrap().iter().map(|(_, t)| *t).collect();
        assert_eq!(stamps[1] - stamps[0], Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn mount_failure_is_reported() {
        let surface = RecordingSurface {
            fail_mount: true,
            ..Default::default()
        };

        let err = run_countdown(&surface, TabId(1), 3, pending())
            .await
            .unwrap_err();

        assert!(matches!(err, OverlayError::InjectionFailed(_)));
        assert!(surface.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn render_failures_do_not_stop_the_count() {
        let surface = RecordingSurface {
            fail_updates: true,
            ..Default::default()
        };
        let start = Instant::now();

        run_countdown(&surface, TabId(1), 2, pending()).await.unwrap();

        assert_eq!(surface.calls().last(), Some(&Call::Unmount));
        assert_eq!(Instant::now() - start, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_removes_the_overlay() {
        let surface = RecordingSurface::default();
        let start = Instant::now();

        let outcome = run_countdown(
            &surface,
            TabId(1),
            5,
            sleep(Duration::from_millis(1500)),
        )
        .await
        .unwrap();

        assert_eq!(outcome, CountdownOutcome::Cancelled);
        assert_eq!(
            surface.calls(),
            vec![Call::Mount(5), Call::Update(4), Call::Unmount]
        );
        assert_eq!(Instant::now() - start, Duration::from_millis(1500));
    }
}
