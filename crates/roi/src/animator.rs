//! Tween driver — a Tokio task that turns engine results into per-frame
//! counter snapshots.
//!
//! Results arrive on a `watch` channel, so a burst of input changes is
//! coalesced to the newest value and no field can animate toward a stale
//! target. Dropping the sender (view teardown) terminates the task; no
//! frame is emitted after that.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::engine::RoiResult;
use crate::tween::{RoiSnapshot, RoiTweenSet};

/// Subscriber receiving each rendered frame.
pub type FrameSink = Arc<dyn Fn(RoiSnapshot) + Send + Sync>;

/// Drives an [`RoiTweenSet`] at a fixed frame interval.
pub struct TweenDriver {
    frame_interval: Duration,
    sink: FrameSink,
}

impl TweenDriver {
    /// Roughly a display frame. The exact cadence is an implementation
    /// detail; only the tween math is timing-sensitive.
    pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

    pub fn new(sink: FrameSink) -> Self {
        Self {
            frame_interval: Self::DEFAULT_FRAME_INTERVAL,
            sink,
        }
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    /// Spawn the driver. It retargets on every result change, emits frames
    /// while any field is still animating, and exits when `results`'s
    /// sender side is dropped.
    pub fn spawn(self, mut results: watch::Receiver<RoiResult>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let epoch = Instant::now();
            let now_ms = |at: Instant| at.duration_since(epoch).as_millis() as u64;

            let mut tweens = RoiTweenSet::new(0);
            tweens.retarget(&results.borrow_and_update().clone(), 0);

            let mut frames = interval(self.frame_interval);
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!("tween driver started");
            loop {
                tokio::select! {
                    changed = results.changed() => {
                        match changed {
                            Ok(()) => {
                                let result = results.borrow_and_update().clone();
                                let now = now_ms(Instant::now());
                                debug!(
                                    weekly = result.weekly_savings,
                                    break_even = result.break_even_weeks,
                                    "retargeting counters"
                                );
                                tweens.retarget(&result, now);
                            }
                            // Sender dropped: the hosting view is gone
                            Err(_) => break,
                        }
                    }
                    _ = frames.tick() => {
                        let now = now_ms(Instant::now());
                        (self.sink)(tweens.snapshot(now));
                        if tweens.settled(now) {
                            // Idle until the next result change
                            if results.changed().await.is_err() {
                                break;
                            }
                            let result = results.borrow_and_update().clone();
                            tweens.retarget(&result, now_ms(Instant::now()));
                        }
                    }
                }
            }
            info!("tween driver stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{compute, RoiInputs};
    use std::sync::Mutex;

    fn capture_sink() -> (FrameSink, Arc<Mutex<Vec<RoiSnapshot>>>) {
        let frames: Arc<Mutex<Vec<RoiSnapshot>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = frames.clone();
        let sink: FrameSink = Arc::new(move |snap| {
            captured.lock().unwrap().push(snap);
        });
        (sink, frames)
    }

    #[tokio::test]
    async fn test_driver_converges_to_latest_result() {
        let (sink, frames) = capture_sink();
        let (tx, rx) = watch::channel(RoiResult::default());
        let handle = TweenDriver::new(sink)
            .with_frame_interval(Duration::from_millis(5))
            .spawn(rx);

        let result = compute(&RoiInputs::default());
        tx.send(result).unwrap();
        tokio::time::sleep(Duration::from_millis(1_700)).await;

        {
            let frames = frames.lock().unwrap();
            let last = frames.last().expect("driver emitted frames");
            assert_eq!(last.weekly_savings, 3_750.0);
            assert_eq!(last.annual_savings, 180_000.0);
        }

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_rapid_retargets_coalesce_to_last() {
        let (sink, frames) = capture_sink();
        let (tx, rx) = watch::channel(RoiResult::default());
        let handle = TweenDriver::new(sink)
            .with_frame_interval(Duration::from_millis(5))
            .spawn(rx);

        // Burst of input changes; only the newest target may win
        for engineers in [3, 9, 21, 5] {
            let inputs = RoiInputs {
                engineers,
                ..RoiInputs::default()
            };
            tx.send(compute(&inputs)).unwrap();
        }
        tokio::time::sleep(Duration::from_millis(1_700)).await;

        let last = frames.lock().unwrap().last().copied().unwrap();
        assert_eq!(last.weekly_savings, 3_750.0);

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_no_frames_after_teardown() {
        let (sink, frames) = capture_sink();
        let (tx, rx) = watch::channel(compute(&RoiInputs::default()));
        let handle = TweenDriver::new(sink)
            .with_frame_interval(Duration::from_millis(5))
            .spawn(rx);

        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(tx);
        handle.await.unwrap();

        let count_at_teardown = frames.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(frames.lock().unwrap().len(), count_at_teardown);
    }
}
