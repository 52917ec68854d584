//! Once-a-second countdown refresh.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use tokio::time::MissedTickBehavior;

use super::{Countdown, SpinSchedule};

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Recompute the countdown every `period` and hand it to `on_tick`.
///
/// Runs until `shutdown` resolves or `on_tick` breaks. The interval is owned
/// by this future, so dropping or finishing it stops the timer. Returns the
/// number of ticks delivered.
pub async fn run_countdown<Tz, C, S, F>(
    schedule: SpinSchedule,
    clock: C,
    period: Duration,
    shutdown: S,
    mut on_tick: F,
) -> u64
where
    Tz: TimeZone,
    C: Fn() -> DateTime<Tz>,
    S: Future<Output = ()>,
    F: FnMut(Countdown) -> ControlFlow<()>,
{
    let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                ticks += 1;
                let countdown = schedule.time_until_next_threshold(&clock());
                if on_tick(countdown).is_break() {
                    break;
                }
            }
        }
    }
    tracing::debug!(ticks, "countdown stopped");
    ticks
}
