//! Weekly spin clock.
//!
//! Every assignment week starts on the spin day. The new week does not begin
//! at midnight though: it begins once the spin-day threshold hour (23:00 by
//! default) is reached. Before that, spin day still belongs to the previous
//! week and is used to verify its assignments.
//!
//! All functions here are pure over a `DateTime<Tz>` and use the local date
//! and hour of that value, so callers pick the time zone (`Local` in the CLI,
//! fixed offsets in tests).

mod ticker;

pub use ticker::{run_countdown, DEFAULT_TICK};

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Timelike, Weekday,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// When the weekly spin happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinSchedule {
    pub spin_day: Weekday,
    /// Local hour (0-23) at which the new week starts on spin day.
    pub threshold_hour: u32,
}

impl Default for SpinSchedule {
    fn default() -> Self {
        Self {
            spin_day: Weekday::Sun,
            threshold_hour: 23,
        }
    }
}

/// Time left until the next spin threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_ms: i64,
}

impl Countdown {
    pub fn from_millis(total_ms: i64) -> Self {
        Self {
            days: total_ms / MS_PER_DAY,
            hours: (total_ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (total_ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (total_ms % MS_PER_MINUTE) / MS_PER_SECOND,
            total_ms,
        }
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

impl SpinSchedule {
    pub fn new(spin_day: Weekday, threshold_hour: u32) -> Result<Self> {
        if threshold_hour > 23 {
            return Err(ConfigError::InvalidValue {
                key: "schedule.threshold_hour".into(),
                message: format!("{threshold_hour} is not an hour of the day (0-23)"),
            }
            .into());
        }
        Ok(Self {
            spin_day,
            threshold_hour,
        })
    }

    pub fn is_spin_day<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        now.weekday() == self.spin_day
    }

    /// Spin day at or after the threshold hour: spinning is open.
    pub fn is_past_threshold<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        self.is_spin_day(now) && now.hour() >= self.threshold_hour
    }

    /// Spin-day date (at midnight) that began the current assignment week.
    pub fn current_week_start<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> NaiveDate {
        let today = now.date_naive();
        let since = days_between(self.spin_day, now.weekday());
        if since == 0 && !self.is_past_threshold(now) {
            today - Duration::days(7)
        } else {
            today - Duration::days(since)
        }
    }

    pub fn previous_week_start<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> NaiveDate {
        self.current_week_start(now) - Duration::days(7)
    }

    /// First threshold instant strictly after `now`.
    pub fn next_threshold<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let until = days_between(now.weekday(), self.spin_day);
        let date = now.date_naive() + Duration::days(until);
        let candidate = local_at(now, date, self.threshold_hour);
        if candidate > *now {
            candidate
        } else {
            local_at(now, date + Duration::days(7), self.threshold_hour)
        }
    }

    pub fn time_until_next_threshold<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Countdown {
        let next = self.next_threshold(now);
        Countdown::from_millis(next.signed_duration_since(now.clone()).num_milliseconds())
    }
}

/// Calendar month of `now` as `YYYY-MM`.
pub fn current_month<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    format!("{:04}-{:02}", now.year(), now.month())
}

/// Whole days (rounded up) until the midnight that closes the week.
pub fn days_remaining<Tz: TimeZone>(week_start: NaiveDate, now: &DateTime<Tz>) -> i64 {
    let end = local_at(now, week_start + Duration::days(7), 0);
    let ms = end.signed_duration_since(now.clone()).num_milliseconds();
    if ms <= 0 {
        0
    } else {
        (ms + MS_PER_DAY - 1) / MS_PER_DAY
    }
}

/// Days to walk forward from `from` to reach `to` (0-6).
fn days_between(from: Weekday, to: Weekday) -> i64 {
    (to.num_days_from_monday() as i64 - from.num_days_from_monday() as i64).rem_euclid(7)
}

/// `date` at `hour`:00 in the time zone of `reference`.
///
/// A local time skipped by a DST jump resolves with the reference's offset.
fn local_at<Tz: TimeZone>(reference: &DateTime<Tz>, date: NaiveDate, hour: u32) -> DateTime<Tz> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let naive = date.and_time(time);
    let tz = reference.timezone();
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt,
        None => {
            let offset = reference.offset().fix().local_minus_utc();
            tz.from_utc_datetime(&(naive - Duration::seconds(offset as i64)))
        }
    }
}
