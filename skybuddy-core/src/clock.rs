//! Wall-clock access.
//!
//! Everything that needs "now" or the local UTC offset (day/night, hour labels, grouping
//! forecast entries by calendar day) reads it through a [`Clock`] so tests can pin it.

use std::fmt::Debug;

use chrono::{DateTime, FixedOffset, Local, TimeZone, Timelike};

pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<FixedOffset>;

    fn offset(&self) -> FixedOffset {
        *self.now().offset()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Night is before 06:00 or after 18:59 local time.
pub fn is_night(clock: &dyn Clock) -> bool {
    let hour = clock.now().hour();
    hour < 6 || hour > 18
}

fn local(ts: i64, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    offset.timestamp_opt(ts, 0).single()
}

/// Hour-only label such as "3 PM".
pub fn hour_label(ts: i64, offset: &FixedOffset) -> String {
    local(ts, offset)
        .map(|dt| dt.format("%-I %p").to_string())
        .unwrap_or_default()
}

/// Short weekday label such as "Mon".
pub fn weekday_label(ts: i64, offset: &FixedOffset) -> String {
    local(ts, offset)
        .map(|dt| dt.format("%a").to_string())
        .unwrap_or_default()
}
