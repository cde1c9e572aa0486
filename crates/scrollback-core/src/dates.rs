//! Civil-date helpers: day boundaries, date dividers and date labels.
//!
//! Every comparison happens in the configured display time zone. Two
//! timestamps are on the same day when their civil dates in that zone are
//! equal, which is not the same as dividing epoch seconds by 86400.

use crate::error::{Error, Result};
use crate::model::Message;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Source of "now", used to label dates relative to today.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at_timestamp(secs: i64) -> Self {
        Self(to_utc(secs))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Time zone used for every civil-date decision in the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayZone(Tz);

impl DisplayZone {
    pub const UTC: DisplayZone = DisplayZone(Tz::UTC);

    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn tz(&self) -> Tz {
        self.0
    }

    pub fn civil_date(&self, timestamp: i64) -> NaiveDate {
        to_utc(timestamp).with_timezone(&self.0).date_naive()
    }

    pub fn today(&self, clock: &dyn Clock) -> NaiveDate {
        clock.now().with_timezone(&self.0).date_naive()
    }
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self::UTC
    }
}

impl FromStr for DisplayZone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<Tz>()
            .map(Self)
            .map_err(|_| Error::TimeZone(s.to_string()))
    }
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name())
    }
}

fn to_utc(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

pub fn same_day(a: i64, b: i64, zone: DisplayZone) -> bool {
    zone.civil_date(a) == zone.civil_date(b)
}

/// A rendered date, e.g. `Today` or `Mar 04, 2023`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateLabel {
    pub text: String,
    /// The year differs from its reference and must be shown
    pub include_year: bool,
}

impl fmt::Display for DateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Label the civil date of `timestamp`.
///
/// The year is shown when it differs from `prev`'s year, or, without a
/// previous message, from the current year.
pub fn render_date(
    timestamp: i64,
    prev: Option<i64>,
    zone: DisplayZone,
    clock: &dyn Clock,
) -> DateLabel {
    let date = zone.civil_date(timestamp);
    let today = zone.today(clock);
    let reference_year = match prev {
        Some(prev) => zone.civil_date(prev).year(),
        None => today.year(),
    };
    let include_year = date.year() != reference_year;

    let text = if date == today {
        "Today".to_string()
    } else if today.checked_sub_days(Days::new(1)) == Some(date) {
        "Yesterday".to_string()
    } else if include_year {
        date.format("%b %d, %Y").to_string()
    } else {
        date.format("%b %d").to_string()
    };

    DateLabel { text, include_year }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divider {
    pub want_divider: bool,
    pub label: Option<DateLabel>,
}

impl Divider {
    const NONE: Divider = Divider {
        want_divider: false,
        label: None,
    };
}

/// Decide whether a date divider goes between `prev` and `curr`.
pub fn divider(
    prev: Option<&Message>,
    curr: &Message,
    zone: DisplayZone,
    clock: &dyn Clock,
) -> Divider {
    match prev {
        Some(prev) if !same_day(prev.timestamp, curr.timestamp, zone) => Divider {
            want_divider: true,
            label: Some(render_date(
                curr.timestamp,
                Some(prev.timestamp),
                zone,
                clock,
            )),
        },
        _ => Divider::NONE,
    }
}

/// Time of day shown next to a message.
pub fn format_time(timestamp: i64, zone: DisplayZone, twenty_four_hour: bool) -> String {
    let local = to_utc(timestamp).with_timezone(&zone.tz());
    if twenty_four_hour {
        local.format("%H:%M").to_string()
    } else {
        local.format("%-I:%M %p").to_string()
    }
}
