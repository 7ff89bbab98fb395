//! Trading-session calendar and interval-boundary classification.
//!
//! Bars do not start on plain wall-clock multiples. Each session opens at its
//! own instant (09:00, 10:30, 13:30 and 21:00 for the default schedule) and
//! the first partial minute after an open is folded into the opening bar.
//! Classification is an ordered table of exact-time rules with a regular
//! `minute % interval == 0` fallback.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use sessionbar_types::Interval;
use thiserror::Error;

/// Minutes in a day.
const MINUTES_PER_DAY: u32 = 24 * 60;

/// Errors raised when building a calendar from a schedule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// A session-open string is not a valid `HH:MM` time.
    #[error("Invalid session open '{0}', expected HH:MM")]
    InvalidTime(String),

    /// A session open carries a seconds component.
    #[error("Session open {0} is not on a whole minute")]
    NotMinuteAligned(NaiveTime),

    /// Session opens are not strictly increasing.
    #[error("Session opens must be strictly increasing: {previous} is followed by {next}")]
    Unordered {
        /// The earlier entry in the table.
        previous: NaiveTime,
        /// The entry that does not come after it.
        next: NaiveTime,
    },

    /// The schedule contains no sessions.
    #[error("Session schedule is empty")]
    Empty,

    /// A minute would both start and end an interval.
    #[error("Minute {0} would both start and end an interval")]
    Ambiguous(NaiveTime),
}

/// Origin of an exact-time boundary rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// A session-open instant; always starts a bar.
    SessionOpen,
    /// The minute after a session open; never starts a bar, so the opening
    /// tick and the following minute merge into one bar.
    OpenAbsorption,
}

/// One `(hour, minute, is_boundary)` entry of the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryRule {
    /// Hour of day (0-23).
    pub hour: u32,
    /// Minute of hour (0-59).
    pub minute: u32,
    /// Whether a timestamp matching this rule starts an interval.
    pub is_boundary: bool,
    /// Why the rule exists.
    pub kind: RuleKind,
}

impl BoundaryRule {
    fn matches(&self, time: NaiveTime) -> bool {
        time.hour() == self.hour && time.minute() == self.minute
    }
}

/// Session-open instants and bar interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSchedule {
    opens: Vec<NaiveTime>,
    interval: Interval,
}

impl SessionSchedule {
    /// Creates a schedule from session-open times.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is empty, contains sub-minute times or
    /// is not strictly increasing.
    pub fn new(opens: Vec<NaiveTime>, interval: Interval) -> Result<Self, CalendarError> {
        if opens.is_empty() {
            return Err(CalendarError::Empty);
        }
        if let Some(t) = opens.iter().find(|t| t.second() != 0 || t.nanosecond() != 0) {
            return Err(CalendarError::NotMinuteAligned(*t));
        }
        if let Some(pair) = opens.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CalendarError::Unordered {
                previous: pair[0],
                next: pair[1],
            });
        }
        Ok(Self { opens, interval })
    }

    /// Parses a schedule from `HH:MM` strings.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry fails to parse or the table is invalid.
    pub fn parse<S: AsRef<str>>(opens: &[S], interval: Interval) -> Result<Self, CalendarError> {
        let times = opens
            .iter()
            .map(|s| {
                let s = s.as_ref().trim();
                NaiveTime::parse_from_str(s, "%H:%M")
                    .map_err(|_| CalendarError::InvalidTime(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(times, interval)
    }

    /// Day, morning-resume, afternoon and night session opens of a
    /// domestic commodity futures exchange, on 15-minute bars.
    #[must_use]
    pub fn commodity_futures() -> Self {
        let opens = [(9, 0), (10, 30), (13, 30), (21, 0)]
            .into_iter()
            .filter_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0))
            .collect();
        Self {
            opens,
            interval: Interval::MINUTE15,
        }
    }

    /// Returns the session-open instants.
    #[must_use]
    pub fn opens(&self) -> &[NaiveTime] {
        &self.opens
    }

    /// Returns the bar interval.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }
}

impl Default for SessionSchedule {
    fn default() -> Self {
        Self::commodity_futures()
    }
}

/// Classifies timestamps as interval boundaries.
///
/// Rules are checked in order and the first exact `(hour, minute)` match
/// wins: every session open first, then every absorbed minute. Minutes no
/// rule names fall back to `minute % interval == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCalendar {
    rules: Vec<BoundaryRule>,
    interval: Interval,
}

impl SessionCalendar {
    /// Builds and validates a calendar for the given schedule.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Ambiguous`] if some minute of the day would
    /// be both an interval start and an interval end, which would let one
    /// tick close two bars.
    pub fn new(schedule: &SessionSchedule) -> Result<Self, CalendarError> {
        let calendar = Self::from_schedule(schedule);
        if let Some(time) = calendar.first_ambiguous_minute() {
            return Err(CalendarError::Ambiguous(time));
        }
        Ok(calendar)
    }

    fn from_schedule(schedule: &SessionSchedule) -> Self {
        let opens = schedule.opens().iter().map(|t| BoundaryRule {
            hour: t.hour(),
            minute: t.minute(),
            is_boundary: true,
            kind: RuleKind::SessionOpen,
        });
        let absorbed = schedule.opens().iter().map(|t| {
            let next = *t + TimeDelta::minutes(1);
            BoundaryRule {
                hour: next.hour(),
                minute: next.minute(),
                is_boundary: false,
                kind: RuleKind::OpenAbsorption,
            }
        });

        Self {
            rules: opens.chain(absorbed).collect(),
            interval: schedule.interval(),
        }
    }

    /// Returns the ordered rule table.
    #[must_use]
    pub fn rules(&self) -> &[BoundaryRule] {
        &self.rules
    }

    /// Returns the bar interval.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// Returns true if `ts` marks the start of a new interval.
    #[must_use]
    pub fn is_interval_start(&self, ts: NaiveDateTime) -> bool {
        self.is_start_time(ts.time())
    }

    /// Returns true if `ts` is the last minute of an interval, i.e. the
    /// following minute starts a new one.
    #[must_use]
    pub fn is_interval_end(&self, ts: NaiveDateTime) -> bool {
        self.is_interval_start(ts + TimeDelta::minutes(1))
    }

    /// Returns every interval-start time of a day, in order.
    pub fn interval_starts(&self) -> impl Iterator<Item = NaiveTime> + '_ {
        all_minutes().filter(|t| self.is_start_time(*t))
    }

    fn is_start_time(&self, time: NaiveTime) -> bool {
        self.rules
            .iter()
            .find(|rule| rule.matches(time))
            .map_or_else(
                || time.minute() % self.interval.minutes() == 0,
                |rule| rule.is_boundary,
            )
    }

    fn first_ambiguous_minute(&self) -> Option<NaiveTime> {
        all_minutes().find(|t| {
            self.is_start_time(*t) && self.is_start_time(*t + TimeDelta::minutes(1))
        })
    }
}

impl Default for SessionCalendar {
    fn default() -> Self {
        Self::from_schedule(&SessionSchedule::default())
    }
}

fn all_minutes() -> impl Iterator<Item = NaiveTime> {
    (0..MINUTES_PER_DAY).filter_map(|m| NaiveTime::from_hms_opt(m / 60, m % 60, 0))
}
