//! Streaming tick-to-bar aggregation over a session calendar.

use chrono::NaiveDateTime;
use sessionbar_types::Tick;
use tracing::{debug, warn};

use crate::bar::BarBuilder;
use crate::{Bar, SessionCalendar};

/// Mutable aggregation state for one instrument.
///
/// Owned by the caller and passed into every [`BarAggregator::accept`] call,
/// so independent instruments never share state. Start each file with a
/// fresh state.
#[derive(Debug, Clone, Default)]
pub struct AggregatorState {
    current: Option<BarBuilder>,
    last_accepted: Option<NaiveDateTime>,
}

impl AggregatorState {
    /// Creates an empty state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: None,
            last_accepted: None,
        }
    }

    /// Returns true if a bar is currently accumulating ticks.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Returns the open time of the bar currently accumulating ticks.
    #[must_use]
    pub fn open_time(&self) -> Option<NaiveDateTime> {
        self.current.as_ref().map(BarBuilder::open_time)
    }

    /// Returns the minute of the last accepted tick.
    #[must_use]
    pub const fn last_accepted(&self) -> Option<NaiveDateTime> {
        self.last_accepted
    }
}

/// Tick-by-tick bar state machine.
///
/// Ticks must arrive in non-decreasing timestamp order; out-of-order input
/// yields unspecified bars.
#[derive(Debug, Clone, Copy)]
pub struct BarAggregator<'a> {
    calendar: &'a SessionCalendar,
}

impl<'a> BarAggregator<'a> {
    /// Creates an aggregator over the given calendar.
    #[must_use]
    pub const fn new(calendar: &'a SessionCalendar) -> Self {
        Self { calendar }
    }

    /// Returns the calendar driving bar boundaries.
    #[must_use]
    pub const fn calendar(&self) -> &'a SessionCalendar {
        self.calendar
    }

    /// Processes a tick, potentially emitting a completed bar.
    ///
    /// Returns `Some(bar)` when a bar closes as a side effect of this tick,
    /// `None` otherwise. Ticks with a non-positive or non-finite price are
    /// ignored and leave `state` untouched.
    pub fn accept(&self, state: &mut AggregatorState, tick: &Tick) -> Option<Bar> {
        if !tick.is_valid() {
            debug!(timestamp = %tick.timestamp, "skipping tick with invalid prices");
            return None;
        }

        let minute = tick.minute();
        let starts_new =
            self.calendar.is_interval_start(minute) && state.last_accepted != Some(minute);
        let mut closed = None;

        match state.current.as_mut() {
            None if state.last_accepted == Some(minute) => {
                debug!(timestamp = %tick.timestamp, "skipping duplicate of closed minute");
                return None;
            }
            None => {
                if !self.calendar.is_interval_start(minute) {
                    debug!(timestamp = %tick.timestamp, "lost time: opening bar off boundary");
                }
                state.current = Some(BarBuilder::new(tick));
            }
            Some(builder) if starts_new => {
                // The open bar never saw its closing minute (a feed gap), so
                // it closes on the last accepted tick.
                warn!(
                    open_time = %builder.open_time(),
                    boundary = %minute,
                    "closing bar that missed its end minute"
                );
                let previous = std::mem::replace(builder, BarBuilder::new(tick));
                closed = Some(previous.finish());
            }
            Some(builder) => builder.update(tick),
        }

        state.last_accepted = Some(minute);

        if self.calendar.is_interval_end(minute) {
            debug_assert!(closed.is_none(), "calendar minute both starts and ends");
            return state.current.take().map(BarBuilder::finish);
        }

        closed
    }

    /// Finishes aggregation, returning any still-open bar.
    ///
    /// The bar keeps the last accepted tick's close and extremes. The state
    /// is left empty.
    pub fn flush(&self, state: &mut AggregatorState) -> Option<Bar> {
        state.current.take().map(BarBuilder::finish)
    }

    /// Wraps a tick iterator into a lazy iterator of completed bars.
    pub fn bars<I>(self, ticks: I) -> BarStream<'a, I::IntoIter>
    where
        I: IntoIterator<Item = Tick>,
    {
        BarStream {
            aggregator: self,
            state: AggregatorState::new(),
            ticks: ticks.into_iter().fuse(),
        }
    }
}

/// Lazy iterator of completed bars over a tick iterator.
///
/// Created by [`BarAggregator::bars`]. The still-open bar is flushed once the
/// underlying ticks are exhausted.
#[derive(Debug)]
pub struct BarStream<'a, I> {
    aggregator: BarAggregator<'a>,
    state: AggregatorState,
    ticks: std::iter::Fuse<I>,
}

impl<I: Iterator<Item = Tick>> Iterator for BarStream<'_, I> {
    type Item = Bar;

    fn next(&mut self) -> Option<Bar> {
        for tick in self.ticks.by_ref() {
            if let Some(bar) = self.aggregator.accept(&mut self.state, &tick) {
                return Some(bar);
            }
        }
        self.aggregator.flush(&mut self.state)
    }
}

/// Aggregates a sequence of ticks into bars, flushing the final bar.
pub fn aggregate_ticks<I>(calendar: &SessionCalendar, ticks: I) -> Vec<Bar>
where
    I: IntoIterator<Item = Tick>,
{
    BarAggregator::new(calendar).bars(ticks).collect()
}
