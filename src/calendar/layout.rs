//! Placement of events onto a week row.
//!
//! Each event that touches a week becomes one [`Bar`] covering only that
//! week's portion of the event.  Bars are stacked into rows so that no two
//! bars in the same row share a column.

use super::grid::WeekSlice;
use super::util::DAYS_IN_WEEK;
use crate::event::Event;
use std::cmp::Reverse;

/// An event's placement within one week.  Columns are 1-based, with Sunday
/// in column 1.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Bar<'a> {
    pub(crate) event: &'a Event,
    pub(crate) start_column: usize,
    pub(crate) span: usize,
    pub(crate) row: usize,
}

impl Bar<'_> {
    pub(crate) fn end_column(&self) -> usize {
        self.start_column + self.span - 1
    }

    pub(crate) fn overlaps(&self, other: &Bar<'_>) -> bool {
        !(self.end_column() < other.start_column || self.start_column > other.end_column())
    }

    /// True if the event began before this bar's first day
    pub(crate) fn continues_before(&self, week: &WeekSlice) -> bool {
        self.event.start < week.start()
    }

    /// True if the event goes on after this bar's last day
    pub(crate) fn continues_after(&self, week: &WeekSlice) -> bool {
        self.event.end > week.end()
    }
}

/// Lays out every event that intersects `week`.
///
/// Relevant events are considered in order of start date, longer events
/// first among those starting on the same day, and input order otherwise;
/// each is put in the lowest row where it does not collide with a bar
/// already placed.
pub(crate) fn layout_week<'a, I>(week: &WeekSlice, events: I) -> Vec<Bar<'a>>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut relevant = events
        .into_iter()
        .filter(|ev| {
            if ev.start > ev.end {
                tracing::warn!(event = ?ev, "Skipping event that ends before it starts");
                false
            } else {
                ev.intersects(week.start(), week.end())
            }
        })
        .collect::<Vec<_>>();
    relevant.sort_by_key(|ev| (ev.start, Reverse(ev.end)));
    let mut bars: Vec<Bar<'a>> = Vec::with_capacity(relevant.len());
    for event in relevant {
        let Some((start_column, span)) = columns(week, event) else {
            continue;
        };
        let mut candidate = Bar {
            event,
            start_column,
            span,
            row: 0,
        };
        while bars
            .iter()
            .any(|b| b.row == candidate.row && b.overlaps(&candidate))
        {
            candidate.row += 1;
        }
        bars.push(candidate);
    }
    bars
}

/// Number of bar rows the week needs
pub(crate) fn row_count(bars: &[Bar<'_>]) -> usize {
    bars.iter().map(|b| b.row + 1).max().unwrap_or(0)
}

// Start column and span of the part of `event` inside `week`
fn columns(week: &WeekSlice, event: &Event) -> Option<(usize, usize)> {
    let clamped_start = event.start.max(week.start());
    let clamped_end = event.end.min(week.end());
    let first = week.index_of(clamped_start)?;
    let last = week.index_of(clamped_end)?;
    let span = (last.checked_sub(first)? + 1).min(DAYS_IN_WEEK - first);
    Some((first + 1, span))
}
