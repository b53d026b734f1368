use super::util::{
    first_of_month, first_of_next_month, first_of_previous_month, iter_days_after,
    iter_days_before, last_of_month, WeekdayExt, DAYS_IN_WEEK,
};
use thiserror::Error;
use time::{Date, Month};

/// The days shown for one month: whole weeks from the Sunday on or before
/// the first of the month through the Saturday on or after its last day
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    first_of_month: Date,
    // Invariant: nonempty, contiguous, length is a multiple of DAYS_IN_WEEK,
    // starts on a Sunday
    days: Vec<Date>,
}

impl MonthGrid {
    pub(crate) fn new(reference: Date) -> Result<MonthGrid, OutOfTimeError> {
        let first = first_of_month(reference);
        let last = last_of_month(reference);
        let lead = usize::from(first.weekday().index0());
        let trail = DAYS_IN_WEEK - 1 - usize::from(last.weekday().index0());
        let mut days = iter_days_before(first).take(lead).collect::<Vec<_>>();
        if days.len() < lead {
            return Err(OutOfTimeError);
        }
        days.reverse();
        days.push(first);
        days.extend(iter_days_after(first).take_while(|&d| d <= last));
        let before = days.len();
        days.extend(iter_days_after(last).take(trail));
        if days.len() - before < trail {
            return Err(OutOfTimeError);
        }
        Ok(MonthGrid {
            first_of_month: first,
            days,
        })
    }

    pub(crate) fn year(&self) -> i32 {
        self.first_of_month.year()
    }

    pub(crate) fn month(&self) -> Month {
        self.first_of_month.month()
    }

    #[cfg(test)]
    pub(crate) fn first_of_month(&self) -> Date {
        self.first_of_month
    }

    #[cfg(test)]
    pub(crate) fn days(&self) -> &[Date] {
        &self.days
    }

    /// First and last days shown, both inclusive
    pub(crate) fn range(&self) -> (Date, Date) {
        let first = self.days.first().copied().unwrap_or(self.first_of_month);
        let last = self.days.last().copied().unwrap_or(self.first_of_month);
        (first, last)
    }

    pub(crate) fn in_month(&self, date: Date) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    pub(crate) fn weeks(&self) -> impl Iterator<Item = WeekSlice> + '_ {
        self.days.chunks_exact(DAYS_IN_WEEK).filter_map(WeekSlice::new)
    }

    pub(crate) fn week_qty(&self) -> usize {
        self.days.len() / DAYS_IN_WEEK
    }

    pub(crate) fn next(&self) -> Result<MonthGrid, OutOfTimeError> {
        first_of_next_month(self.first_of_month)
            .ok_or(OutOfTimeError)
            .and_then(MonthGrid::new)
    }

    pub(crate) fn previous(&self) -> Result<MonthGrid, OutOfTimeError> {
        first_of_previous_month(self.first_of_month)
            .ok_or(OutOfTimeError)
            .and_then(MonthGrid::new)
    }
}

/// Seven contiguous days, Sunday through Saturday
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct WeekSlice([Date; DAYS_IN_WEEK]);

impl WeekSlice {
    /// Returns `None` unless `days` are seven consecutive days starting on a
    /// Sunday
    pub(crate) fn new(days: &[Date]) -> Option<WeekSlice> {
        let days = <[Date; DAYS_IN_WEEK]>::try_from(days).ok()?;
        let contiguous = days.windows(2).all(|w| w[0].next_day() == Some(w[1]));
        (contiguous && days[0].weekday() == time::Weekday::Sunday).then_some(WeekSlice(days))
    }

    /// The week containing `date`, or `None` near the ends of time
    #[cfg(test)]
    pub(crate) fn containing(date: Date) -> Option<WeekSlice> {
        let lead = usize::from(date.weekday().index0());
        let sunday = iter_days_before(date).take(lead).last().unwrap_or(date);
        let mut days = vec![sunday];
        days.extend(iter_days_after(sunday).take(DAYS_IN_WEEK - 1));
        WeekSlice::new(&days)
    }

    pub(crate) fn start(&self) -> Date {
        self.0[0]
    }

    pub(crate) fn end(&self) -> Date {
        self.0[DAYS_IN_WEEK - 1]
    }

    pub(crate) fn days(&self) -> &[Date; DAYS_IN_WEEK] {
        &self.0
    }

    /// 0-based position of `date` within the week
    pub(crate) fn index_of(&self, date: Date) -> Option<usize> {
        (self.start() <= date && date <= self.end()).then(|| usize::from(date.weekday().index0()))
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;
