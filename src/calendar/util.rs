use std::iter::successors;
use time::{Date, Month, Weekday};

pub(crate) const DAYS_IN_WEEK: usize = 7;

pub(crate) trait WeekdayExt {
    fn index0(&self) -> u16;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> u16 {
        self.number_days_from_sunday().into()
    }
}

pub(crate) trait MonthExt {
    /// Name of the month as shown in the calendar's title
    fn name_pt(&self) -> &'static str;
}

impl MonthExt for Month {
    fn name_pt(&self) -> &'static str {
        match self {
            Month::January => "Janeiro",
            Month::February => "Fevereiro",
            Month::March => "Março",
            Month::April => "Abril",
            Month::May => "Maio",
            Month::June => "Junho",
            Month::July => "Julho",
            Month::August => "Agosto",
            Month::September => "Setembro",
            Month::October => "Outubro",
            Month::November => "Novembro",
            Month::December => "Dezembro",
        }
    }
}

pub(crate) fn first_of_month(date: Date) -> Date {
    date.replace_day(1)
        .expect("every month should have a first day")
}

// Returns `None` at the end of time
pub(crate) fn first_of_next_month(date: Date) -> Option<Date> {
    let (year, month) = match date.month() {
        Month::December => (date.year().checked_add(1)?, Month::January),
        m => (date.year(), m.next()),
    };
    Date::from_calendar_date(year, month, 1).ok()
}

// Returns `None` at the beginning of time
pub(crate) fn first_of_previous_month(date: Date) -> Option<Date> {
    first_of_month(date)
        .previous_day()
        .map(first_of_month)
}

pub(crate) fn last_of_month(date: Date) -> Date {
    // The last day of the last representable month is the last day of time,
    // so walk forwards instead of stepping back from the following month.
    iter_days_after(date)
        .take_while(|d| d.month() == date.month())
        .last()
        .unwrap_or(date)
}

pub(crate) fn iter_days_after(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.next_day()).skip(1)
}

pub(crate) fn iter_days_before(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.previous_day()).skip(1)
}

/// Formats a date the way the spreadsheet writes them
pub(crate) fn format_dmy(date: Date) -> String {
    format!(
        "{:02}/{:02}/{:04}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}
