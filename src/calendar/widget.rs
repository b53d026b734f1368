use super::grid::{MonthGrid, WeekSlice};
use super::layout::{layout_week, row_count, Bar};
use super::util::DAYS_IN_WEEK;
use crate::event::Event;
use crate::theme::{
    status_style, DAY_STYLE, OUTSIDE_MONTH_STYLE, OVERFLOW_STYLE, RULE_STYLE, SELECTED_MODIFIER,
    TODAY_STYLE, WEEKDAY_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::Style,
    text::Text,
    widgets::{Paragraph, Widget},
};
use time::Date;

static WEEKDAY_NAMES: [&str; DAYS_IN_WEEK] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

/// Narrowest a day column is allowed to get
const MIN_DAY_WIDTH: u16 = 5;

/// Number of lines taken up by the header and its rule
const HEADER_LINES: u16 = 2;

/// Lines each week needs besides its bars: the day numbers and the rule
/// beneath the bars
const WEEK_CHROME_LINES: u16 = 2;

const ACS_HLINE: char = '─';

const CONTINUED_BEFORE: char = '◀';

const CONTINUED_AFTER: char = '▶';

/// One month of days with each week's events drawn as bars beneath the day
/// numbers
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Calendar<'a> {
    grid: &'a MonthGrid,
    events: &'a [&'a Event],
    today: Date,
    selected: Option<&'a Event>,
}

impl<'a> Calendar<'a> {
    pub(crate) fn new(grid: &'a MonthGrid, events: &'a [&'a Event], today: Date) -> Self {
        Calendar {
            grid,
            events,
            today,
            selected: None,
        }
    }

    pub(crate) fn selected(mut self, event: Option<&'a Event>) -> Self {
        self.selected = event;
        self
    }

    fn is_selected(&self, bar: &Bar<'_>) -> bool {
        self.selected.is_some_and(|ev| std::ptr::eq(ev, bar.event))
    }
}

impl Widget for Calendar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let day_width = (area.width / 7).max(MIN_DAY_WIDTH);
        let main_width = day_width * 7;
        let [area] = Layout::horizontal([Constraint::Length(main_width.min(area.width))])
            .flex(Flex::Center)
            .areas(area);
        let mut weeks = Vec::with_capacity(self.grid.week_qty());
        for week in self.grid.weeks() {
            let bars = layout_week(&week, self.events.iter().copied());
            weeks.push((week, bars));
        }
        let wanted = weeks
            .iter()
            .map(|(_, bars)| row_count(bars))
            .collect::<Vec<_>>();
        let spare = usize::from(area.height.saturating_sub(HEADER_LINES))
            .saturating_sub(weeks.len() * usize::from(WEEK_CHROME_LINES));
        let allotted = allot_bar_rows(&wanted, spare);
        let mut canvas = BufferCanvas::new(area, buf, day_width);
        canvas.draw_header(main_width);
        let mut y = HEADER_LINES;
        for ((week, bars), bar_rows) in std::iter::zip(weeks, allotted) {
            let mut hidden = [0usize; DAYS_IN_WEEK];
            for bar in &bars {
                if bar.row < bar_rows {
                    let style = status_style(&bar.event.status);
                    let style = if self.is_selected(bar) {
                        style.add_modifier(SELECTED_MODIFIER)
                    } else {
                        style
                    };
                    let row = u16::try_from(bar.row).unwrap_or(u16::MAX);
                    canvas.draw_bar(y.saturating_add(1).saturating_add(row), bar, &week, style);
                } else {
                    for n in &mut hidden[bar.start_column - 1..bar.end_column()] {
                        *n += 1;
                    }
                }
            }
            for (col, &date) in std::iter::zip(0u16.., week.days()) {
                let style = if date == self.today {
                    TODAY_STYLE
                } else if self.grid.in_month(date) {
                    DAY_STYLE
                } else {
                    OUTSIDE_MONTH_STYLE
                };
                canvas.draw_day(y, col, show_day(date, date == self.today), style);
                if let Some(&n) = hidden.get(usize::from(col)).filter(|&&n| n > 0) {
                    canvas.draw_overflow(y, col, n);
                }
            }
            let week_lines = u16::try_from(bar_rows)
                .unwrap_or(u16::MAX)
                .saturating_add(WEEK_CHROME_LINES);
            canvas.hline(y.saturating_add(week_lines - 1), 0, ACS_HLINE, main_width, RULE_STYLE);
            y = y.saturating_add(week_lines);
        }
    }
}

/// Shares `spare` lines out as bar rows, where week `i` needs `wanted[i]`.
///
/// When everything fits, every week is raised to a common minimum height as
/// far as the lines allow, and busier weeks get all the rows they need.
/// Otherwise rows are handed out one per week per round, so one busy week
/// cannot take the lines of another; bars left without a row are counted as
/// hidden.
fn allot_bar_rows(wanted: &[usize], spare: usize) -> Vec<usize> {
    if wanted.iter().sum::<usize>() <= spare {
        let total_at = |level: usize| wanted.iter().map(|&w| w.max(level)).sum::<usize>();
        let mut level = 0;
        while !wanted.is_empty() && total_at(level + 1) <= spare {
            level += 1;
        }
        return wanted.iter().map(|&w| w.max(level)).collect();
    }
    let mut allotted = vec![0; wanted.len()];
    let mut left = spare;
    while left > 0 {
        for (rows, &w) in std::iter::zip(&mut allotted, wanted) {
            if left > 0 && *rows < w {
                *rows += 1;
                left -= 1;
            }
        }
    }
    allotted
}

fn show_day(date: Date, is_today: bool) -> String {
    if is_today {
        format!("[{:2}]", date.day())
    } else {
        format!(" {:2} ", date.day())
    }
}

/// Text of a bar `width` columns wide, marking the ends where the event
/// carries on into a neighbouring week
fn bar_label(bar: &Bar<'_>, week: &WeekSlice, width: usize) -> String {
    let head = if bar.continues_before(week) {
        CONTINUED_BEFORE
    } else {
        ' '
    };
    let tail = bar.continues_after(week).then_some(CONTINUED_AFTER);
    let room = width.saturating_sub(1 + usize::from(tail.is_some()));
    let body = bar.event.sector.chars().take(room).collect::<String>();
    let mut label = format!("{head}{body:<room$}");
    label.extend(tail);
    label.chars().take(width).collect()
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
    day_width: u16,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer, day_width: u16) -> Self {
        Self {
            area,
            buf,
            day_width,
        }
    }

    fn draw_header(&mut self, main_width: u16) {
        for (col, name) in std::iter::zip(0u16.., WEEKDAY_NAMES) {
            self.mvprint(0, col * self.day_width + 1, name, WEEKDAY_STYLE);
        }
        self.hline(1, 0, ACS_HLINE, main_width, RULE_STYLE);
    }

    fn draw_day(&mut self, y: u16, col: u16, s: String, style: Style) {
        self.mvprint(y, col * self.day_width, s, style);
    }

    // Right-aligned count of bars that did not fit below the day
    fn draw_overflow(&mut self, y: u16, col: u16, qty: usize) {
        let s = format!("+{qty}");
        let len = u16::try_from(s.len()).unwrap_or(u16::MAX);
        let x = (col + 1) * self.day_width;
        if let Some(x) = x.checked_sub(len + 1) {
            self.mvprint(y, x, s, OVERFLOW_STYLE);
        }
    }

    fn draw_bar(&mut self, y: u16, bar: &Bar<'_>, week: &WeekSlice, style: Style) {
        let start = u16::try_from(bar.start_column - 1).unwrap_or(u16::MAX);
        let span = u16::try_from(bar.span).unwrap_or(u16::MAX);
        // Leave one blank column at the end so adjacent bars stay distinct
        let width = (span * self.day_width).saturating_sub(1);
        let label = bar_label(bar, week, usize::from(width));
        self.mvprint(y, start * self.day_width, label, style);
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Style) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style);
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // Using a Paragraph lets us truncate text that extends beyond the
            // calendar's area, though we need to be sure that the Rect passed
            // to the Paragraph is entirely within the frame lest a panic
            // result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16, style: Style) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Status;
    use crate::theme::{FINISHED_STYLE, IN_PROGRESS_STYLE};
    use time::macros::date;

    fn event(start: Date, end: Date, sector: &str, status: Status) -> Event {
        Event {
            start,
            end,
            sector: sector.to_owned(),
            responsible: None,
            activity: None,
            status,
        }
    }

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn render(grid: &MonthGrid, events: &[&Event], selected: Option<&Event>, area: Rect) -> Buffer {
        let mut buffer = Buffer::empty(area);
        Calendar::new(grid, events, date!(2026 - 03 - 18))
            .selected(selected)
            .render(area, &mut buffer);
        buffer
    }

    #[test]
    fn test_days_and_header() {
        let grid = MonthGrid::new(date!(2026 - 03 - 01)).unwrap();
        let buffer = render(&grid, &[], None, Rect::new(0, 0, 70, 22));
        assert_eq!(
            line(&buffer, 0),
            " Dom       Seg       Ter       Qua       Qui       Sex       Sáb      "
        );
        assert_eq!(line(&buffer, 1), "─".repeat(70));
        assert_eq!(
            line(&buffer, 2),
            "  1         2         3         4         5         6         7       "
        );
        assert_eq!(
            line(&buffer, 14),
            " 15        16        17       [18]       19        20        21       "
        );
        assert_eq!(buffer[(2, 2)].style().fg, DAY_STYLE.fg);
        assert_eq!(buffer[(31, 14)].style().fg, TODAY_STYLE.fg);
        // April days padding the last week are dimmed
        assert_eq!(buffer[(32, 18)].symbol(), "1");
        assert_eq!(buffer[(32, 18)].style().fg, OUTSIDE_MONTH_STYLE.fg);
    }

    #[test]
    fn test_bars() {
        let grid = MonthGrid::new(date!(2026 - 03 - 01)).unwrap();
        let ti = event(date!(2026 - 03 - 01), date!(2026 - 03 - 01), "TI", Status::Finished);
        let rh = event(date!(2026 - 03 - 05), date!(2026 - 03 - 10), "RH", Status::InProgress);
        let events = [&ti, &rh];
        let buffer = render(&grid, &events, Some(&rh), Rect::new(0, 0, 70, 22));
        // Week lines are 4 tall: days, two rows of bars, rule
        assert_eq!(&line(&buffer, 3)[..9], " TI      ");
        let week1 = line(&buffer, 3);
        let rh_bar = week1.chars().skip(40).take(29).collect::<String>();
        assert_eq!(rh_bar, format!(" RH{}▶", " ".repeat(25)));
        let week2 = line(&buffer, 7);
        let rh_bar = week2.chars().take(29).collect::<String>();
        assert_eq!(rh_bar, format!("◀RH{}", " ".repeat(26)));
        assert_eq!(buffer[(1, 3)].style().bg, FINISHED_STYLE.bg);
        assert_eq!(buffer[(41, 3)].style().bg, IN_PROGRESS_STYLE.bg);
        assert!(buffer[(41, 3)].style().add_modifier.contains(SELECTED_MODIFIER));
        assert!(!buffer[(1, 3)].style().add_modifier.contains(SELECTED_MODIFIER));
    }

    #[test]
    fn test_busy_week_takes_lines_of_quiet_weeks() {
        let grid = MonthGrid::new(date!(2026 - 03 - 01)).unwrap();
        let evs = ["A", "B", "C", "D"]
            .map(|s| event(date!(2026 - 03 - 09), date!(2026 - 03 - 10), s, Status::NotStarted));
        let events = evs.iter().collect::<Vec<_>>();
        let buffer = render(&grid, &events, None, Rect::new(0, 0, 70, 22));
        // Quiet weeks are 3 lines tall; the second week is 6: days on line
        // 5, bars on lines 6 through 9, rule on line 10
        assert_eq!(line(&buffer, 4), "─".repeat(70));
        let days = line(&buffer, 5);
        assert_eq!(&days[10..20], "  9       ");
        assert_eq!(&days[20..30], " 10       ");
        for (y, name) in std::iter::zip(6u16.., ["A", "B", "C", "D"]) {
            assert_eq!(&line(&buffer, y)[10..12], format!(" {name}"));
        }
        assert_eq!(line(&buffer, 10), "─".repeat(70));
        assert_eq!(&line(&buffer, 11)[..4], " 15 ");
    }

    #[test]
    fn test_overflow_count() {
        let grid = MonthGrid::new(date!(2026 - 03 - 01)).unwrap();
        let evs = ["A", "B", "C", "D"]
            .map(|s| event(date!(2026 - 03 - 09), date!(2026 - 03 - 10), s, Status::NotStarted));
        let events = evs.iter().collect::<Vec<_>>();
        // Room for only two bar rows in the whole month
        let buffer = render(&grid, &events, None, Rect::new(0, 0, 70, 14));
        // Second week: days on line 4, bars A and B on lines 5 and 6
        assert_eq!(&line(&buffer, 5)[10..12], " A");
        assert_eq!(&line(&buffer, 6)[10..12], " B");
        let days = line(&buffer, 4);
        assert_eq!(&days[10..20], "  9    +2 ");
        assert_eq!(&days[20..30], " 10    +2 ");
        assert_eq!(&days[30..40], " 11       ");
    }

    #[test]
    fn test_allot_bar_rows() {
        assert_eq!(allot_bar_rows(&[0, 0, 0, 0, 0], 10), [2, 2, 2, 2, 2]);
        assert_eq!(allot_bar_rows(&[1, 1, 0, 0, 0], 10), [2, 2, 2, 2, 2]);
        assert_eq!(allot_bar_rows(&[0, 4, 0, 0, 0], 10), [1, 4, 1, 1, 1]);
        assert_eq!(allot_bar_rows(&[0, 9, 0, 0], 9), [0, 9, 0, 0]);
        assert_eq!(allot_bar_rows(&[0, 4, 0, 0, 0], 2), [0, 2, 0, 0, 0]);
        assert_eq!(allot_bar_rows(&[3, 1, 5, 0], 5), [2, 1, 2, 0]);
        assert_eq!(allot_bar_rows(&[2, 2], 0), [0, 0]);
        assert_eq!(allot_bar_rows(&[], 4), Vec::<usize>::new());
    }

    #[test]
    fn test_bar_label() {
        let week = WeekSlice::containing(date!(2026 - 03 - 11)).unwrap();
        let ev = event(date!(2026 - 03 - 01), date!(2026 - 03 - 31), "Financeiro", Status::NotStarted);
        let bar = Bar {
            event: &ev,
            start_column: 1,
            span: 7,
            row: 0,
        };
        assert_eq!(bar_label(&bar, &week, 12), "◀Financeiro▶");
        assert_eq!(bar_label(&bar, &week, 8), "◀Financ▶");
        assert_eq!(bar_label(&bar, &week, 1), "◀");
    }
}
