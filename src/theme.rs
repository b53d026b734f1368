use crate::event::Status;
use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const DAY_STYLE: Style = BASE_STYLE;

pub(crate) const OUTSIDE_MONTH_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) const TODAY_STYLE: Style = Style::new()
    .fg(Color::LightBlue)
    .bg(Color::Black)
    .add_modifier(Modifier::BOLD);

pub(crate) const RULE_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) const OVERFLOW_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) const HINT_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) const LOADING_STYLE: Style = BASE_STYLE.fg(Color::LightYellow);

pub(crate) const SELECTED_MODIFIER: Modifier = Modifier::REVERSED;

pub(crate) const FINISHED_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Green);

pub(crate) const IN_PROGRESS_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Yellow);

pub(crate) const CANCELLED_STYLE: Style = Style::new().fg(Color::White).bg(Color::Red);

pub(crate) const NOT_STARTED_STYLE: Style = Style::new().fg(Color::Black).bg(Color::White);

pub(crate) const UNKNOWN_STATUS_STYLE: Style = Style::new().fg(Color::White).bg(Color::DarkGray);

pub(crate) fn status_style(status: &Status) -> Style {
    match status {
        Status::Finished => FINISHED_STYLE,
        Status::InProgress => IN_PROGRESS_STYLE,
        Status::Cancelled => CANCELLED_STYLE,
        Status::NotStarted => NOT_STARTED_STYLE,
        Status::Other(_) => UNKNOWN_STATUS_STYLE,
    }
}

pub(crate) mod jumpto {
    use super::*;

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const READY_ENTER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}

pub(crate) mod filter {
    use super::*;

    pub(crate) const CURSOR_STYLE: Style = BASE_STYLE.add_modifier(Modifier::REVERSED);

    pub(crate) const ACTIVE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);
}

pub(crate) mod detail {
    use super::*;

    pub(crate) const LABEL_STYLE: Style = BASE_STYLE.fg(Color::Gray);

    pub(crate) const VALUE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);
}
