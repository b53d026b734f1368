use crate::event::Event;
use crate::theme::{
    filter::{ACTIVE_STYLE, CURSOR_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Rect},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, StatefulWidget, Widget},
};
use std::collections::BTreeSet;

/// Label of the entry that clears the filter
pub(crate) const ALL_SECTORS: &str = "Todos";

/// Popup listing every sector in the feed, opened with the current filter
/// highlighted
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct FilterPicker;

impl StatefulWidget for FilterPicker {
    type State = FilterState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let text = state.to_text(area.height.saturating_sub(2));
        let width = u16::try_from(text.width())
            .unwrap_or(u16::MAX)
            .max(20)
            .saturating_add(4)
            .min(area.width);
        let height = u16::try_from(text.height())
            .unwrap_or(u16::MAX)
            .saturating_add(2)
            .min(area.height);
        let [popup] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [popup] = Layout::vertical([height]).flex(Flex::Center).areas(popup);
        Clear.render(popup, buf);
        Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(" Filtrar por setor ")
                    .title_alignment(Alignment::Center),
            )
            .style(BASE_STYLE)
            .render(popup, buf);
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct FilterState {
    // Index 0 is the "all sectors" entry
    options: Vec<Option<String>>,
    active: usize,
    cursor: usize,
}

impl FilterState {
    pub(crate) fn new(events: &[Event], current: Option<&str>) -> FilterState {
        let sectors = events
            .iter()
            .map(|ev| ev.sector.as_str())
            .chain(current)
            .collect::<BTreeSet<_>>();
        let options = std::iter::once(None)
            .chain(sectors.into_iter().map(|s| Some(s.to_owned())))
            .collect::<Vec<_>>();
        let active = options
            .iter()
            .position(|opt| opt.as_deref() == current)
            .unwrap_or(0);
        FilterState {
            options,
            active,
            cursor: active,
        }
    }

    fn label(option: Option<&str>) -> &str {
        option.unwrap_or(ALL_SECTORS)
    }

    // Only the window of options around the cursor that fits in `rows` lines
    fn to_text(&self, rows: u16) -> Text<'static> {
        let rows = usize::from(rows).max(1);
        let skip = (self.cursor + 1).saturating_sub(rows);
        let lines = self
            .options
            .iter()
            .enumerate()
            .skip(skip)
            .take(rows)
            .map(|(i, opt)| {
                let marker = if i == self.active { "● " } else { "  " };
                let style = if i == self.cursor {
                    CURSOR_STYLE
                } else if i == self.active {
                    ACTIVE_STYLE
                } else {
                    BASE_STYLE
                };
                Line::styled(format!("{marker}{}", FilterState::label(opt.as_deref())), style)
            });
        Text::from_iter(lines)
    }

    pub(crate) fn handle_input(&mut self, input: FilterInput) -> FilterOutput {
        match input {
            FilterInput::Up if self.cursor > 0 => {
                self.cursor -= 1;
                FilterOutput::Ok
            }
            FilterInput::Down if self.cursor + 1 < self.options.len() => {
                self.cursor += 1;
                FilterOutput::Ok
            }
            FilterInput::Top => {
                self.cursor = 0;
                FilterOutput::Ok
            }
            FilterInput::Bottom => {
                self.cursor = self.options.len().saturating_sub(1);
                FilterOutput::Ok
            }
            FilterInput::Enter => {
                FilterOutput::Apply(self.options.get(self.cursor).cloned().flatten())
            }
            _ => FilterOutput::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FilterInput {
    Up,
    Down,
    Top,
    Bottom,
    Enter,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum FilterOutput {
    Ok,
    Invalid,
    /// Show only events of the given sector, or all of them for `None`
    Apply(Option<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Status;
    use time::macros::date;

    fn events() -> Vec<Event> {
        ["TI", "RH", "TI", "Financeiro", "rh"]
            .into_iter()
            .map(|sector| Event {
                start: date!(2026 - 03 - 02),
                end: date!(2026 - 03 - 02),
                sector: sector.to_owned(),
                responsible: None,
                activity: None,
                status: Status::Finished,
            })
            .collect()
    }

    #[test]
    fn test_options() {
        let state = FilterState::new(&events(), None);
        assert_eq!(
            state.options,
            [
                None,
                Some(String::from("Financeiro")),
                Some(String::from("RH")),
                Some(String::from("TI")),
                Some(String::from("rh")),
            ]
        );
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_opens_on_current_filter() {
        let mut state = FilterState::new(&events(), Some("TI"));
        assert_eq!(state.cursor, 3);
        assert_eq!(
            state.handle_input(FilterInput::Enter),
            FilterOutput::Apply(Some(String::from("TI")))
        );
    }

    #[test]
    fn test_keeps_vanished_sector() {
        let state = FilterState::new(&events(), Some("Jurídico"));
        assert_eq!(state.options.len(), 6);
        assert_eq!(state.options[state.active].as_deref(), Some("Jurídico"));
    }

    #[test]
    fn test_navigation() {
        let mut state = FilterState::new(&events(), None);
        assert_eq!(state.handle_input(FilterInput::Up), FilterOutput::Invalid);
        assert_eq!(state.handle_input(FilterInput::Down), FilterOutput::Ok);
        assert_eq!(state.handle_input(FilterInput::Down), FilterOutput::Ok);
        assert_eq!(
            state.handle_input(FilterInput::Enter),
            FilterOutput::Apply(Some(String::from("RH")))
        );
        assert_eq!(state.handle_input(FilterInput::Bottom), FilterOutput::Ok);
        assert_eq!(state.handle_input(FilterInput::Down), FilterOutput::Invalid);
        assert_eq!(state.handle_input(FilterInput::Top), FilterOutput::Ok);
        assert_eq!(
            state.handle_input(FilterInput::Enter),
            FilterOutput::Apply(None)
        );
    }

    #[test]
    fn test_window_follows_cursor() {
        let mut state = FilterState::new(&events(), None);
        state.handle_input(FilterInput::Bottom);
        let text = state.to_text(2);
        assert_eq!(text.lines.len(), 2);
        assert_eq!(text.lines[1].to_string(), "  rh");
        assert_eq!(text.lines[0].to_string(), "  TI");
    }
}
