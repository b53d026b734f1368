use crate::calendar::format_dmy;
use crate::event::Event;
use crate::theme::{
    detail::{LABEL_STYLE, VALUE_STYLE},
    status_style, BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Widget, Wrap},
};

const POPUP_WIDTH: u16 = 60;

const NOT_INFORMED: &str = "Não informado";

/// Popup with every field of one event
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Detail<'a>(pub(crate) &'a Event);

impl Detail<'_> {
    fn to_text(self) -> Text<'static> {
        let event = self.0;
        let mut lines = vec![
            field("Data inicial", format_dmy(event.start)),
            field("Data final", format_dmy(event.end)),
            Line::from_iter([
                Span::styled("Status: ", LABEL_STYLE),
                Span::styled(
                    format!(" {} ", event.status.label()),
                    status_style(&event.status),
                ),
            ]),
            Line::raw(""),
            field("Setor / Área", event.sector.clone()),
            field(
                "Responsável",
                event
                    .responsible
                    .clone()
                    .unwrap_or_else(|| String::from(NOT_INFORMED)),
            ),
            Line::raw(""),
            Line::styled("Atividade:", LABEL_STYLE),
        ];
        match event.activity.as_deref() {
            Some(activity) => {
                lines.extend(activity.lines().map(|s| Line::styled(s.to_owned(), BASE_STYLE)));
            }
            None => lines.push(Line::styled(NOT_INFORMED, LABEL_STYLE)),
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled("ESC, ENTER ou q para fechar", LABEL_STYLE).right_aligned());
        Text::from(lines)
    }
}

fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from_iter([
        Span::styled(format!("{label}: "), LABEL_STYLE),
        Span::styled(value, VALUE_STYLE),
    ])
}

impl Widget for Detail<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = POPUP_WIDTH.min(area.width);
        let text = self.to_text();
        // Estimate of the wrapped height; words pushed onto a new line can
        // make it a little short, which the paragraph handles by clipping.
        let inner_width = usize::from(width.saturating_sub(2)).max(1);
        let lines = text
            .lines
            .iter()
            .map(|line| line.width().div_ceil(inner_width).max(1))
            .sum::<usize>();
        let para = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(
                Block::bordered()
                    .title(" Detalhes da Atividade ")
                    .title_alignment(Alignment::Center),
            )
            .style(BASE_STYLE);
        let lines = u16::try_from(lines).unwrap_or(u16::MAX);
        let height = lines.saturating_add(2).min(area.height);
        let [popup] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [popup] = Layout::vertical([height]).flex(Flex::Center).areas(popup);
        Clear.render(popup, buf);
        para.render(popup, buf);
    }
}
