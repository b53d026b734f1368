use ratatui::{
    buffer::Buffer,
    layout::Flex,
    layout::{Alignment, Layout, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

static TEXT: &[&str] = &[
    "h, p, LEFT        Mês anterior\n",
    "l, n, RIGHT       Próximo mês\n",
    "0, t, HOME        Voltar para o mês atual\n",
    "g                 Ir para um mês (AAAA-MM)\n",
    "j, TAB, DOWN      Selecionar próxima atividade\n",
    "k, BACKTAB, UP    Selecionar atividade anterior\n",
    "ENTER             Ver detalhes da atividade\n",
    "f                 Filtrar por setor\n",
    "r                 Atualizar dados da planilha\n",
    "s                 Acessar a planilha no navegador\n",
    "?                 Mostrar esta ajuda\n",
    "q, ESC            Sair\n",
    "\n",
    "Pressione qualquer tecla para fechar.\n",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help(pub(crate) Style);

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = TEXT.iter().map(|&s| Line::raw(s)).collect::<Vec<_>>();
        let text = Text::from(lines);
        let height = u16::try_from(text.height())
            .unwrap_or(u16::MAX)
            .min(area.height)
            .saturating_add(2);
        let width = u16::try_from(text.width())
            .unwrap_or(u16::MAX)
            .min(area.width)
            .saturating_add(2);
        let para = Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(" Comandos ")
                    .title_alignment(Alignment::Center),
            )
            .style(self.0);
        let [help_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [help_area] = Layout::vertical([height])
            .flex(Flex::Center)
            .areas(help_area);
        let outer_area = Rect {
            x: help_area.x.saturating_sub(1),
            y: help_area.y,
            width: help_area.width.saturating_add(2),
            height: help_area.height,
        }
        .intersection(buf.area);
        Clear.render(outer_area, buf);
        Block::new().style(self.0).render(outer_area, buf);
        para.render(help_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::BASE_STYLE;

    #[test]
    fn test_fits_small_area() {
        let area = Rect::new(0, 0, 30, 8);
        let mut buffer = Buffer::empty(area);
        Help(BASE_STYLE).render(area, &mut buffer);
        let top = (0..area.width)
            .map(|x| buffer[(x, 0)].symbol())
            .collect::<String>();
        assert!(top.contains("Comandos"), "{top:?}");
    }

    #[test]
    fn test_lists_every_selection_key() {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        Help(BASE_STYLE).render(area, &mut buffer);
        let lines = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>();
        assert!(lines.iter().any(|l| l.contains("j, TAB, DOWN      Selecionar próxima")));
        assert!(lines.iter().any(|l| l.contains("k, BACKTAB, UP    Selecionar atividade anterior")));
        assert!(lines.iter().any(|l| l.contains("s                 Acessar a planilha")));
    }
}
