use crate::calendar::{Calendar, MonthExt, MonthGrid, OutOfTimeError};
use crate::detail::Detail;
use crate::event::Event;
use crate::feed::EventSource;
use crate::filter::{FilterInput, FilterOutput, FilterPicker, FilterState};
use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::loader::Loader;
use crate::theme::{BASE_STYLE, HINT_STYLE, LOADING_STYLE, TITLE_STYLE};
use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::cmp::Reverse;
use std::io::{self, Write};
use std::time::Duration;
use time::Date;

/// How long to wait for a key press before checking on outstanding fetches
const POLL_INTERVAL: Duration = Duration::from_millis(100);

static HINTS: &str =
    " ? ajuda  ←/→ mês  TAB/ENTER atividade  f setor  r atualizar  s planilha  q sair";

static LOADING: &str = "Carregando eventos…";

#[derive(Debug)]
pub(crate) struct App<S> {
    today: Date,
    grid: MonthGrid,
    events: Vec<Event>,
    // Whether any fetch has completed yet
    loaded: bool,
    sector: Option<String>,
    sheet_link: Option<String>,
    // Index into `visible_events()`
    selected: Option<usize>,
    loader: Loader<S>,
    state: AppState,
}

impl<S: EventSource + Clone + Send + 'static> App<S> {
    pub(crate) fn new(today: Date, grid: MonthGrid, loader: Loader<S>) -> App<S> {
        App {
            today,
            grid,
            events: Vec::new(),
            loaded: false,
            sector: None,
            sheet_link: loader.source().sheet_link(),
            selected: None,
            loader,
            state: AppState::Calendar,
        }
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        self.refresh();
        while !self.quitting() {
            self.receive_events();
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if !event::poll(POLL_INTERVAL)? {
            return Ok(());
        }
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let event::Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h' | 'p') | KeyCode::Left => self.previous_month(),
                KeyCode::Char('l' | 'n') | KeyCode::Right => self.next_month(),
                KeyCode::Char('0' | 't') | KeyCode::Home => self.reset(),
                KeyCode::Char('j') | KeyCode::Tab | KeyCode::Down => self.select_next(),
                KeyCode::Char('k') | KeyCode::BackTab | KeyCode::Up => self.select_previous(),
                KeyCode::Enter => self.open_detail(),
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    true
                }
                KeyCode::Char('f') => {
                    self.state = AppState::Filtering(FilterState::new(
                        &self.events,
                        self.sector.as_deref(),
                    ));
                    true
                }
                KeyCode::Char('r') => {
                    self.refresh();
                    true
                }
                KeyCode::Char('s') => self.open_sheet(),
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Viewing(_) => {
                if matches!(key, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    false
                }
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char(c) => match c.to_digit(10).and_then(|d| u8::try_from(d).ok())
                        {
                            Some(d) => state.handle_input(JumpToInput::Digit(d)),
                            None => JumpToOutput::Invalid,
                        },
                        KeyCode::Backspace | KeyCode::Delete => {
                            state.handle_input(JumpToInput::Backspace)
                        }
                        KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                        _ => JumpToOutput::Invalid,
                    };
                    match output {
                        JumpToOutput::Ok => true,
                        JumpToOutput::Invalid => false,
                        JumpToOutput::Jump(date) => {
                            self.state = AppState::Calendar;
                            self.jump_to(date)
                        }
                    }
                }
            }
            AppState::Filtering(state) => {
                if matches!(key, KeyCode::Char('q' | 'f') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char('k') | KeyCode::Up => state.handle_input(FilterInput::Up),
                        KeyCode::Char('j') | KeyCode::Down => {
                            state.handle_input(FilterInput::Down)
                        }
                        KeyCode::Home => state.handle_input(FilterInput::Top),
                        KeyCode::End => state.handle_input(FilterInput::Bottom),
                        KeyCode::Enter => state.handle_input(FilterInput::Enter),
                        _ => FilterOutput::Invalid,
                    };
                    match output {
                        FilterOutput::Ok => true,
                        FilterOutput::Invalid => false,
                        FilterOutput::Apply(sector) => {
                            self.state = AppState::Calendar;
                            self.set_sector(sector);
                            true
                        }
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn refresh(&mut self) {
        self.loader.refresh();
    }

    fn open_sheet(&self) -> bool {
        let Some(link) = &self.sheet_link else {
            return false;
        };
        tracing::info!(link, "Opening spreadsheet in browser");
        match open::that_detached(link) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(link, error = %e, "Failed to open browser");
                false
            }
        }
    }

    fn receive_events(&mut self) {
        if let Some(events) = self.loader.take_latest() {
            self.set_events(events);
        }
    }

    // Replaces the whole event set at once, keeping the selection if the
    // selected event is still there
    fn set_events(&mut self, events: Vec<Event>) {
        let selected = self.selected_event().cloned();
        self.events = events;
        self.loaded = true;
        self.selected = selected.and_then(|sel| {
            self.visible_events()
                .into_iter()
                .position(|ev| *ev == sel)
        });
    }

    fn set_sector(&mut self, sector: Option<String>) {
        tracing::info!(?sector, "Filtering events by sector");
        self.sector = sector;
        self.selected = None;
    }

    fn show(&mut self, grid: Result<MonthGrid, OutOfTimeError>) -> bool {
        match grid {
            Ok(grid) => {
                self.grid = grid;
                self.selected = None;
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "Cannot move the calendar");
                false
            }
        }
    }

    fn next_month(&mut self) -> bool {
        let grid = self.grid.next();
        self.show(grid)
    }

    fn previous_month(&mut self) -> bool {
        let grid = self.grid.previous();
        self.show(grid)
    }

    fn reset(&mut self) -> bool {
        self.show(MonthGrid::new(self.today))
    }

    fn jump_to(&mut self, date: Date) -> bool {
        self.show(MonthGrid::new(date))
    }

    /// Events passing the sector filter that touch the displayed weeks, in
    /// the order selection moves through them
    fn visible_events(&self) -> Vec<&Event> {
        let (first, last) = self.grid.range();
        let mut events = self
            .events
            .iter()
            .filter(|ev| self.sector.as_deref().map_or(true, |s| ev.sector == s))
            .filter(|ev| ev.intersects(first, last))
            .collect::<Vec<_>>();
        events.sort_by(|a, b| {
            (a.start, Reverse(a.end), &a.sector).cmp(&(b.start, Reverse(b.end), &b.sector))
        });
        events
    }

    fn selected_event(&self) -> Option<&Event> {
        let i = self.selected?;
        self.visible_events().get(i).copied()
    }

    fn select_next(&mut self) -> bool {
        let qty = self.visible_events().len();
        if qty == 0 {
            return false;
        }
        self.selected = Some(self.selected.map_or(0, |i| (i + 1) % qty));
        true
    }

    fn select_previous(&mut self) -> bool {
        let qty = self.visible_events().len();
        if qty == 0 {
            return false;
        }
        self.selected = Some(self.selected.map_or(qty - 1, |i| (i + qty - 1) % qty));
        true
    }

    fn open_detail(&mut self) -> bool {
        match self.selected_event().cloned() {
            Some(event) => {
                self.state = AppState::Viewing(event);
                true
            }
            None => false,
        }
    }

    fn title(&self) -> Line<'static> {
        Line::styled(
            format!(
                " Calendário · {} de {}",
                self.grid.month().name_pt(),
                self.grid.year()
            ),
            TITLE_STYLE,
        )
    }

    fn status(&self) -> Line<'static> {
        let mut spans = Vec::new();
        if let Some(sector) = &self.sector {
            spans.push(Span::styled(format!("Setor: {sector}  "), TITLE_STYLE));
        }
        if self.loader.is_loading() {
            spans.push(Span::styled("Atualizando…  ", LOADING_STYLE));
        }
        Line::from_iter(spans).right_aligned()
    }
}

impl<S: EventSource + Clone + Send + 'static> Widget for &mut App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [title_area, main_area, hint_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);
        self.title().render(title_area, buf);
        self.status().render(title_area, buf);
        if self.loader.is_loading() && !self.loaded {
            let [loading_area] = Layout::vertical([1]).flex(Flex::Center).areas(main_area);
            Line::styled(LOADING, LOADING_STYLE)
                .centered()
                .render(loading_area, buf);
        } else {
            let visible = self.visible_events();
            let selected = self.selected.and_then(|i| visible.get(i).copied());
            Calendar::new(&self.grid, &visible, self.today)
                .selected(selected)
                .render(main_area, buf);
        }
        Line::styled(HINTS, HINT_STYLE).render(hint_area, buf);
        match &mut self.state {
            AppState::Helping => Help(BASE_STYLE).render(area, buf),
            AppState::Jumping(state) => JumpTo.render(area, buf, state),
            AppState::Filtering(state) => FilterPicker.render(area, buf, state),
            AppState::Viewing(event) => Detail(event).render(area, buf),
            AppState::Calendar | AppState::Quitting => (),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Viewing(Event),
    Jumping(JumpToState),
    Filtering(FilterState),
    Quitting,
}
