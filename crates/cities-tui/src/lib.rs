// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod loader;
mod pagination;
mod search_input;

pub use search_input::{KeyListeners, ListenerGuard, SearchAction, SearchInput, is_focus_shortcut};

use anyhow::{Context, Result};
use cities_app::{
    AppCommand, AppEvent, AppState, FetchRequest, KeyDisposition, PageButton, ResultPage,
    filter_key,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use loader::loader_line;
use pagination::PaginationView;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

const TITLE: &str = "Cities";
const COLUMN_HEADERS: [&str; 3] = ["#", "Place Name", "Country"];
const EMPTY_RESULT_TEXT: &str = "No result found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Loaded { request_id: u64, page: ResultPage },
    Failed { request_id: u64, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    Fetch(FetchEvent),
}

pub trait AppRuntime {
    fn fetch_cities(&mut self, request: &FetchRequest) -> Result<ResultPage>;

    /// Runs the fetch and reports the outcome on `tx`. The default runs
    /// inline; runtimes backed by a network override this to use a worker.
    fn spawn_fetch(&mut self, request: FetchRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let event = match self.fetch_cities(&request) {
            Ok(page) => FetchEvent::Loaded {
                request_id: request.request_id,
                page,
            },
            Err(error) => FetchEvent::Failed {
                request_id: request.request_id,
                error: format!("{error:#}"),
            },
        };
        tx.send(InternalEvent::Fetch(event))
            .map_err(|_| anyhow::anyhow!("fetch event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Results,
    Limit,
    Pagination,
}

impl Focus {
    const ORDER: [Self; 4] = [Self::Search, Self::Results, Self::Limit, Self::Pagination];

    fn available(self, state: &AppState) -> bool {
        match self {
            Self::Search => true,
            Self::Results | Self::Limit | Self::Pagination => state.shows_controls(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TableRowView {
    City {
        index: usize,
        name: String,
        flag_emoji: String,
        flag_alt: String,
        flag_url: String,
    },
    Empty {
        text: &'static str,
    },
}

#[derive(Debug)]
struct ViewData {
    focus: Focus,
    listeners: KeyListeners,
    search: SearchInput,
    selected_row: usize,
    pagination: PaginationView,
    tick: u64,
}

impl ViewData {
    fn new() -> Self {
        let listeners = KeyListeners::default();
        let search = SearchInput::mount(&listeners);
        Self {
            focus: Focus::Search,
            listeners,
            search,
            selected_row: 0,
            pagination: PaginationView::default(),
            tick: 0,
        }
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let result = Terminal::new(backend)
        .context("create terminal")
        .and_then(|mut terminal| event_loop(&mut terminal, state, runtime));

    let raw_mode = disable_raw_mode().context("disable raw mode");
    let screen =
        execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen");
    restore_outcome(result, [raw_mode, screen])
}

/// The loop's own error wins; otherwise the first restore failure is reported
/// and any later one is logged.
fn restore_outcome(result: Result<()>, restores: [Result<()>; 2]) -> Result<()> {
    let mut first_failure = None;
    for restore in restores {
        if let Err(error) = restore {
            if first_failure.is_none() && result.is_ok() {
                first_failure = Some(error);
            } else {
                log::error!("terminal restore failed: {error:#}");
            }
        }
    }
    match first_failure {
        Some(error) => Err(error),
        None => result,
    }
}

fn event_loop<B: Backend, R: AppRuntime>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    runtime: &mut R,
) -> Result<()> {
    let mut view_data = ViewData::new();
    let (internal_tx, internal_rx) = mpsc::channel();

    dispatch(state, runtime, &internal_tx, AppCommand::Mount);

    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);
        sync_view_data(state, &mut view_data);

        terminal
            .draw(|frame| render(frame, state, &view_data))
            .context("draw frame")?;

        if event::poll(Duration::from_millis(120)).context("poll event")? {
            if let Event::Key(key) = event::read().context("read event")?
                && handle_key_event(state, runtime, &mut view_data, &internal_tx, key)
            {
                return Ok(());
            }
        }
        view_data.tick = view_data.tick.wrapping_add(1);
    }
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        let command = match event {
            InternalEvent::Fetch(FetchEvent::Loaded { request_id, page }) => {
                AppCommand::ResponseReceived { request_id, page }
            }
            InternalEvent::Fetch(FetchEvent::Failed { request_id, error }) => {
                AppCommand::RequestFailed { request_id, error }
            }
        };
        let events = dispatch(state, runtime, tx, command);
        if events
            .iter()
            .any(|event| matches!(event, AppEvent::ResultsReplaced { .. }))
        {
            view_data.selected_row = 0;
        }
    }
}

/// Applies a command, starts any fetches it requests, and logs the outcome.
fn dispatch<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    for event in &events {
        log_event(event);
        if let AppEvent::FetchRequested(request) = event
            && let Err(error) = runtime.spawn_fetch(request.clone(), tx.clone())
        {
            log::error!("fetch #{} not started: {error:#}", request.request_id);
        }
    }
    events
}

fn log_event(event: &AppEvent) {
    match event {
        AppEvent::FetchRequested(request) => log::debug!(
            "fetch #{} limit={} namePrefix={:?} offset={}",
            request.request_id,
            request.limit,
            request.search,
            request.offset()
        ),
        AppEvent::ResultsReplaced {
            request_id,
            rows,
            total_count,
        } => log::debug!("fetch #{request_id} loaded {rows} of {total_count} cities"),
        AppEvent::StaleResponseDiscarded { request_id, latest } => {
            log::debug!("fetch #{request_id} superseded by #{latest}; response dropped")
        }
        AppEvent::FetchFailed { request_id, error } => {
            log::error!("fetch #{request_id} failed: {error}")
        }
        AppEvent::AlertRaised(message) => log::warn!("limit rejected: {message}"),
        AppEvent::LoadingChanged(_)
        | AppEvent::SearchChanged(_)
        | AppEvent::PageChanged(_)
        | AppEvent::LimitEdited(_)
        | AppEvent::AlertDismissed => {}
    }
}

fn sync_view_data(state: &AppState, view_data: &mut ViewData) {
    if !view_data.focus.available(state) {
        view_data.focus = Focus::Search;
    }
    view_data.selected_row = view_data
        .selected_row
        .min(state.results.data.len().saturating_sub(1));
    view_data
        .pagination
        .update(state.pagination(), view_data.focus == Focus::Pagination);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }

    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if state.alert.is_some() {
        dispatch(state, runtime, internal_tx, AppCommand::DismissAlert);
        return false;
    }

    if let Some(target) = view_data.listeners.dispatch(&key) {
        view_data.focus = target;
        return false;
    }

    match key.code {
        KeyCode::Tab => {
            cycle_focus(state, view_data, 1);
            return false;
        }
        KeyCode::BackTab => {
            cycle_focus(state, view_data, -1);
            return false;
        }
        _ => {}
    }

    match view_data.focus {
        Focus::Search => {
            if let Some(SearchAction::Submit(term)) = view_data.search.handle_key(key) {
                dispatch(state, runtime, internal_tx, AppCommand::SubmitSearch(term));
            }
        }
        Focus::Results => handle_results_key(state, view_data, key),
        Focus::Limit => handle_limit_key(state, runtime, internal_tx, key),
        Focus::Pagination => {
            let button = match key.code {
                KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => PageButton::Previous,
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => PageButton::Next,
                _ => return false,
            };
            if let Some(page) = state.pagination().press(button) {
                dispatch(state, runtime, internal_tx, AppCommand::ChangePage(page));
            }
        }
    }
    false
}

fn cycle_focus(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let available = Focus::ORDER
        .iter()
        .copied()
        .filter(|focus| focus.available(state))
        .collect::<Vec<_>>();
    let current = available
        .iter()
        .position(|focus| *focus == view_data.focus)
        .unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(available.len() as isize) as usize;
    view_data.focus = available[next];
}

fn handle_results_key(state: &AppState, view_data: &mut ViewData, key: KeyEvent) {
    let last = state.results.data.len().saturating_sub(1);
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            view_data.selected_row = (view_data.selected_row + 1).min(last);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
        }
        KeyCode::Home | KeyCode::Char('g') => view_data.selected_row = 0,
        KeyCode::End | KeyCode::Char('G') => view_data.selected_row = last,
        _ => {}
    }
}

fn handle_limit_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Enter if !key.modifiers.contains(KeyModifiers::SHIFT) => {
            dispatch(state, runtime, internal_tx, AppCommand::SubmitLimit);
        }
        KeyCode::Backspace => {
            let mut raw = state.limit_input.clone();
            raw.pop();
            dispatch(state, runtime, internal_tx, AppCommand::EditLimit(raw));
        }
        KeyCode::Char(ch) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            if filter_key(ch, None) == KeyDisposition::Suppress {
                return;
            }
            let mut raw = state.limit_input.clone();
            raw.push(ch);
            dispatch(state, runtime, internal_tx, AppCommand::EditLimit(raw));
        }
        _ => {}
    }
}

fn table_rows(state: &AppState) -> Vec<TableRowView> {
    if state.results.is_empty() {
        return vec![TableRowView::Empty {
            text: EMPTY_RESULT_TEXT,
        }];
    }

    state
        .results
        .data
        .iter()
        .enumerate()
        .map(|(index, city)| {
            let flag = city.flag();
            TableRowView::City {
                index: index + 1,
                name: city.name.clone(),
                flag_emoji: flag.emoji(),
                flag_alt: flag.alt().to_owned(),
                flag_url: flag.url(),
            }
        })
        .collect()
}

fn footer_text(state: &AppState, view_data: &ViewData) -> String {
    let hints = match view_data.focus {
        Focus::Search => "type to search | enter search",
        Focus::Results => "j/k move",
        Focus::Limit => "digits | enter apply limit",
        Focus::Pagination => "h/l prev/next",
    };
    let mut text = format!("{hints} | tab focus | ctrl+/ search | ctrl+q quit");
    if view_data.focus == Focus::Results
        && let Some(TableRowView::City { flag_url, .. }) =
            table_rows(state).into_iter().nth(view_data.selected_row)
    {
        text = format!("flag: {flag_url} | {text}");
    }
    text
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(40)])
        .split(layout[0]);
    let title = Paragraph::new(TITLE)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, header[0]);

    let search_focused = view_data.focus == Focus::Search;
    let search = Paragraph::new(view_data.search.query()).block(
        Block::default()
            .title("search (ctrl+/)")
            .borders(Borders::ALL)
            .border_style(focus_style(search_focused)),
    );
    frame.render_widget(search, header[1]);
    if search_focused && state.alert.is_none() {
        place_cursor(frame, header[1], view_data.search.query());
    }

    if state.loading {
        frame.render_widget(Paragraph::new(loader_line(view_data.tick)), layout[1]);
    }

    render_table(frame, layout[2], state, view_data);

    if state.shows_controls() {
        let controls = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(12), Constraint::Min(10)])
            .split(layout[3]);
        let limit_focused = view_data.focus == Focus::Limit;
        let limit = Paragraph::new(state.limit_input.as_str()).block(
            Block::default()
                .title("limit")
                .borders(Borders::ALL)
                .border_style(focus_style(limit_focused)),
        );
        frame.render_widget(limit, controls[0]);
        if limit_focused && state.alert.is_none() {
            place_cursor(frame, controls[0], &state.limit_input);
        }

        let pagination = Paragraph::new(view_data.pagination.line().clone())
            .alignment(Alignment::Right)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(focus_style(view_data.focus == Focus::Pagination)),
            );
        frame.render_widget(pagination, controls[1]);
    }

    let footer = Paragraph::new(footer_text(state, view_data))
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(footer, layout[4]);

    if let Some(message) = &state.alert {
        let area = centered_rect(50, 30, frame.area());
        frame.render_widget(Clear, area);
        let alert = Paragraph::new(format!("{message}\n\npress any key"))
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title("alert")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(alert, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let header = Row::new(COLUMN_HEADERS.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let widths = [
        Constraint::Length(4),
        Constraint::Min(16),
        Constraint::Length(12),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(view_data.focus == Focus::Results));

    let mut rows = Vec::new();
    let mut empty_text = None;
    for row in table_rows(state) {
        match row {
            TableRowView::City {
                index,
                name,
                flag_emoji,
                flag_alt,
                ..
            } => rows.push(Row::new(vec![
                Cell::from(index.to_string()),
                Cell::from(name),
                Cell::from(format!("{flag_emoji} {flag_alt}")),
            ])),
            TableRowView::Empty { text } => empty_text = Some(text),
        }
    }

    let inner = block.inner(area);
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut table_state = TableState::default();
    if view_data.focus == Focus::Results {
        table_state.select(Some(view_data.selected_row));
    }
    frame.render_stateful_widget(table, area, &mut table_state);

    // Table rows cannot span columns, so the empty row is drawn across the
    // whole body below the header.
    if let Some(text) = empty_text
        && inner.height > 1
    {
        let body = Rect {
            y: inner.y + 1,
            height: 1,
            ..inner
        };
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), body);
    }
}

fn place_cursor(frame: &mut ratatui::Frame<'_>, area: Rect, text: &str) {
    let width = area.width.saturating_sub(2);
    let offset = (text.chars().count() as u16).min(width.saturating_sub(1));
    frame.set_cursor_position((area.x + 1 + offset, area.y + 1));
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
