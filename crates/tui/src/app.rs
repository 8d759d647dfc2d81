use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use storetui_core::{catalog::CatalogClient, config::AppConfig, models::Game};
use tokio::{spawn, sync::mpsc};
use tracing::{error, info};

use crate::routes::{self, Route, View};

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Filter,
}

enum AppEvent {
    Input(Event),
    Tick,
    CatalogLoaded(Result<Vec<Game>>),
}

/// High-level application state for the storefront TUI.
pub struct StoreTuiApp {
    client: CatalogClient,
    route: &'static Route,
    state: UiState,
    pending_fetch: bool,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl StoreTuiApp {
    pub fn new(client: CatalogClient, config: &AppConfig) -> Self {
        let route = routes::resolve(&config.start_path);
        Self {
            client,
            route,
            state: UiState::default(),
            pending_fetch: false,
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);
        self.start_catalog_load();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }

            if self.state.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.state.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            Some(AppEvent::CatalogLoaded(result)) => {
                self.handle_catalog_loaded(result);
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self) {
        if self.state.mode == Mode::Filter {
            let message = format!("Filter: {}", self.state.filter);
            self.state.set_status(message);
        }
    }

    fn handle_catalog_loaded(&mut self, result: Result<Vec<Game>>) {
        self.pending_fetch = false;
        match result {
            Ok(games) => {
                info!(count = games.len(), "Catalog loaded");
                self.state.set_games(games);
                self.state.apply_filter();
                self.state.last_refresh = Some(Local::now());
                let message = format!("Loaded {} games", self.state.all_games.len());
                self.state.set_status(message);
            }
            Err(err) => {
                error!(?err, "Catalog load failed");
                self.state
                    .set_status(format!("Failed to load catalog: {err}"));
            }
        }
    }

    fn start_catalog_load(&mut self) {
        if self.pending_fetch {
            return;
        }
        let Some(sender) = self.event_tx.clone() else {
            self.state
                .set_status("Internal error: event channel unavailable".to_string());
            error!("event_channel_missing");
            return;
        };

        self.pending_fetch = true;
        info!(url = %self.client.games_url(), "Loading catalog");
        self.state.set_status("Loading catalog…".to_string());
        let client = self.client.clone();
        spawn(async move {
            let result = client.fetch_games().await;
            let _ = sender.send(AppEvent::CatalogLoaded(result)).await;
        });
    }

    fn navigate(&mut self, path: &str) {
        let route = routes::resolve(path);
        if route.path == self.route.path {
            return;
        }
        self.route = route;
        info!(path = %route.path, name = %route.name, "Navigated");
        self.state.set_status(format!("Opened {}", route.name));
    }

    fn navigate_next(&mut self) {
        let tabs = routes::navigation();
        let current = tabs
            .iter()
            .position(|route| route.view == self.route.view)
            .unwrap_or(0);
        let next = tabs[(current + 1) % tabs.len()];
        self.navigate(next.path);
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        if let Event::Key(ref key) = event {
            if self.handle_global_shortcut(key) {
                return Ok(());
            }
        }
        match self.route.view {
            View::Store => match event {
                Event::Key(key) => self.handle_key(key)?,
                Event::Resize(_, _) => {}
                Event::Mouse(_) => {}
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            },
            View::About => {
                if let Event::Key(key) = event {
                    self.handle_about_key(key)?;
                }
            }
        }
        Ok(())
    }

    fn handle_global_shortcut(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers == KeyModifiers::CONTROL {
            if let KeyCode::Char('r') = key.code {
                self.start_catalog_load();
                return true;
            }
        }
        false
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.state.mode {
            Mode::Filter => self.handle_filter_key(key),
            Mode::Browse => self.handle_store_key(key),
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.state.mode = Mode::Browse;
                self.state.set_status("Filter cancelled".to_string());
            }
            KeyCode::Enter => {
                self.state.mode = Mode::Browse;
                let message = format!("Filter applied: {}", self.state.filter);
                self.state.set_status(message);
            }
            KeyCode::Backspace => {
                self.state.filter.pop();
                self.state.apply_filter();
                let message = format!("Filter: {}", self.state.filter);
                self.state.set_status(message);
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.state.filter.push(c);
                    self.state.apply_filter();
                    let message = format!("Filter: {}", self.state.filter);
                    self.state.set_status(message);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_store_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1),
            KeyCode::Char('g') if key.modifiers.is_empty() => self.state.move_to(0),
            KeyCode::Char('G') if key.modifiers.is_empty() => self.state.move_to_end(),
            KeyCode::Home => self.state.move_to(0),
            KeyCode::End => self.state.move_to_end(),
            KeyCode::PageDown => self.state.page_down(),
            KeyCode::PageUp => self.state.page_up(),
            KeyCode::Char('/') => {
                self.state.mode = Mode::Filter;
                self.state.set_status("Enter filter text".to_string());
            }
            KeyCode::Tab => self.navigate_next(),
            _ => {}
        }
        Ok(())
    }

    fn handle_about_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Tab => self.navigate_next(),
            KeyCode::Esc => self.navigate("/store"),
            _ => {}
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        match self.route.view {
            View::Store => self.draw_store(frame),
            View::About => self.draw_about(frame),
        }
    }

    fn draw_store(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(size);

        self.render_header(frame, chunks[0]);

        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);

        self.render_game_list(frame, body_chunks[0]);
        self.render_game_info(frame, body_chunks[1]);
        self.render_status(frame, chunks[2]);
    }

    fn draw_about(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(4),
            ])
            .split(size);

        self.render_header(frame, chunks[0]);
        self.render_about(frame, chunks[1]);
        self.render_status(frame, chunks[2]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                "StoreTUI",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
        ];
        for (idx, route) in routes::navigation().into_iter().enumerate() {
            if idx > 0 {
                spans.push(Span::styled(" · ", Style::default().fg(self.theme.muted)));
            }
            let label = format!("{} ({})", route.name, route.path);
            let style = if route.view == self.route.view {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted)
            };
            spans.push(Span::styled(label, style));
        }

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title("Navigation"));
        frame.render_widget(paragraph, area);
    }

    fn render_game_list(&mut self, frame: &mut Frame, area: Rect) {
        self.state.list_height = area.height.saturating_sub(2) as usize;
        self.state.clamp_cursor();
        self.state.ensure_cursor_visible();

        let height = self.state.list_height;
        let mut list_state = ListState::default();
        let games = self.state.visible_games(height);
        if !games.is_empty() {
            let selected = self
                .state
                .cursor
                .saturating_sub(self.state.offset)
                .min(games.len().saturating_sub(1));
            list_state.select(Some(selected));
        }
        let items: Vec<ListItem> = games
            .iter()
            .enumerate()
            .map(|(idx, game)| {
                let global_index = self.state.offset + idx;
                let is_selected = self.state.cursor == global_index;
                let marker = if is_selected {
                    Span::styled(
                        "▶ ",
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw("  ")
                };
                let title = Span::styled(
                    game.title.clone(),
                    Style::default()
                        .fg(self.theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                );
                let platform = Span::styled(
                    format!(" · {}", game.platform),
                    Style::default().fg(self.theme.muted),
                );
                let mut line = vec![marker, title, platform];
                if let Some(percentage) = game.discount_percentage {
                    line.push(Span::styled(
                        format!("  -{percentage}%"),
                        Style::default().fg(self.theme.success),
                    ));
                }
                ListItem::new(Line::from(line))
            })
            .collect();

        let block = Block::default().borders(Borders::ALL).title("Games");
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_game_info(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Game Details");
        if let Some(game) = self.state.current_game() {
            let mut lines = Vec::new();
            lines.push(Line::from(Span::styled(
                game.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                game.genres.join(", "),
                Style::default().fg(self.theme.muted),
            )));
            lines.push(Line::from(format!("Platform: {}", game.platform)));
            match game.discount_percentage {
                Some(percentage) => {
                    lines.push(Line::from(vec![
                        Span::raw("Price: "),
                        Span::styled(
                            format_price(game.original_price),
                            Style::default()
                                .fg(self.theme.muted)
                                .add_modifier(Modifier::CROSSED_OUT),
                        ),
                        Span::raw(" "),
                        Span::styled(
                            format_price(game.final_price()),
                            Style::default()
                                .fg(self.theme.success)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!(" (-{percentage}%)"),
                            Style::default().fg(self.theme.success),
                        ),
                    ]));
                }
                None => {
                    lines.push(Line::from(format!(
                        "Price: {}",
                        format_price(game.original_price)
                    )));
                }
            }
            lines.push(Line::from(format!("Cover: {}", game.image_url)));
            lines.push(Line::from(format!("Id: {}", game.id)));
            let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
        } else {
            let paragraph = Paragraph::new("No games loaded").block(block);
            frame.render_widget(paragraph, area);
        }
    }

    fn render_about(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("About");
        let lines = vec![
            Line::from(Span::styled(
                "StoreTUI",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("A terminal browser for the game storefront catalog."),
            Line::from(format!("Backend: {}", self.client.origin())),
            Line::from(format!("Catalog endpoint: {}", self.client.games_url())),
            Line::from(""),
            Line::from(
                "Keys: j/k move · / filter · Ctrl+R refresh · Tab switch view · Esc back · q quit",
            ),
        ];
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = if self.state.mode == Mode::Filter {
            format!("Filter: {}", self.state.filter)
        } else {
            self.state.status.clone()
        };
        let refreshed = match self.state.last_refresh {
            Some(at) => format!(" · refreshed {}", at.format("%H:%M:%S")),
            None => String::new(),
        };
        let secondary = format!(
            "{} of {} games · {}{}",
            self.state.filtered.len(),
            self.state.all_games.len(),
            self.client.games_url(),
            refreshed
        );
        let paragraph = Paragraph::new(vec![Line::from(primary), Line::from(secondary)])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    all_games: Vec<Game>,
    filtered: Vec<Game>,
    cursor: usize,
    offset: usize,
    list_height: usize,
    filter: String,
    status: String,
    last_refresh: Option<DateTime<Local>>,
    mode: Mode,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            all_games: Vec::new(),
            filtered: Vec::new(),
            cursor: 0,
            offset: 0,
            list_height: 1,
            filter: String::new(),
            status: "Ready".to_string(),
            last_refresh: None,
            mode: Mode::Browse,
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_games(&mut self, games: Vec<Game>) {
        self.all_games = games;
    }

    fn apply_filter(&mut self) {
        if self.filter.trim().is_empty() {
            self.filtered = self.all_games.clone();
        } else {
            let needle = self.filter.to_lowercase();
            self.filtered = self
                .all_games
                .iter()
                .filter(|game| game_matches(game, &needle))
                .cloned()
                .collect();
        }
        self.cursor = 0;
        self.offset = 0;
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let len = self.filtered.len() as isize;
        let mut idx = self.cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        self.cursor = idx as usize;
        self.ensure_cursor_visible();
    }

    fn move_to(&mut self, index: usize) {
        if self.filtered.is_empty() {
            return;
        }
        self.cursor = index.min(self.filtered.len() - 1);
        self.ensure_cursor_visible();
    }

    fn move_to_end(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        self.cursor = self.filtered.len() - 1;
        self.ensure_cursor_visible();
    }

    fn page_down(&mut self) {
        if self.filtered.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.filtered.len());
        self.move_cursor(delta as isize);
    }

    fn page_up(&mut self) {
        if self.filtered.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.filtered.len());
        self.move_cursor(-(delta as isize));
    }

    fn visible_games(&self, height: usize) -> &[Game] {
        if self.filtered.is_empty() {
            return &[];
        }
        let end = (self.offset + height).min(self.filtered.len());
        &self.filtered[self.offset..end]
    }

    fn current_game(&self) -> Option<&Game> {
        self.filtered.get(self.cursor)
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn clamp_cursor(&mut self) {
        if self.filtered.is_empty() {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= self.filtered.len() {
            self.cursor = self.filtered.len() - 1;
        }
    }

    fn ensure_cursor_visible(&mut self) {
        if self.filtered.is_empty() || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        let max_offset = self.filtered.len().saturating_sub(height);

        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }

        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }
}

fn game_matches(game: &Game, needle: &str) -> bool {
    game.title.to_lowercase().contains(needle)
        || game.platform.to_lowercase().contains(needle)
        || game
            .genres
            .iter()
            .any(|genre| genre.to_lowercase().contains(needle))
}

fn format_price(value: f64) -> String {
    format!("${value:.2}")
}
