//! TUI application and event loop
//!
//! Terminal setup/teardown, keyboard dispatch, the fixed-cadence poll loop,
//! and the submit/logout actions. Generic over [`GatewayClient`] so the
//! whole flow runs against a mock in tests.

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::client::GatewayClient;
use crate::config::Config;
use crate::qr::PairingQr;
use crate::state::{ConnectionState, MediaMessage, TextMessage};

use super::views::{
    MediaField, Screen, Tab, TextField, ViewState, render_auth_view, render_header,
    render_help_view, render_media_view, render_notice, render_offline_view, render_tabs,
    render_text_view,
};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Fixed poll cadence for status/QR refresh
    pub poll_interval: Duration,
    /// Grace period between logout and the single status re-poll
    pub logout_grace: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            logout_grace: Duration::from_secs(3),
        }
    }
}

impl AppConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.ui.poll_interval(),
            logout_grace: config.ui.logout_grace(),
        }
    }
}

/// Result type for TUI operations
pub type TuiResult<T> = std::result::Result<T, TuiError>;

/// Errors that can occur in the TUI
#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The dashboard application
pub struct App<C: GatewayClient> {
    /// Gateway client for all backend access
    client: C,
    config: AppConfig,
    /// Active tab on the connected dashboard
    tab: Tab,
    /// All display state, rebuilt from polls and form input
    state: ViewState,
    should_quit: bool,
    /// Last time the backend was polled
    last_poll: Instant,
}

impl<C: GatewayClient> App<C> {
    pub fn new(client: C, config: AppConfig) -> Self {
        Self {
            client,
            config,
            tab: Tab::default(),
            state: ViewState::default(),
            should_quit: false,
            last_poll: Instant::now(),
        }
    }

    /// Run the event loop until quit.
    pub fn run(&mut self) -> TuiResult<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = match Terminal::new(backend) {
            Ok(terminal) => terminal,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                return Err(err.into());
            }
        };

        // Initial poll so the first frame shows real state
        self.poll_backend();

        let result = self.event_loop(&mut terminal);

        let _ = disable_raw_mode();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> TuiResult<()> {
        let tick_rate = Duration::from_millis(100);

        while !self.should_quit {
            terminal.draw(|frame| {
                self.render(frame.area(), frame.buffer_mut());
            })?;

            // Keyboard input with timeout; HTTP calls run inline on this
            // thread, so at most one request is in flight at any time.
            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key_event(key);
                }
            }

            // Fixed-cadence poll-and-redraw; no backoff, no dedup.
            if self.last_poll.elapsed() >= self.config.poll_interval {
                self.poll_backend();
            }
        }

        Ok(())
    }

    /// Poll `/status` (and `/qr` while pairing) and rebuild display state.
    /// Exactly one status request per cycle.
    fn poll_backend(&mut self) {
        self.state.backend = self.client.fetch_status();

        let scanning = self
            .state
            .backend
            .snapshot()
            .is_some_and(|s| s.state == ConnectionState::ScanQr);
        if scanning {
            self.state.pairing_code = self.client.fetch_qr();
            self.state.qr_text = self.state.pairing_code.as_deref().and_then(|code| {
                match PairingQr::encode(code) {
                    Ok(qr) => Some(qr.to_half_blocks()),
                    Err(err) => {
                        // Not yet ready; the next cycle fetches a fresh one.
                        tracing::warn!(error = %err, "pairing code failed to encode");
                        None
                    }
                }
            });
        } else {
            self.state.pairing_code = None;
            self.state.qr_text = None;
        }

        self.last_poll = Instant::now();
    }

    /// Handle keyboard input
    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match Screen::of(&self.state) {
            // No text entry on these screens; plain keys act directly.
            Screen::Offline | Screen::Auth => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('r') => self.poll_backend(),
                _ => {}
            },
            Screen::Dashboard => self.handle_dashboard_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('l') {
                self.trigger_logout();
            }
            return;
        }

        match key.code {
            KeyCode::Left => self.tab = self.tab.prev(),
            KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::Tab => match self.tab {
                Tab::Text => self.state.text_form.focus_next(),
                Tab::Media => self.state.media_form.focus_next(),
                Tab::Help => {}
            },
            KeyCode::Enter => match self.tab {
                Tab::Text => self.submit_text(),
                Tab::Media => self.submit_media(),
                Tab::Help => {}
            },
            KeyCode::Esc => {
                match self.tab {
                    Tab::Text => self.state.text_form.clear(),
                    Tab::Media => self.state.media_form.clear(),
                    Tab::Help => {}
                }
                self.state.clear_notice();
            }
            KeyCode::Backspace => {
                if let Some(field) = self.focused_field_mut() {
                    field.pop();
                }
            }
            KeyCode::Char(c) if !c.is_control() => {
                if let Some(field) = self.focused_field_mut() {
                    field.push(c);
                }
            }
            _ => {}
        }
    }

    fn focused_field_mut(&mut self) -> Option<&mut String> {
        match self.tab {
            Tab::Text => Some(match self.state.text_form.focus {
                TextField::Number => &mut self.state.text_form.number,
                TextField::Message => &mut self.state.text_form.message,
            }),
            Tab::Media => Some(match self.state.media_form.focus {
                MediaField::Number => &mut self.state.media_form.number,
                MediaField::Path => &mut self.state.media_form.path,
                MediaField::Caption => &mut self.state.media_form.caption,
            }),
            Tab::Help => None,
        }
    }

    /// Validate and submit the text form. Empty fields never reach the
    /// backend.
    fn submit_text(&mut self) {
        let number = self.state.text_form.number.trim().to_string();
        let message = self.state.text_form.message.trim().to_string();
        if number.is_empty() || message.is_empty() {
            self.state.set_error("Please fill in both fields.");
            return;
        }

        let outbound = TextMessage {
            number: number.clone(),
            message,
        };
        match self.client.send_text(&outbound) {
            Ok(()) => {
                self.state.set_success(format!("Message sent to {number}"));
                self.state.text_form.message.clear();
            }
            Err(err) => self.state.set_error(err.to_string()),
        }
    }

    /// Validate and submit the media form. Without a file no request is
    /// issued; the file is read fresh on every submit.
    fn submit_media(&mut self) {
        let number = self.state.media_form.number.trim().to_string();
        let path = self.state.media_form.path.trim().to_string();
        if number.is_empty() || path.is_empty() {
            self.state.set_error("Phone number and file are required.");
            return;
        }

        let caption = Some(self.state.media_form.caption.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let outbound = match MediaMessage::from_path(number, Path::new(&path), caption) {
            Ok(outbound) => outbound,
            Err(err) => {
                self.state.set_error(err.to_string());
                return;
            }
        };
        match self.client.send_media(&outbound) {
            Ok(()) => self.state.set_success("File sent successfully"),
            Err(err) => self.state.set_error(err.to_string()),
        }
    }

    /// Logout: one POST, one fixed grace wait, one status re-poll.
    fn trigger_logout(&mut self) {
        match self.client.logout() {
            Ok(()) => {
                // Backend needs time to delete session files and restart.
                std::thread::sleep(self.config.logout_grace);
                self.poll_backend();
                self.state.set_info("Logged out successfully");
            }
            Err(err) => self.state.set_error(format!("Logout failed: {err}")),
        }
    }

    /// Render the current UI state
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let notice_height = if self.state.notice.is_some() { 2 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),              // Status header
                Constraint::Min(8),                 // Main content
                Constraint::Length(notice_height),  // Footer notice
            ])
            .split(area);

        render_header(&self.state, chunks[0], buf);

        match Screen::of(&self.state) {
            Screen::Offline => render_offline_view(chunks[1], buf),
            Screen::Auth => render_auth_view(&self.state, chunks[1], buf),
            Screen::Dashboard => {
                let dash_chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(2), Constraint::Min(6)])
                    .split(chunks[1]);
                render_tabs(self.tab, dash_chunks[0], buf);
                match self.tab {
                    Tab::Text => render_text_view(&self.state, dash_chunks[1], buf),
                    Tab::Media => render_media_view(&self.state, dash_chunks[1], buf),
                    Tab::Help => render_help_view(dash_chunks[1], buf),
                }
            }
        }

        if let Some(notice) = &self.state.notice {
            render_notice(notice, chunks[2], buf);
        }
    }
}

/// Run the dashboard.
///
/// # Example
///
/// ```ignore
/// use msgdeck_core::{Config, HttpGatewayClient};
/// use msgdeck_core::tui::{AppConfig, run_tui};
///
/// let config = Config::load()?;
/// let client = HttpGatewayClient::new(&config.backend)?;
/// run_tui(client, AppConfig::from_config(&config))?;
/// ```
pub fn run_tui<C: GatewayClient>(client: C, config: AppConfig) -> TuiResult<()> {
    let mut app = App::new(client, config);
    app.run()
}
