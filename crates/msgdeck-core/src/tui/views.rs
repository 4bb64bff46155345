//! Dashboard views and screen definitions
//!
//! Render functions are pure over [`ViewState`]; the event loop in
//! [`super::app`] owns all mutation. Screen selection is 1:1 with the
//! backend state partition: offline, not-yet-connected (authentication),
//! connected (send forms).

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Widget},
};

use crate::state::{BackendStatus, ConnectionState};

/// Which screen the dashboard shows, derived from the polled backend
/// status and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Backend unreachable; all actions blocked.
    Offline,
    /// Backend up but the session is not connected; authentication flow.
    Auth,
    /// Session connected; send forms available.
    Dashboard,
}

impl Screen {
    pub fn of(state: &ViewState) -> Self {
        match state.backend.snapshot() {
            None => Self::Offline,
            Some(snapshot) if snapshot.state.is_connected() => Self::Dashboard,
            Some(_) => Self::Auth,
        }
    }
}

/// Tabs available on the connected dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Text,
    Media,
    Help,
}

impl Tab {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text => "Send Text",
            Self::Media => "Send Media",
            Self::Help => "Help",
        }
    }

    pub const fn all() -> &'static [Self] {
        &[Self::Text, Self::Media, Self::Help]
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Text => 0,
            Self::Media => 1,
            Self::Help => 2,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Text => Self::Media,
            Self::Media => Self::Help,
            Self::Help => Self::Text,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::Text => Self::Help,
            Self::Media => Self::Text,
            Self::Help => Self::Media,
        }
    }
}

/// Outcome line shown in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Focusable fields of the text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextField {
    #[default]
    Number,
    Message,
}

#[derive(Debug, Default)]
pub struct TextForm {
    pub number: String,
    pub message: String,
    pub focus: TextField,
}

impl TextForm {
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            TextField::Number => TextField::Message,
            TextField::Message => TextField::Number,
        };
    }

    pub fn clear(&mut self) {
        self.number.clear();
        self.message.clear();
        self.focus = TextField::Number;
    }
}

/// Focusable fields of the media form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaField {
    #[default]
    Number,
    Path,
    Caption,
}

#[derive(Debug, Default)]
pub struct MediaForm {
    pub number: String,
    pub path: String,
    pub caption: String,
    pub focus: MediaField,
}

impl MediaForm {
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            MediaField::Number => MediaField::Path,
            MediaField::Path => MediaField::Caption,
            MediaField::Caption => MediaField::Number,
        };
    }

    pub fn clear(&mut self) {
        self.number.clear();
        self.path.clear();
        self.caption.clear();
        self.focus = MediaField::Number;
    }
}

/// All display state, rebuilt from polls and form input. No globals; the
/// app passes this through every render.
#[derive(Debug)]
pub struct ViewState {
    /// Last poll result. Offline until the first poll answers.
    pub backend: BackendStatus,
    /// Pairing string from `/qr`, present only during SCAN_QR.
    pub pairing_code: Option<String>,
    /// Half-block rendering of the pairing code.
    pub qr_text: Option<String>,
    pub text_form: TextForm,
    pub media_form: MediaForm,
    pub notice: Option<Notice>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            backend: BackendStatus::Offline,
            pairing_code: None,
            qr_text: None,
            text_form: TextForm::default(),
            media_form: MediaForm::default(),
            notice: None,
        }
    }
}

impl ViewState {
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        });
    }

    pub fn set_success(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        });
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Info,
            message: message.into(),
        });
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}

/// Badge text + style for the polled backend status.
pub fn status_badge(backend: &BackendStatus) -> (&'static str, Style) {
    let Some(snapshot) = backend.snapshot() else {
        return (
            "● Server Offline",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        );
    };
    match &snapshot.state {
        ConnectionState::Connected => (
            "● Online",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        ConnectionState::ScanQr => ("● Waiting for Scan", Style::default().fg(Color::Yellow)),
        ConnectionState::Connecting => ("● Connecting...", Style::default().fg(Color::Yellow)),
        ConnectionState::Initializing => ("● Initializing...", Style::default().fg(Color::Yellow)),
        ConnectionState::Disconnected | ConnectionState::Unknown(_) => {
            ("● Disconnected", Style::default().fg(Color::Red))
        }
    }
}

/// Render the one-line status header.
pub fn render_header(state: &ViewState, area: Rect, buf: &mut Buffer) {
    let (badge, badge_style) = status_badge(&state.backend);
    let mut spans = vec![
        Span::styled(
            "msgdeck  ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(badge, badge_style),
    ];
    if let Some(number) = state.backend.snapshot().and_then(|s| s.number.as_deref()) {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("+{number}"),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::BOTTOM))
        .render(area, buf);
}

/// Render the dashboard tab bar.
pub fn render_tabs(current: Tab, area: Rect, buf: &mut Buffer) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .map(|tab| {
            let style = if *tab == current {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(tab.name(), style))
        })
        .collect();

    Tabs::new(titles)
        .block(Block::default().borders(Borders::BOTTOM))
        .select(current.index())
        .highlight_style(Style::default().fg(Color::Yellow))
        .render(area, buf);
}

/// Render the backend-offline notice. No stale data, no actions.
pub fn render_offline_view(area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled(
            "Backend service is not reachable.",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Start the gateway backend, or point msgdeck at it with"),
        Line::from("--backend-url / [backend].base_url in msgdeck.toml."),
        Line::from(""),
        Line::from(Span::styled(
            "Retrying on the next poll cycle.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from("r: retry now   q: quit"),
    ];
    Paragraph::new(lines)
        .block(Block::default().title("Backend Offline").borders(Borders::ALL))
        .render(area, buf);
}

/// Render the authentication screen: instructions plus the pairing QR when
/// the backend has one ready.
pub fn render_auth_view(state: &ViewState, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let instructions = vec![
        Line::from(Span::styled(
            "Authentication Required",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("1. Open WhatsApp on your phone."),
        Line::from("2. Tap Menu (Android) or Settings (iOS)."),
        Line::from("3. Tap Linked Devices, then Link a Device."),
        Line::from("4. Point your phone at the code on the right."),
        Line::from(""),
        Line::from("r: refresh now   q: quit"),
    ];
    Paragraph::new(instructions)
        .block(Block::default().title("Instructions").borders(Borders::ALL))
        .render(chunks[0], buf);

    let qr_block = Block::default().title("Pairing Code").borders(Borders::ALL);
    let qr_inner = qr_block.inner(chunks[1]);
    qr_block.render(chunks[1], buf);

    if let Some(qr_text) = &state.qr_text {
        let mut lines: Vec<Line> = qr_text.lines().map(Line::from).collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Scan me with WhatsApp",
            Style::default().fg(Color::Gray),
        )));
        Paragraph::new(lines).render(qr_inner, buf);
    } else {
        let message = state.backend.snapshot().map_or(
            "Waiting for backend status...",
            |snapshot| {
                if snapshot.state.is_starting() {
                    "Engine is starting up... please wait a moment."
                } else {
                    "Waiting for backend to generate QR code..."
                }
            },
        );
        Paragraph::new(Span::styled(message, Style::default().fg(Color::Yellow)))
            .render(qr_inner, buf);
    }
}

/// One form input line with a focus marker.
fn input_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let marker = if focused { "▌" } else { " " };
    let value_style = if focused {
        Style::default().add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(format!("{label:<14}"), Style::default().fg(Color::Gray)),
        Span::styled(value, value_style),
    ])
}

/// Render the send-text form.
pub fn render_text_view(state: &ViewState, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(area);

    let form = &state.text_form;
    let lines = vec![
        input_line(
            "Phone number",
            &form.number,
            form.focus == TextField::Number,
        ),
        input_line("Message", &form.message, form.focus == TextField::Message),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: send   Tab: next field   Esc: clear form",
            Style::default().fg(Color::Gray),
        )),
    ];
    Paragraph::new(lines)
        .block(Block::default().title("Send Text Message").borders(Borders::ALL))
        .render(chunks[0], buf);

    let tips = vec![
        Line::from(Span::styled(
            "Tips:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  Use international format (e.g. 91987... for India, 1555... for US)."),
        Line::from("  Do not use '+' or spaces."),
        Line::from("  Ensure the number is on WhatsApp."),
    ];
    Paragraph::new(tips)
        .block(Block::default().title("Notes").borders(Borders::ALL))
        .render(chunks[1], buf);
}

/// Render the send-media form.
pub fn render_media_view(state: &ViewState, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(4)])
        .split(area);

    let form = &state.media_form;
    let lines = vec![
        input_line(
            "Phone number",
            &form.number,
            form.focus == MediaField::Number,
        ),
        input_line("File path", &form.path, form.focus == MediaField::Path),
        input_line("Caption", &form.caption, form.focus == MediaField::Caption),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: upload & send   Tab: next field   Esc: clear form",
            Style::default().fg(Color::Gray),
        )),
    ];
    Paragraph::new(lines)
        .block(Block::default().title("Send Media File").borders(Borders::ALL))
        .render(chunks[0], buf);

    let tips = vec![
        Line::from(Span::styled(
            "Accepted types:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  png jpg jpeg pdf doc docx xls xlsx"),
        Line::from("  Caption is optional. The file is read when you submit."),
    ];
    Paragraph::new(tips)
        .block(Block::default().title("Notes").borders(Borders::ALL))
        .render(chunks[1], buf);
}

/// Render the help screen.
pub fn render_help_view(area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled(
            "Keybindings",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  Ctrl+C          Quit (any screen)"),
        Line::from("  q               Quit (offline / authentication screens)"),
        Line::from("  r               Poll the backend now"),
        Line::from(""),
        Line::from(Span::styled(
            "Connected dashboard",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  Left / Right    Switch tab"),
        Line::from("  Tab             Next form field"),
        Line::from("  Enter           Submit the current form"),
        Line::from("  Esc             Clear the current form and notice"),
        Line::from("  Ctrl+L          Logout & reset the session"),
    ];
    Paragraph::new(lines)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .render(area, buf);
}

/// Render the footer notice line, when there is one.
pub fn render_notice(notice: &Notice, area: Rect, buf: &mut Buffer) {
    let style = match notice.kind {
        NoticeKind::Success => Style::default().fg(Color::Green),
        NoticeKind::Info => Style::default().fg(Color::Cyan),
        NoticeKind::Error => Style::default().fg(Color::Red),
    };
    Paragraph::new(Span::styled(notice.message.as_str(), style))
        .block(Block::default().borders(Borders::TOP))
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StatusSnapshot;

    fn online(state: ConnectionState) -> BackendStatus {
        BackendStatus::Online(StatusSnapshot {
            state,
            number: None,
        })
    }

    #[test]
    fn screen_partition_matches_backend_state() {
        let mut view = ViewState::default();
        assert_eq!(Screen::of(&view), Screen::Offline);

        for state in [
            ConnectionState::Initializing,
            ConnectionState::Connecting,
            ConnectionState::ScanQr,
            ConnectionState::Disconnected,
            ConnectionState::Unknown("REBOOTING".to_string()),
        ] {
            view.backend = online(state);
            assert_eq!(Screen::of(&view), Screen::Auth);
        }

        view.backend = online(ConnectionState::Connected);
        assert_eq!(Screen::of(&view), Screen::Dashboard);
    }

    #[test]
    fn tab_order_wraps_both_ways() {
        assert_eq!(Tab::Text.next(), Tab::Media);
        assert_eq!(Tab::Help.next(), Tab::Text);
        assert_eq!(Tab::Text.prev(), Tab::Help);
        for tab in Tab::all() {
            assert_eq!(tab.next().prev(), *tab);
        }
    }

    #[test]
    fn badges_track_connection_state() {
        let (label, _) = status_badge(&BackendStatus::Offline);
        assert_eq!(label, "● Server Offline");

        let (label, _) = status_badge(&online(ConnectionState::Connected));
        assert_eq!(label, "● Online");

        let (label, _) = status_badge(&online(ConnectionState::ScanQr));
        assert_eq!(label, "● Waiting for Scan");

        let (label, _) = status_badge(&online(ConnectionState::Unknown("X".to_string())));
        assert_eq!(label, "● Disconnected");
    }

    #[test]
    fn form_focus_cycles() {
        let mut form = MediaForm::default();
        assert_eq!(form.focus, MediaField::Number);
        form.focus_next();
        assert_eq!(form.focus, MediaField::Path);
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focus, MediaField::Number);
    }

    #[test]
    fn notices_replace_each_other() {
        let mut view = ViewState::default();
        view.set_error("nope");
        view.set_success("ok");
        let notice = view.notice.expect("notice set");
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.message, "ok");
    }
}
