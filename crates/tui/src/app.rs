use std::{io, mem, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ksrtc_core::{BookingEngine, BookingError, BookingForm, Field, Ticket};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{sync::mpsc, time::sleep};
use tracing::{error, info};

use crate::ticket_view::{self, rate_per_km};

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub(crate) struct Theme {
    pub(crate) primary_fg: Color,
    pub(crate) accent: Color,
    pub(crate) muted: Color,
    pub(crate) success: Color,
    pub(crate) warning: Color,
    pub(crate) danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug)]
enum AppEvent {
    Input(Event),
    Tick,
    Processed,
}

enum Screen {
    Form,
    Processing,
    Issued(Box<Ticket>),
    Failed(String),
}

/// How the booking session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A ticket was issued and shown.
    Issued,
    /// The user interrupted before a ticket was issued.
    Cancelled,
    /// Booking failed and the user closed the error screen.
    Failed,
}

/// Terminal front-end that feeds raw input through the booking gates.
pub struct BookingApp {
    engine: BookingEngine,
    form: BookingForm,
    input: String,
    error: Option<String>,
    screen: Screen,
    processing_delay: Duration,
    outcome: Option<Outcome>,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl BookingApp {
    pub fn new(engine: BookingEngine, processing_delay: Duration) -> Self {
        Self {
            engine,
            form: BookingForm::new(),
            input: String::new(),
            error: None,
            screen: Screen::Form,
            processing_delay,
            outcome: None,
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<Outcome> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        let result = loop {
            if let Err(err) = terminal.draw(|frame| self.draw(frame)) {
                break Err(err).context("failed to draw frame");
            }
            if let Some(outcome) = self.outcome {
                break Ok(outcome);
            }
            match event_rx.recv().await {
                Some(AppEvent::Input(event)) => self.handle_input(event),
                Some(AppEvent::Tick) => {}
                Some(AppEvent::Processed) => self.finish_booking(),
                None => break Ok(Outcome::Cancelled),
            }
        };

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        result
    }

    fn handle_input(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        if is_interrupt(&key) {
            self.outcome = Some(match self.screen {
                Screen::Issued(_) => Outcome::Issued,
                Screen::Failed(_) => Outcome::Failed,
                Screen::Form | Screen::Processing => {
                    info!("Booking cancelled by user");
                    Outcome::Cancelled
                }
            });
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Processing => {}
            Screen::Issued(_) => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char('q')) {
                    self.outcome = Some(Outcome::Issued);
                }
            }
            Screen::Failed(_) => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char('q')) {
                    self.outcome = Some(Outcome::Failed);
                }
            }
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(ch);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => self.submit(),
            _ => {}
        }
    }

    fn submit(&mut self) {
        let raw = mem::take(&mut self.input);
        match self.form.submit(&self.engine, &raw) {
            Ok(Field::Complete) => {
                self.error = None;
                self.begin_processing();
            }
            Ok(_) => self.error = None,
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    fn begin_processing(&mut self) {
        self.screen = Screen::Processing;
        let Some(sender) = self.event_tx.clone() else {
            self.finish_booking();
            return;
        };
        let delay = self.processing_delay;
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = sender.send(AppEvent::Processed).await;
        });
    }

    fn finish_booking(&mut self) {
        let form = mem::take(&mut self.form);
        let ticket = form
            .into_request()
            .and_then(|request| self.engine.build_ticket(request));
        self.screen = match ticket {
            Ok(ticket) => Screen::Issued(Box::new(ticket)),
            Err(err) => {
                error!(%err, "Booking failed");
                Screen::Failed(match err {
                    BookingError::BookingFailed(reason) => reason,
                    other => other.to_string(),
                })
            }
        };
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)])
            .split(area);
        self.render_header(frame, chunks[0]);

        match &self.screen {
            Screen::Form => self.draw_form(frame, chunks[1]),
            Screen::Processing => self.draw_message(
                frame,
                chunks[1],
                "PROCESSING YOUR BOOKING...",
                self.theme.warning,
            ),
            Screen::Issued(ticket) => self.draw_ticket(frame, chunks[1], ticket),
            Screen::Failed(reason) => self.draw_message(
                frame,
                chunks[1],
                &format!("An error occurred: {reason}\nPlease try again."),
                self.theme.danger,
            ),
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let header = Paragraph::new(Line::from(Span::styled(
            "WELCOME TO KSRTC BUS TICKET BOOKING SYSTEM",
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(2),
            ])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[0]);

        self.render_reference(frame, columns[0]);
        self.render_summary(frame, columns[1]);
        self.render_prompt(frame, rows[1]);
        self.render_status(frame, rows[2]);
    }

    fn render_reference(&self, frame: &mut Frame, area: Rect) {
        let data = self.engine.reference_data();
        let field = self.form.field();
        let plain = Style::default().fg(self.theme.primary_fg);
        let highlight = Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD);

        let (title, lines): (&str, Vec<Line>) = match field {
            Field::Origin | Field::Destination => {
                let selected = self.form.origin();
                let lines = data
                    .routes
                    .routes()
                    .iter()
                    .map(|route| {
                        let style = if Some(route.origin.as_str()) == selected {
                            highlight
                        } else {
                            plain
                        };
                        Line::from(Span::styled(
                            format!("{} -> {}", route.origin, route.destinations.join(", ")),
                            style,
                        ))
                    })
                    .collect();
                ("Available Routes", lines)
            }
            _ => {
                let selected = self.form.bus_type().map(|bus| bus.name.as_str());
                let lines = data
                    .bus_types
                    .iter()
                    .map(|bus| {
                        let style = if Some(bus.name.as_str()) == selected {
                            highlight
                        } else {
                            plain
                        };
                        Line::from(Span::styled(
                            format!(
                                "{:10} | {} | {}",
                                bus.name,
                                rate_per_km(bus.fare_per_km),
                                bus.amenities
                            ),
                            style,
                        ))
                    })
                    .collect();
                ("Bus Types & Amenities", lines)
            }
        };

        let panel = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(panel, area);
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .form
            .summary()
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(
                        format!("{label:<12}"),
                        Style::default().fg(self.theme.muted),
                    ),
                    Span::styled(value, Style::default().fg(self.theme.primary_fg)),
                ])
            })
            .collect();
        let summary = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Booking"));
        frame.render_widget(summary, area);
    }

    fn render_prompt(&self, frame: &mut Frame, area: Rect) {
        let prompt = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{}: ", self.form.field().prompt()),
                Style::default().fg(self.theme.accent),
            ),
            Span::styled(
                self.input.clone(),
                Style::default().fg(self.theme.primary_fg),
            ),
            Span::styled("_", Style::default().fg(self.theme.muted)),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(prompt, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let line = match &self.error {
            Some(message) => Line::from(Span::styled(
                message.clone(),
                Style::default().fg(self.theme.danger),
            )),
            None => Line::from(Span::styled(
                "Enter to confirm • Esc/Ctrl-C to cancel",
                Style::default().fg(self.theme.muted),
            )),
        };
        frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
    }

    fn draw_ticket(&self, frame: &mut Frame, area: Rect, ticket: &Ticket) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(1)])
            .split(area);
        let mut lines = vec![Line::from(Span::styled(
            "✓ Booking confirmed!",
            Style::default()
                .fg(self.theme.success)
                .add_modifier(Modifier::BOLD),
        ))];
        lines.extend(ticket_view::ticket_lines(ticket, &self.theme));
        frame.render_widget(Paragraph::new(lines), rows[0]);
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Press Enter or q to exit",
                Style::default().fg(self.theme.muted),
            )),
            rows[1],
        );
    }

    fn draw_message(&self, frame: &mut Frame, area: Rect, message: &str, color: Color) {
        let paragraph = Paragraph::new(message.to_string())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
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
