//! TUI (Terminal User Interface) module for the number guessing game
//!
//! This module provides an interactive terminal interface using Ratatui.
//!
//! # Architecture
//! - `TuiInterface`: owns the terminal, renders the latest `SessionView`
//! - `InputLine`: keyboard handling for the guess field, independent of the terminal
//!
//! # Keys
//! Digits build the guess and ENTER submits it while a game is running.
//! `E`/`M`/`H`/`X` switch difficulty, `T` toggles the countdown, `N` starts
//! a new game once the current one is over, ESC quits.

use crate::game_state::{GameInterface, UserAction};
use crate::mode::GameMode;
use crate::session::{Outcome, SessionView, Status, TimeBand};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use std::io;
use std::time::Duration;

const MAX_INPUT_LEN: usize = 6;
const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const RULES: [&str; 5] = [
    "Guess the secret number within the range",
    "You have limited attempts based on difficulty",
    "Get hints about how close you are",
    "Try timed mode for extra challenge",
    "Score higher with fewer attempts",
];
// Rules plus the block borders
const RULES_HEIGHT: u16 = RULES.len() as u16 + 2;

const SELECTED_STYLE: Style = Style::new()
    .fg(Color::White)
    .bg(Color::Magenta)
    .add_modifier(Modifier::BOLD);

fn mode_key(mode: GameMode) -> char {
    match mode {
        GameMode::Easy => 'E',
        GameMode::Medium => 'M',
        GameMode::Hard => 'H',
        GameMode::Expert => 'X',
    }
}

fn time_color(band: TimeBand) -> Color {
    match band {
        TimeBand::Plenty => Color::Green,
        TimeBand::Low => Color::Yellow,
        TimeBand::Critical => Color::Red,
    }
}

fn outcome_style(outcome: Outcome) -> Style {
    match outcome {
        Outcome::Correct => Style::new().fg(Color::Green),
        Outcome::TooLow => Style::new().fg(Color::Blue),
        Outcome::TooHigh => Style::new().fg(Color::Red),
    }
}

/// The guess being typed plus the last keyboard complaint.
#[derive(Debug, Default)]
struct InputLine {
    text: String,
    error: String,
}

impl InputLine {
    fn has_modifier_keys(key: &KeyEvent) -> bool {
        key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL)
    }

    /// Maps one key press to an action. `playing` selects guess entry or game-over keys.
    fn handle_key(&mut self, key: KeyEvent, playing: bool) -> Option<UserAction> {
        self.error.clear();
        if key.code == KeyCode::Esc {
            info_log!("handle_key() - ESC pressed, returning Exit");
            return Some(UserAction::Exit);
        }
        if Self::has_modifier_keys(&key) {
            debug_log!("handle_key() - Ignoring key with modifier: {:?}", key.modifiers);
            return None;
        }

        if let KeyCode::Char(c) = key.code {
            let upper = c.to_ascii_uppercase();
            if let Some(mode) = GameMode::ALL.into_iter().find(|m| mode_key(*m) == upper) {
                self.text.clear();
                return Some(UserAction::SelectMode(mode));
            }
            if upper == 'T' {
                self.text.clear();
                return Some(UserAction::ToggleTimed);
            }
        }

        if playing {
            self.handle_guess_key(key)
        } else {
            Self::handle_game_over_key(key)
        }
    }

    fn handle_guess_key(&mut self, key: KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.text.len() < MAX_INPUT_LEN {
                    self.text.push(c);
                    debug_log!("handle_guess_key() - Input now '{}'", self.text);
                }
                None
            }
            KeyCode::Backspace => {
                self.text.pop();
                None
            }
            KeyCode::Enter => {
                let guess = std::mem::take(&mut self.text);
                info_log!("handle_guess_key() - Submitting guess '{}'", guess);
                Some(UserAction::Guess(guess))
            }
            KeyCode::Char(c) => {
                self.error = format!("Only digits are allowed! ('{c}' is not a digit)");
                None
            }
            _ => None,
        }
    }

    fn handle_game_over_key(key: KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Char('n' | 'N') | KeyCode::Enter => Some(UserAction::NewGame),
            _ => None,
        }
    }
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    view: &'a SessionView,
    best_score: u32,
    current_input: &'a str,
    error_message: &'a str,
}

/// Main TUI interface component.
///
/// Manages terminal rendering, input handling, and game state display.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    view: Option<SessionView>,
    best_score: u32,
    input: InputLine,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal backend created");

        Ok(Self {
            terminal,
            view: None,
            best_score: 0,
            input: InputLine::default(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), io::Error> {
        let Some(view) = self.view.as_ref() else {
            return Ok(());
        };
        let ctx = RenderContext {
            view,
            best_score: self.best_score,
            current_input: &self.input.text,
            error_message: &self.input.error,
        };

        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(10)])
            .split(f.area());
        Self::render_title(f, rows[0], ctx.view);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(rows[1]);

        let timer_height = if ctx.view.timed { 3 } else { 0 };
        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),            // Modes
                Constraint::Length(3),            // Attempts gauge
                Constraint::Length(timer_height), // Countdown gauge
                Constraint::Length(3),            // Hint
                Constraint::Length(3),            // Input or game over
                Constraint::Min(0),
                Constraint::Length(3), // Instructions
            ])
            .split(columns[0]);

        Self::render_modes(f, main[0], ctx.view);
        Self::render_attempts(f, main[1], ctx.view);
        if ctx.view.timed {
            Self::render_timer(f, main[2], ctx.view);
        }
        Self::render_hint(f, main[3], ctx.view);
        Self::render_input(f, main[4], ctx);
        Self::render_instructions(f, main[6], ctx.view);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(4),
                Constraint::Length(RULES_HEIGHT),
            ])
            .split(columns[1]);
        Self::render_stats(f, side[0], ctx.view, ctx.best_score);
        Self::render_history(f, side[1], ctx.view);
        Self::render_rules(f, side[2]);
    }

    fn render_title(f: &mut Frame, area: Rect, view: &SessionView) {
        let title = Paragraph::new(Line::from(vec![
            Span::styled("NUMBER GUESSING GAME", HEADER_STYLE),
            Span::raw("   "),
            Span::styled(format!("★ {}", view.score), INFO_STYLE),
        ]))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_modes(f: &mut Frame, area: Rect, view: &SessionView) {
        let mut spans = Vec::new();
        for mode in GameMode::ALL {
            let style = if mode == view.mode {
                SELECTED_STYLE
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(
                format!(" [{}] {} ", mode_key(mode), mode.label()),
                style,
            ));
            spans.push(Span::raw(" "));
        }
        let timed = if view.timed { "[T] Timed: ON" } else { "[T] Timed: off" };
        spans.push(Span::styled(timed, MESSAGE_STYLE));

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().title("Difficulty").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_attempts(f: &mut Frame, area: Rect, view: &SessionView) {
        let gauge = Gauge::default()
            .block(Block::default().title("Attempts").borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Magenta))
            .percent(view.attempts_percent().min(100))
            .label(format!(
                "{}/{} (remaining {})",
                view.attempts,
                view.max_attempts,
                view.remaining_attempts()
            ));
        f.render_widget(gauge, area);
    }

    fn render_timer(f: &mut Frame, area: Rect, view: &SessionView) {
        let gauge = Gauge::default()
            .block(Block::default().title("Time").borders(Borders::ALL))
            .gauge_style(Style::default().fg(time_color(view.time_band())))
            .percent(view.time_percent().min(100))
            .label(format!("{}s", view.time_left));
        f.render_widget(gauge, area);
    }

    fn render_hint(f: &mut Frame, area: Rect, view: &SessionView) {
        let style = match view.status {
            Status::Won => SUCCESS_STYLE,
            Status::Lost => ERROR_STYLE,
            Status::Playing => MESSAGE_STYLE,
        };
        let text = if view.celebrating() {
            format!("🎉 {}", view.hint)
        } else {
            view.hint.to_string()
        };
        let paragraph = Paragraph::new(Span::styled(text, style))
            .block(Block::default().title("Hint").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_input(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let line = if ctx.view.status.is_over() {
            Line::from(Span::styled("Press N for a new game", INFO_STYLE))
        } else if !ctx.error_message.is_empty() {
            Line::from(vec![
                Span::raw(format!("> {}", ctx.current_input)),
                Span::raw("   "),
                Span::styled(ctx.error_message, ERROR_STYLE),
            ])
        } else {
            Line::from(format!("> {}_", ctx.current_input))
        };
        let title = format!("Your guess ({}-{})", ctx.view.mode.min(), ctx.view.mode.max());
        let paragraph =
            Paragraph::new(line).block(Block::default().title(title).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_stats(f: &mut Frame, area: Rect, view: &SessionView, best_score: u32) {
        let lines = vec![
            Line::from(vec![
                Span::raw("Best Score:    "),
                Span::styled(best_score.to_string(), INFO_STYLE),
            ]),
            Line::from(format!("Current Score: {}", view.score)),
            Line::from(format!("Difficulty:    {}", view.mode)),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Statistics").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_history(f: &mut Frame, area: Rect, view: &SessionView) {
        let mut lines: Vec<Line> = view
            .recent_history()
            .map(|entry| {
                Line::from(vec![
                    Span::raw(format!("{:>5}  ", entry.guess)),
                    Span::styled(entry.outcome.label(), outcome_style(entry.outcome)),
                ])
            })
            .collect();
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "No guesses yet",
                Style::default().fg(Color::DarkGray),
            )));
        }
        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Recent Guesses").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_rules(f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = RULES
            .iter()
            .map(|rule| Line::from(format!("\u{2022} {rule}")))
            .collect();
        let paragraph = Paragraph::new(lines)
            .style(MESSAGE_STYLE)
            .wrap(Wrap { trim: true })
            .block(Block::default().title("How to Play").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, view: &SessionView) {
        let text = if view.status.is_over() {
            "N: New Game | E/M/H/X: Difficulty | T: Timed | ESC: Quit"
        } else {
            "Type digits | ENTER: Guess | E/M/H/X: Difficulty | T: Timed | ESC: Quit"
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn handle_input(&mut self, timeout: Duration) -> Result<Option<UserAction>, io::Error> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        let event = event::read()?;
        match event {
            Event::Key(key) => {
                // Only process Press events, ignore Release and Repeat to avoid double input
                if key.kind != event::KeyEventKind::Press {
                    return Ok(None);
                }

                // Garbage from escape sequences when alt-tabbing
                if let KeyCode::Char(c) = key.code
                    && (c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD)
                {
                    debug_log!("handle_input() - Ignoring invalid character: {:?}", c);
                    return Ok(None);
                }

                let playing = self
                    .view
                    .as_ref()
                    .is_some_and(|view| view.status == Status::Playing);
                Ok(self.input.handle_key(key, playing))
            }
            Event::Resize(_, _) => {
                self.draw_or_log();
                Ok(None)
            }
            other => {
                debug_log!("handle_input() - Ignoring event: {:?}", other);
                Ok(None)
            }
        }
    }
}

impl GameInterface for TuiInterface {
    fn render(&mut self, view: &SessionView, best_score: u32) {
        if view.status.is_over() {
            self.input.text.clear();
        }
        self.view = Some(view.clone());
        self.best_score = best_score;
        self.draw_or_log();
    }

    fn next_action(&mut self, timeout: Option<Duration>) -> Option<UserAction> {
        let poll_timeout = timeout
            .unwrap_or(Duration::MAX)
            .min(Duration::from_millis(EVENT_POLL_TIMEOUT_MS));

        if self.draw().is_err() {
            info_log!("next_action() - Draw failed, returning Exit");
            return Some(UserAction::Exit);
        }
        match self.handle_input(poll_timeout) {
            Ok(action) => action,
            Err(e) => {
                log::warn!("Error reading terminal input: {e}");
                Some(UserAction::Exit)
            }
        }
    }

    fn display_exit_message(&mut self) {
        info_log!("TuiInterface - Exiting");
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_digits_build_guess_and_enter_submits() {
        let mut input = InputLine::default();
        assert_eq!(input.handle_key(press(KeyCode::Char('4')), true), None);
        assert_eq!(input.handle_key(press(KeyCode::Char('2')), true), None);
        assert_eq!(input.text, "42");
        assert_eq!(
            input.handle_key(press(KeyCode::Enter), true),
            Some(UserAction::Guess("42".to_string()))
        );
        assert!(input.text.is_empty());
    }

    #[test]
    fn test_backspace_and_length_cap() {
        let mut input = InputLine::default();
        for _ in 0..10 {
            input.handle_key(press(KeyCode::Char('9')), true);
        }
        assert_eq!(input.text.len(), MAX_INPUT_LEN);
        input.handle_key(press(KeyCode::Backspace), true);
        assert_eq!(input.text.len(), MAX_INPUT_LEN - 1);
    }

    #[test]
    fn test_non_digit_sets_error() {
        let mut input = InputLine::default();
        assert_eq!(input.handle_key(press(KeyCode::Char('z')), true), None);
        assert!(input.error.contains("'z'"));
        input.handle_key(press(KeyCode::Char('1')), true);
        assert!(input.error.is_empty());
    }

    #[test]
    fn test_mode_and_timed_keys() {
        let mut input = InputLine::default();
        input.handle_key(press(KeyCode::Char('7')), true);
        assert_eq!(
            input.handle_key(press(KeyCode::Char('h')), true),
            Some(UserAction::SelectMode(GameMode::Hard))
        );
        assert!(input.text.is_empty());
        assert_eq!(
            input.handle_key(press(KeyCode::Char('X')), false),
            Some(UserAction::SelectMode(GameMode::Expert))
        );
        assert_eq!(
            input.handle_key(press(KeyCode::Char('t')), true),
            Some(UserAction::ToggleTimed)
        );
    }

    #[test]
    fn test_game_over_keys() {
        let mut input = InputLine::default();
        assert_eq!(
            input.handle_key(press(KeyCode::Char('n')), false),
            Some(UserAction::NewGame)
        );
        assert_eq!(
            input.handle_key(press(KeyCode::Enter), false),
            Some(UserAction::NewGame)
        );
        assert_eq!(input.handle_key(press(KeyCode::Char('5')), false), None);
    }

    #[test]
    fn test_escape_and_modifiers() {
        let mut input = InputLine::default();
        assert_eq!(
            input.handle_key(press(KeyCode::Esc), true),
            Some(UserAction::Exit)
        );
        let ctrl_m = KeyEvent::new(KeyCode::Char('m'), KeyModifiers::CONTROL);
        assert_eq!(input.handle_key(ctrl_m, true), None);
    }

    #[test]
    fn test_time_colors() {
        assert_eq!(time_color(TimeBand::Plenty), Color::Green);
        assert_eq!(time_color(TimeBand::Low), Color::Yellow);
        assert_eq!(time_color(TimeBand::Critical), Color::Red);
    }

    #[test]
    fn test_rules_panel_lists_every_rule() {
        let mut terminal = Terminal::new(TestBackend::new(60, RULES_HEIGHT)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                TuiInterface::render_rules(f, area);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let rows: Vec<String> = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect()
            })
            .collect();
        assert!(rows[0].contains("How to Play"));
        for (row, rule) in rows[1..].iter().zip(RULES) {
            assert!(row.contains(rule), "missing rule {rule:?} in {row:?}");
        }
    }
}
