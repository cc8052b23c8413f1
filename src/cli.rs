use crate::game_state::{GameInterface, UserAction};
use crate::mode::GameMode;
use crate::session::{SessionView, Status};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

/// Number guessing game
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Difficulty to start with
    #[arg(short, long, value_enum, default_value_t = GameMode::Medium)]
    pub mode: GameMode,

    /// Start with the 60 second countdown enabled
    #[arg(short, long)]
    pub timed: bool,

    /// Use the line-oriented interface instead of the full-screen TUI
    #[arg(short, long)]
    pub plain: bool,

    /// Path of the best-score file
    #[arg(short, long = "store")]
    pub store_path: Option<PathBuf>,

    /// Seed for reproducible targets
    #[arg(long)]
    pub seed: Option<u64>,
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

// UI Input/Output functions

pub enum LineInput {
    Action(UserAction),
    UnknownMode(String),
}

/// Interprets one line: a command, or anything else as a guess.
#[must_use]
pub fn parse_line(line: &str) -> LineInput {
    let line = line.trim();
    let lower = line.to_ascii_lowercase();
    match lower.as_str() {
        "exit" | "quit" => LineInput::Action(UserAction::Exit),
        "new" | "next" => LineInput::Action(UserAction::NewGame),
        "timed" => LineInput::Action(UserAction::ToggleTimed),
        _ => {
            if let Some(name) = lower.strip_prefix("mode ") {
                return match GameMode::from_name(name) {
                    Some(mode) => LineInput::Action(UserAction::SelectMode(mode)),
                    None => LineInput::UnknownMode(name.trim().to_string()),
                };
            }
            LineInput::Action(UserAction::Guess(line.to_string()))
        }
    }
}

pub fn read_action<R: BufRead>(reader: &mut R) -> Option<UserAction> {
    println!("\nEnter your guess (or 'new', 'mode <easy|medium|hard|expert>', 'timed', 'exit'):");
    let mut input = String::new();
    match reader.read_line(&mut input) {
        Ok(0) => return Some(UserAction::Exit),
        Ok(_) => {}
        Err(e) => {
            log::warn!("Failed to read input: {e}");
            return Some(UserAction::Exit);
        }
    }

    match parse_line(&input) {
        LineInput::Action(action) => Some(action),
        LineInput::UnknownMode(name) => {
            println!("Unknown mode '{name}'. Choose easy, medium, hard or expert.");
            None
        }
    }
}

#[must_use]
pub fn format_status(view: &SessionView, best_score: u32) -> String {
    let mut status = format!(
        "[{}] Attempts: {}/{} (remaining {})",
        view.mode.label(),
        view.attempts,
        view.max_attempts,
        view.remaining_attempts()
    );
    if view.timed {
        status.push_str(&format!(" | Time: {}s", view.time_left));
    }
    status.push_str(&format!(" | Score: {} | Best: {best_score}", view.score));
    status
}

#[must_use]
pub fn format_history(view: &SessionView) -> Vec<String> {
    view.recent_history()
        .map(|entry| format!("{:>5}  {}", entry.guess, entry.outcome.label()))
        .collect()
}

pub fn display_view(view: &SessionView, best_score: u32) {
    println!("{}", format_status(view, best_score));
    println!("{}", view.hint);
    if view.status.is_over() {
        display_game_over(view);
    }
}

fn display_game_over(view: &SessionView) {
    if view.status == Status::Won {
        println!("Final score: {}", view.score);
    }
    println!("Recent guesses:");
    for line in format_history(view) {
        println!("{line}");
    }
    println!("Type 'new' to play again or 'exit' to quit.");
}

pub fn display_exit_message() {
    println!("Exiting.");
}

/// CLI implementation of the `GameInterface` trait.
///
/// Reads one line per action. Input blocks, so countdown ticks that came due
/// while the player was typing are applied just before the line.
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn render(&mut self, view: &SessionView, best_score: u32) {
        display_view(view, best_score);
    }

    fn next_action(&mut self, _timeout: Option<Duration>) -> Option<UserAction> {
        read_action(&mut self.reader)
    }

    fn display_exit_message(&mut self) {
        display_exit_message();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FixedPicker, Session};
    use std::io::Cursor;

    fn parsed(line: &str) -> Option<UserAction> {
        match parse_line(line) {
            LineInput::Action(action) => Some(action),
            LineInput::UnknownMode(_) => None,
        }
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["number-guesser"]);
        assert_eq!(cli.mode, GameMode::Medium);
        assert!(!cli.timed);
        assert!(!cli.plain);
        assert_eq!(cli.store_path, None);
        assert_eq!(cli.seed, None);
    }

    #[test]
    fn test_cli_all_flags() {
        let cli = Cli::parse_from([
            "number-guesser",
            "--mode",
            "expert",
            "--timed",
            "--plain",
            "--store",
            "/tmp/best.txt",
            "--seed",
            "42",
        ]);
        assert_eq!(cli.mode, GameMode::Expert);
        assert!(cli.timed);
        assert!(cli.plain);
        assert_eq!(cli.store_path, Some(PathBuf::from("/tmp/best.txt")));
        assert_eq!(cli.seed, Some(42));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["number-guesser", "-m", "impossible"]).is_err());
    }

    #[test]
    fn test_parse_line_commands() {
        assert_eq!(parsed("exit\n"), Some(UserAction::Exit));
        assert_eq!(parsed("QUIT"), Some(UserAction::Exit));
        assert_eq!(parsed("new"), Some(UserAction::NewGame));
        assert_eq!(parsed("  timed  "), Some(UserAction::ToggleTimed));
        assert_eq!(
            parsed("mode Hard"),
            Some(UserAction::SelectMode(GameMode::Hard))
        );
        assert_eq!(parsed("mode nightmare"), None);
    }

    #[test]
    fn test_parse_line_guesses_pass_through() {
        assert_eq!(parsed(" 42 \n"), Some(UserAction::Guess("42".to_string())));
        assert_eq!(parsed("abc"), Some(UserAction::Guess("abc".to_string())));
        assert_eq!(parsed(""), Some(UserAction::Guess(String::new())));
    }

    #[test]
    fn test_read_action_eof_exits() {
        let mut reader = Cursor::new("");
        assert_eq!(read_action(&mut reader), Some(UserAction::Exit));
    }

    #[test]
    fn test_read_action_sequence() {
        let mut reader = Cursor::new("17\nmode bogus\nnew\n");
        assert_eq!(
            read_action(&mut reader),
            Some(UserAction::Guess("17".to_string()))
        );
        assert_eq!(read_action(&mut reader), None);
        assert_eq!(read_action(&mut reader), Some(UserAction::NewGame));
        assert_eq!(read_action(&mut reader), Some(UserAction::Exit));
    }

    #[test]
    fn test_format_status() {
        let mut session = Session::start(GameMode::Medium, true, &mut FixedPicker(50));
        session.submit_guess("10").unwrap();
        session.tick();
        assert_eq!(
            format_status(&session.view(), 900),
            "[Medium (1-100)] Attempts: 1/8 (remaining 7) | Time: 59s | Score: 0 | Best: 900"
        );
    }

    #[test]
    fn test_format_history_newest_first() {
        let mut session = Session::start(GameMode::Medium, false, &mut FixedPicker(50));
        for raw in ["70", "30", "50"] {
            session.submit_guess(raw).unwrap();
        }
        assert_eq!(
            format_history(&session.view()),
            vec![
                "   50  Correct!".to_string(),
                "   30  Too low".to_string(),
                "   70  Too high".to_string(),
            ]
        );
    }
}
