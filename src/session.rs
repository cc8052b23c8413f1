//! Game session state machine.
//!
//! A [`Session`] is one play-through: it holds the secret target, the attempt
//! counter, the guess history and the countdown. It reacts to two events,
//! [`Session::submit_guess`] and [`Session::tick`], and never leaves the
//! terminal `Won`/`Lost` states. A new game always builds a fresh session.

use crate::mode::GameMode;
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Length of the timed-mode countdown in seconds.
pub const TIME_LIMIT_SECS: u32 = 60;
/// How many history entries the presentation shows.
pub const RECENT_HISTORY_LEN: usize = 8;

const BASE_SCORE: i64 = 1000;
const ATTEMPT_PENALTY: i64 = 50;
const SECOND_PENALTY: i64 = 5;
const VERY_CLOSE_DISTANCE: u32 = 5;
const WARM_DISTANCE: u32 = 15;
const PLENTY_OF_TIME_SECS: u32 = 20;
const LOW_TIME_SECS: u32 = 10;

/// Source of secret targets. Every value of the range must be equally likely.
pub trait TargetPicker {
    fn pick(&mut self, range: RangeInclusive<u32>) -> u32;
}

impl<T: TargetPicker + ?Sized> TargetPicker for Box<T> {
    fn pick(&mut self, range: RangeInclusive<u32>) -> u32 {
        (**self).pick(range)
    }
}

/// Uniform picker backed by any `rand` generator.
#[derive(Debug)]
pub struct RandomPicker<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomPicker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomPicker<ThreadRng> {
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl RandomPicker<StdRng> {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TargetPicker for RandomPicker<R> {
    fn pick(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.rng.gen_range(range)
    }
}

/// Always picks the same value, clamped into the requested range.
#[derive(Clone, Copy, Debug)]
pub struct FixedPicker(pub u32);

impl TargetPicker for FixedPicker {
    fn pick(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.0.clamp(*range.start(), *range.end())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

impl Status {
    #[must_use]
    pub fn is_over(self) -> bool {
        !matches!(self, Self::Playing)
    }
}

/// Result of comparing one valid guess against the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    TooLow,
    TooHigh,
}

impl Outcome {
    #[must_use]
    pub fn compare(guess: u32, target: u32) -> Self {
        match guess.cmp(&target) {
            std::cmp::Ordering::Equal => Self::Correct,
            std::cmp::Ordering::Less => Self::TooLow,
            std::cmp::Ordering::Greater => Self::TooHigh,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Correct => "Correct!",
            Self::TooLow => "Too low",
            Self::TooHigh => "Too high",
        }
    }
}

/// Proximity band of a wrong guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    VeryClose,
    Warm,
    Cold,
}

impl Tier {
    #[must_use]
    pub fn for_distance(distance: u32) -> Self {
        if distance <= VERY_CLOSE_DISTANCE {
            Self::VeryClose
        } else if distance <= WARM_DISTANCE {
            Self::Warm
        } else {
            Self::Cold
        }
    }
}

/// Which way the next guess should move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Higher,
    Lower,
}

/// The message shown to the player after each event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hint {
    Welcome { min: u32, max: u32 },
    InvalidInput,
    Proximity { tier: Tier, direction: Direction },
    Won { attempts: u32 },
    Lost { target: u32 },
    TimeUp,
}

impl Hint {
    /// Hint for a wrong guess, banded by distance from the target.
    #[must_use]
    pub fn proximity(guess: u32, target: u32) -> Self {
        let direction = if guess < target {
            Direction::Higher
        } else {
            Direction::Lower
        };
        Self::Proximity {
            tier: Tier::for_distance(guess.abs_diff(target)),
            direction,
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome { min, max } => {
                write!(f, "I'm thinking of a number between {min} and {max}!")
            }
            Self::InvalidInput => f.write_str("Please enter a valid number within the range!"),
            Self::Proximity { tier, direction } => {
                let text = match (tier, direction) {
                    (Tier::VeryClose, Direction::Higher) => "Very close! Try higher!",
                    (Tier::VeryClose, Direction::Lower) => "Very close! Try lower!",
                    (Tier::Warm, Direction::Higher) => "Getting warm! Try higher!",
                    (Tier::Warm, Direction::Lower) => "Getting warm! Try lower!",
                    (Tier::Cold, Direction::Higher) => "Too low! Try higher!",
                    (Tier::Cold, Direction::Lower) => "Too high! Try lower!",
                };
                f.write_str(text)
            }
            Self::Won { attempts } => {
                write!(f, "Congratulations! You guessed it in {attempts} attempts!")
            }
            Self::Lost { target } => {
                write!(f, "Game over! The number was {target}. Try again!")
            }
            Self::TimeUp => f.write_str("Time's up! Try again."),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuessEntry {
    pub guess: u32,
    pub outcome: Outcome,
}

/// Rejected guess. Neither kind counts against the attempt budget.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuessError {
    #[error("'{input}' is not a number between {min} and {max}")]
    Invalid { input: String, min: u32, max: u32 },
    #[error("the game is already over")]
    Finished,
}

/// What a valid guess did to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuessReport {
    pub guess: u32,
    pub outcome: Outcome,
    pub status: Status,
    pub score: u32,
}

/// Score of a win: `max(0, 1000 - attempts*50 - timed penalty)`.
#[must_use]
pub fn compute_score(attempts: u32, timed: bool, time_left: u32) -> u32 {
    let penalty = if timed {
        i64::from(TIME_LIMIT_SECS.saturating_sub(time_left)) * SECOND_PENALTY
    } else {
        0
    };
    let score = BASE_SCORE - i64::from(attempts) * ATTEMPT_PENALTY - penalty;
    u32::try_from(score.max(0)).unwrap_or(0)
}

fn parse_guess(raw: &str, mode: GameMode) -> Result<u32, GuessError> {
    let invalid = || GuessError::Invalid {
        input: raw.trim().to_string(),
        min: mode.min(),
        max: mode.max(),
    };
    let value: i64 = raw.trim().parse().map_err(|_| invalid())?;
    u32::try_from(value)
        .ok()
        .filter(|v| mode.range().contains(v))
        .ok_or_else(invalid)
}

#[derive(Clone, Debug)]
pub struct Session {
    target: u32,
    mode: GameMode,
    timed: bool,
    attempts: u32,
    status: Status,
    score: u32,
    time_left: u32,
    history: Vec<GuessEntry>,
    hint: Hint,
}

impl Session {
    /// Starts a fresh session with a target drawn from the mode's range.
    pub fn start<P: TargetPicker + ?Sized>(mode: GameMode, timed: bool, picker: &mut P) -> Self {
        let target = picker.pick(mode.range());
        Self {
            target,
            mode,
            timed,
            attempts: 0,
            status: Status::Playing,
            score: 0,
            time_left: if timed { TIME_LIMIT_SECS } else { 0 },
            history: Vec::new(),
            hint: Hint::Welcome {
                min: mode.min(),
                max: mode.max(),
            },
        }
    }

    /// Evaluates one raw guess.
    ///
    /// Invalid input only replaces the hint. A valid guess consumes an
    /// attempt, is appended to the history and may end the game.
    pub fn submit_guess(&mut self, raw: &str) -> Result<GuessReport, GuessError> {
        if self.status.is_over() {
            return Err(GuessError::Finished);
        }
        let guess = match parse_guess(raw, self.mode) {
            Ok(guess) => guess,
            Err(e) => {
                self.hint = Hint::InvalidInput;
                return Err(e);
            }
        };

        self.attempts += 1;
        let outcome = Outcome::compare(guess, self.target);
        self.history.push(GuessEntry { guess, outcome });

        if outcome == Outcome::Correct {
            self.status = Status::Won;
            self.score = compute_score(self.attempts, self.timed, self.time_left);
            self.hint = Hint::Won {
                attempts: self.attempts,
            };
        } else if self.attempts >= self.mode.max_attempts() {
            self.status = Status::Lost;
            self.hint = Hint::Lost {
                target: self.target,
            };
        } else {
            self.hint = Hint::proximity(guess, self.target);
        }

        Ok(GuessReport {
            guess,
            outcome,
            status: self.status,
            score: self.score,
        })
    }

    /// Whether a countdown tick would change this session.
    #[must_use]
    pub fn can_tick(&self) -> bool {
        self.timed && self.status == Status::Playing && self.time_left > 0
    }

    /// Advances the countdown by one second. Returns false when nothing changed.
    pub fn tick(&mut self) -> bool {
        if !self.can_tick() {
            return false;
        }
        self.time_left -= 1;
        if self.time_left == 0 {
            self.status = Status::Lost;
            self.hint = Hint::TimeUp;
        }
        true
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn timed(&self) -> bool {
        self.timed
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    #[must_use]
    pub fn history(&self) -> &[GuessEntry] {
        &self.history
    }

    #[must_use]
    pub fn hint(&self) -> &Hint {
        &self.hint
    }

    /// Snapshot for presentation; the target stays hidden while playing.
    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView {
            mode: self.mode,
            timed: self.timed,
            attempts: self.attempts,
            max_attempts: self.mode.max_attempts(),
            status: self.status,
            score: self.score,
            time_left: self.time_left,
            history: self.history.clone(),
            hint: self.hint.clone(),
            target: self.status.is_over().then_some(self.target),
        }
    }
}

/// Countdown urgency, used to colour the timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeBand {
    Plenty,
    Low,
    Critical,
}

/// Read-only copy of a session handed to the front-ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionView {
    pub mode: GameMode,
    pub timed: bool,
    pub attempts: u32,
    pub max_attempts: u32,
    pub status: Status,
    pub score: u32,
    pub time_left: u32,
    pub history: Vec<GuessEntry>,
    pub hint: Hint,
    pub target: Option<u32>,
}

impl SessionView {
    #[must_use]
    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    #[must_use]
    pub fn attempts_percent(&self) -> u16 {
        if self.max_attempts == 0 {
            return 0;
        }
        u16::try_from(self.attempts * 100 / self.max_attempts).unwrap_or(100)
    }

    #[must_use]
    pub fn time_percent(&self) -> u16 {
        if !self.timed {
            return 100;
        }
        u16::try_from(self.time_left * 100 / TIME_LIMIT_SECS).unwrap_or(100)
    }

    #[must_use]
    pub fn time_band(&self) -> TimeBand {
        if self.time_left > PLENTY_OF_TIME_SECS {
            TimeBand::Plenty
        } else if self.time_left > LOW_TIME_SECS {
            TimeBand::Low
        } else {
            TimeBand::Critical
        }
    }

    /// The most recent guesses, newest first.
    pub fn recent_history(&self) -> impl Iterator<Item = &GuessEntry> {
        self.history.iter().rev().take(RECENT_HISTORY_LEN)
    }

    #[must_use]
    pub fn celebrating(&self) -> bool {
        self.status == Status::Won
    }
}
