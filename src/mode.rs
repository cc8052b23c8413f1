use clap::ValueEnum;
use std::fmt;
use std::ops::RangeInclusive;

/// Difficulty preset fixing the guess range and the attempt budget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum GameMode {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Expert];

    #[must_use]
    pub fn range(self) -> RangeInclusive<u32> {
        match self {
            Self::Easy => 1..=50,
            Self::Medium => 1..=100,
            Self::Hard => 1..=200,
            Self::Expert => 1..=500,
        }
    }

    #[must_use]
    pub fn min(self) -> u32 {
        *self.range().start()
    }

    #[must_use]
    pub fn max(self) -> u32 {
        *self.range().end()
    }

    #[must_use]
    pub fn max_attempts(self) -> u32 {
        match self {
            Self::Easy => 10,
            Self::Medium => 8,
            Self::Hard => 6,
            Self::Expert => 5,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy (1-50)",
            Self::Medium => "Medium (1-100)",
            Self::Hard => "Hard (1-200)",
            Self::Expert => "Expert (1-500)",
        }
    }

    /// Parses a mode name as typed on the line front-end.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "expert" => Some(Self::Expert),
            _ => None,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
        };
        f.write_str(name)
    }
}
