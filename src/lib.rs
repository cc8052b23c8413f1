// Library interface for number-guesser
// This allows integration tests to access internal modules

pub mod cli;
pub mod controller;
pub mod game_state;
pub mod logging;
pub mod mode;
pub mod session;
pub mod store;
pub mod timer;
pub mod tui;

// Re-export commonly used items for easier testing
pub use controller::GameController;
pub use game_state::{GameInterface, UserAction, game_loop};
pub use mode::GameMode;
pub use session::{
    FixedPicker, GuessEntry, GuessError, Hint, Outcome, RandomPicker, Session, SessionView,
    Status, TargetPicker, compute_score,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, load_best_score};
