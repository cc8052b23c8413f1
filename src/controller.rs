//! Session controller.
//!
//! Owns the live [`Session`], the best-score store and the target picker.
//! Every mutation goes through [`GameController::apply`] so user input and
//! countdown ticks are applied strictly one after the other.

use crate::game_state::UserAction;
use crate::mode::GameMode;
use crate::session::{GuessError, GuessReport, Session, SessionView, Status, TargetPicker};
use crate::store::{KeyValueStore, load_best_score, save_best_score};
use std::ops::ControlFlow;

pub struct GameController<S: KeyValueStore, P: TargetPicker> {
    session: Session,
    store: S,
    picker: P,
    best_score: u32,
}

impl<S: KeyValueStore, P: TargetPicker> GameController<S, P> {
    /// Reads the best score once and starts the first session.
    pub fn new(store: S, mut picker: P, mode: GameMode, timed: bool) -> Self {
        let best_score = load_best_score(&store);
        log::info!("Loaded best score {best_score}");
        let session = Session::start(mode, timed, &mut picker);
        log::info!("Started {mode} session (timed: {timed})");
        Self {
            session,
            store,
            picker,
            best_score,
        }
    }

    /// Replaces the live session with a fresh one.
    pub fn start_session(&mut self, mode: GameMode, timed: bool) {
        self.session = Session::start(mode, timed, &mut self.picker);
        log::info!("Started {mode} session (timed: {timed})");
    }

    pub fn new_game(&mut self) {
        self.start_session(self.session.mode(), self.session.timed());
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        self.start_session(mode, self.session.timed());
    }

    pub fn set_timed(&mut self, timed: bool) {
        self.start_session(self.session.mode(), timed);
    }

    pub fn submit_guess(&mut self, raw: &str) -> Result<GuessReport, GuessError> {
        let result = self.session.submit_guess(raw);
        match &result {
            Ok(report) => match report.status {
                Status::Won => {
                    log::info!(
                        "Won in {} attempts with score {}",
                        self.session.attempts(),
                        report.score
                    );
                    self.record_score(report.score);
                }
                Status::Lost => log::info!("Lost after {} attempts", self.session.attempts()),
                Status::Playing => log::debug!("Guess {} was {:?}", report.guess, report.outcome),
            },
            Err(e) => log::debug!("Rejected guess: {e}"),
        }
        result
    }

    fn record_score(&mut self, score: u32) {
        if score <= self.best_score {
            return;
        }
        log::info!("New best score {score} (was {})", self.best_score);
        self.best_score = score;
        if let Err(e) = save_best_score(&mut self.store, score) {
            log::warn!("Could not persist best score: {e}");
        }
    }

    /// One countdown second. Returns false when the session ignored it.
    pub fn tick(&mut self) -> bool {
        let changed = self.session.tick();
        if changed && self.session.status() == Status::Lost {
            log::info!("Time ran out after {} attempts", self.session.attempts());
        }
        changed
    }

    /// Whether the countdown should be running for the live session.
    #[must_use]
    pub fn timer_active(&self) -> bool {
        self.session.can_tick()
    }

    /// Applies one event. `Break` means the player asked to quit.
    pub fn apply(&mut self, action: UserAction) -> ControlFlow<()> {
        match action {
            UserAction::Guess(raw) => {
                // Rejections are already reflected in the session's hint.
                let _ = self.submit_guess(&raw);
            }
            UserAction::Tick => {
                self.tick();
            }
            UserAction::NewGame => self.new_game(),
            UserAction::SelectMode(mode) => self.set_mode(mode),
            UserAction::ToggleTimed => self.set_timed(!self.session.timed()),
            UserAction::Exit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FixedPicker, Hint, TIME_LIMIT_SECS};
    use crate::store::{BEST_SCORE_KEY, MemoryStore, StoreError};

    fn controller(target: u32) -> GameController<MemoryStore, FixedPicker> {
        GameController::new(
            MemoryStore::new(),
            FixedPicker(target),
            GameMode::Medium,
            false,
        )
    }

    fn stored_best(controller: &GameController<MemoryStore, FixedPicker>) -> Option<String> {
        controller.store().get(BEST_SCORE_KEY).unwrap()
    }

    #[test]
    fn test_reads_best_score_at_start() {
        let store = MemoryStore::with_entry(BEST_SCORE_KEY, "700");
        let controller = GameController::new(store, FixedPicker(1), GameMode::Easy, false);
        assert_eq!(controller.best_score(), 700);
    }

    #[test]
    fn test_win_records_new_best() {
        let mut controller = controller(42);
        controller.submit_guess("42").unwrap();
        assert_eq!(controller.best_score(), 950);
        assert_eq!(stored_best(&controller), Some("950".to_string()));
    }

    #[test]
    fn test_lower_score_keeps_best() {
        let mut controller = controller(42);
        controller.submit_guess("42").unwrap();

        controller.new_game();
        for raw in ["1", "2", "42"] {
            controller.submit_guess(raw).unwrap();
        }
        assert_eq!(controller.session().score(), 850);
        assert_eq!(controller.best_score(), 950);
        assert_eq!(stored_best(&controller), Some("950".to_string()));
    }

    /// Counts writes so tests can tell a rewrite of the same value apart.
    struct CountingStore {
        inner: MemoryStore,
        writes: usize,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.writes += 1;
            self.inner.set(key, value)
        }
    }

    fn counting_controller(best: u32) -> GameController<CountingStore, FixedPicker> {
        let store = CountingStore {
            inner: MemoryStore::with_entry(BEST_SCORE_KEY, &best.to_string()),
            writes: 0,
        };
        GameController::new(store, FixedPicker(5), GameMode::Medium, false)
    }

    #[test]
    fn test_equal_score_does_not_write() {
        let mut controller = counting_controller(950);
        controller.submit_guess("5").unwrap();
        assert_eq!(controller.session().score(), 950);
        assert_eq!(controller.best_score(), 950);
        assert_eq!(controller.store().writes, 0);
    }

    #[test]
    fn test_higher_score_writes_once() {
        let mut controller = counting_controller(900);
        controller.submit_guess("5").unwrap();
        assert_eq!(controller.best_score(), 950);
        assert_eq!(controller.store().writes, 1);
        assert_eq!(
            controller.store().get(BEST_SCORE_KEY).unwrap(),
            Some("950".to_string())
        );
    }

    #[test]
    fn test_loss_never_touches_store() {
        let mut controller = controller(100);
        for _ in 0..GameMode::Medium.max_attempts() {
            controller.submit_guess("1").unwrap();
        }
        assert_eq!(controller.session().status(), Status::Lost);
        assert_eq!(stored_best(&controller), None);
    }

    #[test]
    fn test_mode_and_timed_changes_restart() {
        let mut controller = controller(10);
        controller.submit_guess("20").unwrap();

        assert!(controller.apply(UserAction::SelectMode(GameMode::Hard)).is_continue());
        assert_eq!(controller.session().mode(), GameMode::Hard);
        assert_eq!(controller.session().attempts(), 0);

        controller.submit_guess("20").unwrap();
        assert!(controller.apply(UserAction::ToggleTimed).is_continue());
        assert!(controller.session().timed());
        assert_eq!(controller.session().attempts(), 0);
        assert_eq!(controller.session().time_left(), TIME_LIMIT_SECS);
        assert!(controller.timer_active());

        assert!(controller.apply(UserAction::ToggleTimed).is_continue());
        assert!(!controller.timer_active());
    }

    #[test]
    fn test_apply_guess_and_invalid_input() {
        let mut controller = controller(50);
        assert!(controller.apply(UserAction::Guess("nope".to_string())).is_continue());
        assert_eq!(controller.session().attempts(), 0);
        assert_eq!(*controller.session().hint(), Hint::InvalidInput);

        assert!(controller.apply(UserAction::Guess("50".to_string())).is_continue());
        assert_eq!(controller.session().status(), Status::Won);
    }

    #[test]
    fn test_apply_exit_breaks() {
        let mut controller = controller(50);
        assert!(controller.apply(UserAction::Exit).is_break());
    }

    #[test]
    fn test_timer_stops_when_time_runs_out() {
        let mut controller = controller(50);
        controller.set_timed(true);
        for _ in 0..TIME_LIMIT_SECS {
            assert!(controller.tick());
        }
        assert_eq!(controller.session().status(), Status::Lost);
        assert!(!controller.timer_active());
        assert!(!controller.tick());
    }

    #[test]
    fn test_timer_stops_after_win() {
        let mut controller = controller(50);
        controller.set_timed(true);
        assert!(controller.apply(UserAction::Tick).is_continue());
        assert!(controller.apply(UserAction::Guess("50".to_string())).is_continue());
        assert!(!controller.timer_active());
        assert_eq!(controller.session().time_left(), TIME_LIMIT_SECS - 1);
        assert_eq!(controller.best_score(), 1000 - 50 - 5);
    }
}
