use crate::controller::GameController;
use crate::mode::GameMode;
use crate::session::{SessionView, TargetPicker};
use crate::store::KeyValueStore;
use crate::timer::Countdown;
use std::time::{Duration, Instant};

/// Everything a front-end can ask the controller to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserAction {
    Guess(String),
    Tick,
    NewGame,
    SelectMode(GameMode),
    ToggleTimed,
    Exit,
}

impl UserAction {
    /// Actions that throw away the live session.
    #[must_use]
    pub fn starts_session(&self) -> bool {
        matches!(
            self,
            Self::NewGame | Self::SelectMode(_) | Self::ToggleTimed
        )
    }
}

/// Trait abstracting the game's user interface.
///
/// Implemented by the line-oriented CLI and by the ratatui TUI.
pub trait GameInterface {
    /// Shows the latest state.
    fn render(&mut self, view: &SessionView, best_score: u32);

    /// Waits for the next action.
    ///
    /// `timeout` is how long until the next countdown tick is due; `None`
    /// means no countdown is running. Returning `None` means nothing
    /// actionable happened (timeout, ignored key, rejected command).
    fn next_action(&mut self, timeout: Option<Duration>) -> Option<UserAction>;

    fn display_exit_message(&mut self);
}

/// Runs the game until the interface asks to exit.
///
/// Countdown ticks that came due while waiting for input are applied before
/// the input itself, one at a time.
pub fn game_loop<S, P, I>(controller: &mut GameController<S, P>, interface: &mut I)
where
    S: KeyValueStore,
    P: TargetPicker,
    I: GameInterface + ?Sized,
{
    let mut countdown = Countdown::default();
    countdown.sync(controller.timer_active(), Instant::now());
    interface.render(&controller.view(), controller.best_score());

    loop {
        let action = interface.next_action(countdown.until_next(Instant::now()));

        let mut changed = false;
        for _ in 0..countdown.drain(Instant::now()) {
            changed |= controller.tick();
        }
        countdown.sync(controller.timer_active(), Instant::now());

        let Some(action) = action else {
            if changed {
                interface.render(&controller.view(), controller.best_score());
            }
            continue;
        };

        let restarts = action.starts_session();
        if controller.apply(action).is_break() {
            interface.display_exit_message();
            break;
        }
        if restarts {
            countdown.disarm();
        }
        countdown.sync(controller.timer_active(), Instant::now());
        interface.render(&controller.view(), controller.best_score());
    }
}
