use std::time::{Duration, Instant};

/// Countdown resolution.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Cooperative tick source polled by the front-ends.
///
/// It never fires on its own: callers ask how many whole periods have passed
/// with [`Countdown::drain`] and feed that many ticks to the controller.
/// A disarmed countdown always reports zero.
#[derive(Clone, Debug)]
pub struct Countdown {
    period: Duration,
    anchor: Option<Instant>,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Countdown {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            anchor: None,
        }
    }

    /// Starts counting from `now`, discarding any partial period.
    pub fn arm(&mut self, now: Instant) {
        self.anchor = Some(now);
    }

    pub fn disarm(&mut self) {
        self.anchor = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.anchor.is_some()
    }

    /// Arms or disarms to match `active`, keeping a running anchor untouched.
    pub fn sync(&mut self, active: bool, now: Instant) {
        match (active, self.is_armed()) {
            (true, false) => self.arm(now),
            (false, true) => self.disarm(),
            _ => {}
        }
    }

    /// Returns the whole periods elapsed since the last drain and keeps the remainder.
    pub fn drain(&mut self, now: Instant) -> u32 {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        let elapsed = now.saturating_duration_since(anchor);
        let ticks = (elapsed.as_nanos() / self.period.as_nanos().max(1)) as u32;
        if ticks > 0 {
            self.anchor = Some(anchor + self.period * ticks);
        }
        ticks
    }

    /// Time until the next period completes, for sizing event poll timeouts.
    #[must_use]
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        let anchor = self.anchor?;
        let elapsed = now.saturating_duration_since(anchor);
        let nanos = self.period.as_nanos().max(1);
        let remainder = elapsed.as_nanos() % nanos;
        Some(Duration::from_nanos((nanos - remainder) as u64))
    }
}
