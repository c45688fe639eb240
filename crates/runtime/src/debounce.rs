use foundation::time::Millis;

/// Trailing-edge debouncer driven by caller-supplied time.
///
/// Every [`Debouncer::trigger`] (re)arms the timer; [`Debouncer::poll`] fires
/// at most once, and only after `delay_ms` has elapsed since the latest
/// trigger. Intermediate triggers never fire.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: u64,
    deadline: Option<Millis>,
    generation: u64,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
            generation: 0,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Cancel any pending timer and restart it from `now`.
    ///
    /// Returns the generation of the armed timer, which callers driving a real
    /// sleep can compare against [`Debouncer::generation`] once they wake.
    pub fn trigger(&mut self, now: Millis) -> u64 {
        self.generation += 1;
        self.deadline = Some(now.saturating_add(self.delay_ms));
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending timer would fire, if any.
    pub fn deadline(&self) -> Option<Millis> {
        self.deadline
    }

    /// Returns `true` exactly once per quiet period, when `now` has reached the deadline.
    pub fn poll(&mut self, now: Millis) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
