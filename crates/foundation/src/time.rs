/// Monotonic timestamp in milliseconds.
///
/// The engine never reads a clock itself; callers pass `Millis` in so timing
/// logic can be driven deterministically from tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Millis(pub u64);

impl Millis {
    pub fn saturating_add(self, delta_ms: u64) -> Self {
        Millis(self.0.saturating_add(delta_ms))
    }

    pub fn saturating_since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}
