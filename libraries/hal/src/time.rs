/// Timing collaborator interfaces
///
/// The control loop measures its own period from a monotonic clock rather
/// than being scheduled at a fixed rate, so the only timing primitives the
/// system needs are a millisecond timestamp and a blocking delay.

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary epoch; wraps on overflow
    fn now_ms(&self) -> u32;
}

/// Blocking delay primitive
pub trait Delay {
    /// Block the caller for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}
