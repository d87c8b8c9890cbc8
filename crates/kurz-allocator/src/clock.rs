use jiff::Timestamp;

pub trait Clock: Send + Sync {
    /// Returns the current time of the clock
    fn now(&self) -> Timestamp;

    /// Microseconds since the Unix epoch, clamped to zero for times before it.
    fn now_micros(&self) -> u64 {
        u64::try_from(self.now().as_microsecond()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
