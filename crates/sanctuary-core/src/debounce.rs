//! Trailing-edge debouncer
//!
//! Owns its pending value and deadline; callers feed it timestamps from
//! whatever clock drives them (frame time in the scene, plain durations in
//! tests).

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Duration)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending value and restart the quiet period at `now`
    pub fn schedule(&mut self, value: T, now: Duration) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the pending value once its deadline has passed.
    ///
    /// The deadline itself is exclusive: a value scheduled with zero delay is
    /// only handed out by a poll at a later tick, so everything scheduled
    /// during one tick coalesces into the last value.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now > *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_last_value_wins() {
        let mut debouncer = Debouncer::new(Duration::ZERO);
        debouncer.schedule(1, ms(0));
        debouncer.schedule(2, ms(0));
        debouncer.schedule(3, ms(0));
        assert_eq!(debouncer.poll(ms(16)), Some(3));
        assert_eq!(debouncer.poll(ms(32)), None);
    }

    #[test]
    fn test_zero_delay_fires_on_next_tick() {
        let mut debouncer = Debouncer::new(Duration::ZERO);
        debouncer.schedule((800, 600), ms(16));
        assert_eq!(debouncer.poll(ms(16)), None);
        debouncer.schedule((1024, 768), ms(16));
        assert_eq!(debouncer.poll(ms(33)), Some((1024, 768)));
    }

    #[test]
    fn test_waits_for_quiet_period() {
        let mut debouncer = Debouncer::new(ms(100));
        debouncer.schedule("a", ms(0));
        assert_eq!(debouncer.poll(ms(50)), None);

        // Rescheduling pushes the deadline out again
        debouncer.schedule("b", ms(60));
        assert_eq!(debouncer.poll(ms(120)), None);
        assert_eq!(debouncer.poll(ms(160)), None);
        assert_eq!(debouncer.poll(ms(161)), Some("b"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut debouncer = Debouncer::new(Duration::ZERO);
        debouncer.schedule(7, ms(0));
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert_eq!(debouncer.poll(ms(10)), None);
    }
}
