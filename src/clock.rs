//! Elapsed-time source for the render loop.

use std::time::Duration;
use web_time::Instant;

#[derive(Clone, Debug)]
enum Source {
    Monotonic(Instant),
    Manual(Duration),
}

/// A clock measuring the time elapsed since it was started.
///
/// The clock is started once and never reset. A manual clock only moves when
/// [`Clock::advance`] is called, which makes frame-by-frame stepping
/// deterministic.
#[derive(Clone, Debug)]
pub struct Clock {
    source: Source,
}

impl Clock {
    /// Starts a clock backed by the system's monotonic timer.
    pub fn start() -> Self {
        Self {
            source: Source::Monotonic(Instant::now()),
        }
    }

    /// Creates a clock frozen at zero that only moves through [`Clock::advance`].
    pub fn manual() -> Self {
        Self {
            source: Source::Manual(Duration::ZERO),
        }
    }

    /// Whether this clock is driven by [`Clock::advance`].
    pub fn is_manual(&self) -> bool {
        matches!(self.source, Source::Manual(_))
    }

    /// Time elapsed since the clock started.
    pub fn elapsed(&self) -> Duration {
        match &self.source {
            Source::Monotonic(start) => start.elapsed(),
            Source::Manual(elapsed) => *elapsed,
        }
    }

    /// Time elapsed since the clock started, in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Moves a manual clock forward by `dt`.
    ///
    /// Monotonic clocks follow real time and ignore this call.
    pub fn advance(&mut self, dt: Duration) {
        match &mut self.source {
            Source::Manual(elapsed) => *elapsed += dt,
            Source::Monotonic(_) => log::warn!("Ignoring advance() on a monotonic clock."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let mut clock = Clock::manual();
        assert_eq!(clock.elapsed_secs(), 0.0);
        clock.advance(Duration::from_millis(2500));
        clock.advance(Duration::from_millis(7500));
        assert_eq!(clock.elapsed_secs(), 10.0);
    }

    #[test]
    fn monotonic_clock_never_goes_back() {
        let clock = Clock::start();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(b >= a);
        assert!(!clock.is_manual());
    }
}
