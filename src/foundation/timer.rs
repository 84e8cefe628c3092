use std::time::{Duration, Instant};

/// Format used for completion timestamps in reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Wall-clock stopwatch for one unit of work.
///
/// Elapsed time is measured on the monotonic clock, so it is never negative even if the
/// system clock jumps between `start` and `stop`.
#[derive(Clone, Copy, Debug)]
pub struct Timer {
    started: Instant,
    stopped: Option<Instant>,
}

impl Timer {
    /// Start measuring now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            stopped: None,
        }
    }

    /// Freeze the measurement. Calling `stop` twice keeps the first stop time.
    pub fn stop(&mut self) -> Duration {
        let stopped = *self.stopped.get_or_insert_with(Instant::now);
        stopped.saturating_duration_since(self.started)
    }

    /// Time between `start` and `stop`, or until now if still running.
    pub fn elapsed(&self) -> Duration {
        let end = self.stopped.unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.started)
    }

    /// Current local time formatted with [`TIMESTAMP_FORMAT`].
    pub fn timestamp() -> String {
        chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/timer.rs"]
mod tests;
