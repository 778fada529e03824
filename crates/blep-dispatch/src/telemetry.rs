//! Telemetry utilities for command timing.

use std::time::Instant;
use tracing::debug;

/// Guard for timing command execution.
///
/// Logs the command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        debug!(command = %self.command, elapsed_ms, "Command finished");
    }
}
