//! Pause/throttle manager.
//!
//! Counts forecasts since the last reset and, once the burst threshold is
//! reached, refuses the next admission and starts a pause whose duration
//! comes from a rotating cycle. The manager is a synchronous state machine;
//! the runtime owns the actual sleep task and posts a `PauseElapsed` event
//! back through the queue when it fires.
//!
//! Every pause start bumps a generation counter and the timer event carries
//! it, so a cancelled pause can never be ended by its stale timer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Instruction to the runtime to start a pause timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseStart {
    /// How long the pause lasts.
    pub duration: Duration,
    /// Generation tag the completion event must carry.
    pub generation: u64,
}

/// Outcome of an admission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The forecast may proceed.
    Admit,
    /// A pause is already active; the trigger is dropped.
    Refuse,
    /// The burst threshold was reached: the trigger is dropped and a pause
    /// begins. The runtime must arm the timer described here.
    BeginPause(PauseStart),
}

/// Serializable view of the pause state for status reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PauseStatus {
    /// Whether a pause is currently active.
    pub active: bool,
    /// When the active pause ends, if one is active.
    pub resume_at: Option<DateTime<Utc>>,
    /// Index of the next cycle entry to be consumed.
    pub cycle_index: usize,
    /// Forecasts sent since the counter was last reset.
    pub sent_since_reset: u32,
}

/// The throttle state machine.
#[derive(Debug, Clone)]
pub struct PauseManager {
    cycle: Vec<Duration>,
    cycle_index: usize,
    burst_threshold: u32,
    sent_since_reset: u32,
    active: bool,
    resume_at: Option<DateTime<Utc>>,
    generation: u64,
}

impl PauseManager {
    /// Create a manager over a non-empty cycle of pause durations.
    pub fn new(cycle: Vec<Duration>, burst_threshold: u32) -> Self {
        debug_assert!(!cycle.is_empty());
        Self {
            cycle,
            cycle_index: 0,
            burst_threshold,
            sent_since_reset: 0,
            active: false,
            resume_at: None,
            generation: 0,
        }
    }

    /// Decide whether a forecast may be emitted right now.
    pub fn admit(&mut self, now: DateTime<Utc>) -> Admission {
        if self.active {
            return Admission::Refuse;
        }
        if self.sent_since_reset >= self.burst_threshold {
            let duration = self.cycle[self.cycle_index];
            self.cycle_index = (self.cycle_index + 1) % self.cycle.len();
            self.sent_since_reset = 0;
            self.active = true;
            self.generation += 1;
            // resume_at is informational; an unrepresentable duration leaves
            // it unset rather than wrapping.
            self.resume_at = chrono::Duration::from_std(duration)
                .ok()
                .and_then(|d| now.checked_add_signed(d));
            info!(?duration, generation = self.generation, "burst threshold reached, pausing");
            return Admission::BeginPause(PauseStart {
                duration,
                generation: self.generation,
            });
        }
        Admission::Admit
    }

    /// Count one successfully emitted forecast.
    pub fn record_forecast_sent(&mut self) {
        self.sent_since_reset += 1;
    }

    /// Handle a timer completion. Returns true when it ended the live pause;
    /// stale generations are ignored.
    pub fn pause_elapsed(&mut self, generation: u64) -> bool {
        if !self.active || generation != self.generation {
            return false;
        }
        self.active = false;
        self.resume_at = None;
        self.sent_since_reset = 0;
        // The cycle index keeps rotating; completion does not rewind it.
        true
    }

    /// End an active pause early. Returns true when there was one to end.
    /// Invalidates the pending timer's generation so its completion is inert.
    pub fn force_resume(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.generation += 1;
        self.active = false;
        self.resume_at = None;
        self.sent_since_reset = 0;
        true
    }

    /// Replace the duration cycle. The index restarts from the front.
    pub fn set_cycle(&mut self, cycle: Vec<Duration>) {
        debug_assert!(!cycle.is_empty());
        self.cycle = cycle;
        self.cycle_index = 0;
    }

    /// Full-reset semantics: clear the counter and any active pause. The
    /// cycle index is preserved across resets.
    pub fn reset(&mut self) {
        self.sent_since_reset = 0;
        if self.active {
            self.generation += 1;
            self.active = false;
            self.resume_at = None;
        }
    }

    /// Whether a pause is currently active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current generation, for test assertions.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Snapshot for the status report.
    pub fn status(&self) -> PauseStatus {
        PauseStatus {
            active: self.active,
            resume_at: self.resume_at,
            cycle_index: self.cycle_index,
            sent_since_reset: self.sent_since_reset,
        }
    }
}
