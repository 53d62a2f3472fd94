//! Administrative control surface.
//!
//! Commands arrive as events on the same queue as feed messages, so admin
//! mutations are serialized against the single-writer engine state like
//! everything else. Replies travel back over a oneshot channel.

use crate::pause::PauseStatus;
use crate::tally::Tally;
use chrono::{DateTime, Utc};
use presage_core::domain::{ForecastRecord, RoundNumber, Suit};
use presage_core::rules::RuleBAuthorization;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One recorded Rule B imposition, kept for the status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Imposition {
    /// Target round the override applied to.
    pub target_round: RoundNumber,
    /// The imposed suit.
    pub suit: Suit,
    /// When the imposition happened.
    pub at: DateTime<Utc>,
}

/// Administrative commands.
#[derive(Debug, Clone)]
pub enum AdminCommand {
    /// Query current engine state.
    Status,
    /// Set the Rule B trip threshold (rejected below 2).
    SetMirrorThreshold(u32),
    /// Replace the pause duration cycle (rejected if empty or zero entries).
    SetPauseCycle(Vec<Duration>),
    /// Change the periodic summary interval (rejected at zero).
    SetSummaryInterval(Duration),
    /// Emit a forecast immediately, bypassing trigger detection and pause
    /// admission. The single-primary invariant still holds.
    ForceForecast,
    /// Unconditionally release the primary slot.
    ClearPending,
    /// End an active pause early, cancelling its timer.
    ForceResume,
    /// Full reset of all transient engine state.
    Reset,
    /// Publish the win/loss summary now.
    SendSummary,
}

/// Replies to administrative commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AdminReply {
    /// State snapshot for `Status`.
    Status(Box<StatusReport>),
    /// Acknowledgement text for everything else.
    Done(String),
}

/// Snapshot of the engine state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    /// Latest finalized round observed.
    pub current_round: Option<RoundNumber>,
    /// The in-flight forecast record, if any.
    pub pending: Option<ForecastRecord>,
    /// Pause/throttle state.
    pub pause: PauseStatus,
    /// Rule B authorization state.
    pub authorization: RuleBAuthorization,
    /// Most recent Rule B impositions, newest last.
    pub impositions: Vec<Imposition>,
    /// Running win/loss tallies.
    pub tally: Tally,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current_round {
            Some(round) => writeln!(f, "current round: {round}")?,
            None => writeln!(f, "current round: none observed")?,
        }
        match &self.pending {
            Some(record) => writeln!(
                f,
                "pending: {} {} (attempt {}, awaiting {})",
                record.target_round,
                record.suit.display(),
                record.attempt,
                record.expected_check_round(),
            )?,
            None => writeln!(f, "pending: none")?,
        }
        writeln!(
            f,
            "pause: {} (cycle index {}, {} sent since reset)",
            if self.pause.active { "active" } else { "idle" },
            self.pause.cycle_index,
            self.pause.sent_since_reset,
        )?;
        match self.authorization.suit {
            Some(suit) => writeln!(
                f,
                "rule B: {} ({} use(s) remaining)",
                suit.display(),
                self.authorization.uses_remaining,
            )?,
            None => writeln!(f, "rule B: no authorization")?,
        }
        write!(
            f,
            "tally: {} wins / {} losses ({:.1}%)",
            self.tally.wins(),
            self.tally.losses,
            self.tally.win_rate(),
        )
    }
}
