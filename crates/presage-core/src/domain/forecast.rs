//! The active forecast record and its lifecycle states.

use super::{RoundNumber, Suit};
use crate::effects::MessageHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which rule produced a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleOrigin {
    /// Rule A: the fixed 8-entry suit cycle.
    Cycle,
    /// Rule B: a mirror-pair imbalance authorization.
    Mirror,
}

/// Lifecycle state of a forecast record.
///
/// `Pending` moves to `Won` on a hit, to `Pending` with a higher attempt on a
/// miss with retries remaining, and to `Lost` when the ladder is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastState {
    /// Awaiting a finalized result for `target_round + attempt`.
    Pending,
    /// The forecast suit appeared at the given attempt index.
    Won {
        /// Attempt index (0..=max_retries) at which the suit appeared.
        attempt: u8,
    },
    /// All attempts missed.
    Lost,
}

/// The single in-flight forecast.
///
/// Invariant: at most one record exists in state `Pending`; it occupies the
/// primary slot until a terminal transition releases it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Round the forecast predicts an outcome for.
    pub target_round: RoundNumber,
    /// The forecast suit.
    pub suit: Suit,
    /// Round whose arrival triggered the forecast.
    pub base_round: RoundNumber,
    /// Retry ladder position, 0 for the primary announcement.
    pub attempt: u8,
    /// Which rule chose the suit.
    pub origin: RuleOrigin,
    /// Current lifecycle state.
    pub state: ForecastState,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Handle of the outbound announcement, if delivery succeeded.
    pub message_handle: Option<MessageHandle>,
}

impl ForecastRecord {
    /// Create a fresh primary record in the `Pending` state.
    pub fn new(
        target_round: RoundNumber,
        suit: Suit,
        base_round: RoundNumber,
        origin: RuleOrigin,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            target_round,
            suit,
            base_round,
            attempt: 0,
            origin,
            state: ForecastState::Pending,
            created_at,
            message_handle: None,
        }
    }

    /// Round whose finalized result decides the current attempt.
    pub fn expected_check_round(&self) -> RoundNumber {
        self.target_round.offset(self.attempt)
    }
}
