//! Domain types shared by the parser, the rules, and the engine.

mod forecast;
mod suit;

pub use forecast::{ForecastRecord, ForecastState, RuleOrigin};
pub use suit::{MirrorSnapshot, Suit};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Positive integer identifying one round of the observed game.
///
/// Ordering is total; arrival order is monotonic except for feed edits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RoundNumber(pub u32);

impl RoundNumber {
    /// The round immediately after this one.
    pub fn succ(self) -> RoundNumber {
        RoundNumber(self.0 + 1)
    }

    /// The round `k` places after this one.
    pub fn offset(self, k: u8) -> RoundNumber {
        RoundNumber(self.0 + u32::from(k))
    }
}

impl fmt::Display for RoundNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
