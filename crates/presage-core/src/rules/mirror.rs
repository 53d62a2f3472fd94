//! Rule B: mirror-pair imbalance detection.
//!
//! The four suits form two mirror pairs. On every stats snapshot the detector
//! measures the count difference inside each pair; a pair whose difference
//! reaches the threshold "trips". The weaker member of the most imbalanced
//! tripped pair becomes the authorized override suit, spendable a bounded
//! number of consecutive times before Rule B yields back to Rule A.

use crate::domain::{MirrorSnapshot, Suit};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The two mirror pairs.
pub const MIRROR_PAIRS: [(Suit, Suit); 2] =
    [(Suit::Spade, Suit::Diamond), (Suit::Heart, Suit::Club)];

/// Current Rule B authorization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBAuthorization {
    /// The suit Rule B may impose, if any.
    pub suit: Option<Suit>,
    /// Remaining consecutive uses of the authorized suit.
    pub uses_remaining: u32,
    /// Suit named by the most recent authorization.
    pub last_authorized: Option<Suit>,
}

/// Stateful detector consuming stats snapshots.
#[derive(Debug, Clone)]
pub struct MirrorDetector {
    snapshot: MirrorSnapshot,
    authorization: RuleBAuthorization,
    threshold: u32,
    budget: u32,
}

impl MirrorDetector {
    /// Create a detector with the given trip threshold and use budget.
    pub fn new(threshold: u32, budget: u32) -> Self {
        Self {
            snapshot: MirrorSnapshot::default(),
            authorization: RuleBAuthorization::default(),
            threshold,
            budget,
        }
    }

    /// Latest snapshot seen.
    pub fn snapshot(&self) -> &MirrorSnapshot {
        &self.snapshot
    }

    /// Current authorization state.
    pub fn authorization(&self) -> RuleBAuthorization {
        self.authorization
    }

    /// Currently spendable suit, if the budget allows another use.
    pub fn authorized(&self) -> Option<Suit> {
        (self.authorization.uses_remaining > 0)
            .then_some(self.authorization.suit)
            .flatten()
    }

    /// Change the trip threshold; takes effect on the next snapshot.
    pub fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold;
    }

    /// Consume the entire snapshot, replacing the previous one, and recompute
    /// the authorization.
    pub fn observe(&mut self, snapshot: MirrorSnapshot) {
        self.snapshot = snapshot;

        let mut selected: Option<(Suit, u32)> = None;
        for (a, b) in MIRROR_PAIRS {
            let (ca, cb) = (snapshot.count(a), snapshot.count(b));
            if ca == 0 && cb == 0 {
                // Insufficient data for this pair.
                continue;
            }
            let diff = ca.abs_diff(cb);
            if diff < self.threshold {
                continue;
            }
            let weaker = if ca < cb { a } else { b };
            match selected {
                Some((_, best)) if diff <= best => {}
                _ => selected = Some((weaker, diff)),
            }
        }

        match selected {
            Some((suit, diff)) => {
                // Every fresh snapshot re-authorizes at full budget, same
                // suit or not; the budget only bounds consecutive uses
                // between snapshots.
                self.authorization.uses_remaining = self.budget;
                self.authorization.suit = Some(suit);
                self.authorization.last_authorized = Some(suit);
                debug!(
                    suit = %suit,
                    diff,
                    uses_remaining = self.authorization.uses_remaining,
                    "mirror imbalance authorized an override"
                );
            }
            None => {
                self.authorization.suit = None;
                debug!("no mirror pair tripped; override cleared");
            }
        }
    }

    /// Spend one unit of the budget and return the suit, or `None` when no
    /// authorization is live.
    pub fn consume(&mut self) -> Option<Suit> {
        let suit = self.authorized()?;
        self.authorization.uses_remaining -= 1;
        Some(suit)
    }

    /// Wipe snapshot and authorization (full engine reset).
    pub fn reset(&mut self) {
        self.snapshot = MirrorSnapshot::default();
        self.authorization = RuleBAuthorization::default();
    }
}
