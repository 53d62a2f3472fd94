//! Rule A: the fixed 8-entry suit cycle.
//!
//! A round number is a valid target when it is even, lies in
//! `[FIRST_TARGET, LAST_TARGET]`, and is not a multiple of ten. Valid targets
//! are counted from the start of the range; that count, minus one, modulo
//! eight, indexes [`SUIT_CYCLE`]. Cheap enough to recompute per call.

use crate::domain::{RoundNumber, Suit};

/// The repeating suit sequence underlying Rule A.
pub const SUIT_CYCLE: [Suit; 8] = [
    Suit::Heart,
    Suit::Diamond,
    Suit::Club,
    Suit::Spade,
    Suit::Diamond,
    Suit::Heart,
    Suit::Spade,
    Suit::Club,
];

/// First valid target round (cycle index 0).
pub const FIRST_TARGET: u32 = 6;
/// Last valid target round.
pub const LAST_TARGET: u32 = 1436;

/// Whether a round number is in Rule A's domain.
pub fn is_valid_target(round: RoundNumber) -> bool {
    let r = round.0;
    (FIRST_TARGET..=LAST_TARGET).contains(&r) && r % 2 == 0 && r % 10 != 0
}

/// Deterministic suit for a valid target round; `None` outside the domain.
pub fn suit_for(round: RoundNumber) -> Option<Suit> {
    if !is_valid_target(round) {
        return None;
    }
    let valid_count = (FIRST_TARGET..=round.0)
        .step_by(2)
        .filter(|n| n % 10 != 0)
        .count();
    Some(SUIT_CYCLE[(valid_count - 1) % 8])
}

/// Target round for a trigger, if the given round is one.
///
/// A round triggers exactly when its arithmetic successor is a valid target.
pub fn trigger_target(round: RoundNumber) -> Option<RoundNumber> {
    let target = round.succ();
    is_valid_target(target).then_some(target)
}

/// First valid target strictly after the given round. Used by the
/// force-forecast admin operation, which bypasses trigger detection.
pub fn next_target_after(round: RoundNumber) -> Option<RoundNumber> {
    let mut candidate = round.0 + 1;
    while candidate <= LAST_TARGET {
        let c = RoundNumber(candidate);
        if is_valid_target(c) {
            return Some(c);
        }
        candidate += 1;
    }
    None
}
