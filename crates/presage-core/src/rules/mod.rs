//! Forecasting rules.
//!
//! Rule A ([`cycle`]) is a pure function over valid round numbers. Rule B
//! ([`mirror`]) is a small state machine fed by the stats channel that can
//! override Rule A under a consecutive-use budget.

pub mod cycle;
pub mod mirror;

pub use cycle::{is_valid_target, next_target_after, suit_for, trigger_target, SUIT_CYCLE};
pub use mirror::{MirrorDetector, RuleBAuthorization, MIRROR_PAIRS};
