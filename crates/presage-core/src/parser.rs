//! Feed message classifier.
//!
//! Turns raw feed text into a tagged [`Inbound`] variant. The grammar is
//! deliberately small and deterministic:
//!
//! - round number: a `#N` tag (case-insensitive), optional whitespace, digits
//! - finalized: the literal `Finalisé` or either of the `🔰` / `✅` glyphs
//! - in-progress: text starting with `⏰`; inert for round-keyed logic
//! - result token set: contents of the first `(...)` following a digit run
//! - stats: up to four `<suit-glyph> : <count>` pairs
//!
//! Suit glyphs arrive in several presentation variants (emoji variation
//! selectors, the heavy heart codepoint); everything is normalized to the
//! canonical glyph before any comparison.

use crate::domain::{MirrorSnapshot, RoundNumber, Suit};
use once_cell::sync::Lazy;
use regex::Regex;

/// Literal marker for a finalized round message.
const FINALIZED_WORD: &str = "Finalisé";
/// Glyph markers for a finalized round message.
const FINALIZED_GLYPHS: [char; 2] = ['🔰', '✅'];
/// Leading glyph marking an in-progress (still editing) message.
const IN_PROGRESS_GLYPH: char = '⏰';

#[allow(clippy::expect_used)]
fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("static pattern compiles")
}

static ROUND_TAG: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)#N\s*(\d+)"));
static RESULT_GROUP: Lazy<Regex> = Lazy::new(|| pattern(r"\d+\(([^)]*)\)"));
static SPADE_COUNT: Lazy<Regex> = Lazy::new(|| pattern("♠\u{FE0F}?\\s*:\\s*(\\d+)"));
static HEART_COUNT: Lazy<Regex> = Lazy::new(|| pattern("(?:♥|❤)\u{FE0F}?\\s*:\\s*(\\d+)"));
static DIAMOND_COUNT: Lazy<Regex> = Lazy::new(|| pattern("♦\u{FE0F}?\\s*:\\s*(\\d+)"));
static CLUB_COUNT: Lazy<Regex> = Lazy::new(|| pattern("♣\u{FE0F}?\\s*:\\s*(\\d+)"));

/// A round feed message carrying a round number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundUpdate {
    /// The round the message describes.
    pub round: RoundNumber,
    /// Whether the message carries a finalized sentinel.
    pub finalized: bool,
    /// Normalized contents of each parenthesized result group, in order.
    pub result_groups: Vec<String>,
}

/// A stats feed message carrying per-suit counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsUpdate {
    /// The counts, with absent suits at zero.
    pub snapshot: MirrorSnapshot,
}

/// Classification result for one feed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Message keyed by a round number.
    Round(RoundUpdate),
    /// Message carrying suit counts.
    Stats(StatsUpdate),
    /// Neither; inert, no side effects.
    Unrecognized,
}

/// Replace every suit glyph presentation variant with its canonical form.
pub fn normalize_suits(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{FE0F}' => None,
            '❤' => Some('♥'),
            other => Some(other),
        })
        .collect()
}

/// Suits present in a result token set, after normalization.
pub fn suits_in_group(group: &str) -> Vec<Suit> {
    let normalized = normalize_suits(group);
    Suit::ALL
        .into_iter()
        .filter(|suit| normalized.contains(suit.glyph()))
        .collect()
}

/// Glyph-set membership test used by the outcome verifier.
pub fn group_contains_suit(group: &str, suit: Suit) -> bool {
    normalize_suits(group).contains(suit.glyph())
}

fn is_finalized(text: &str) -> bool {
    text.contains(FINALIZED_WORD) || FINALIZED_GLYPHS.iter().any(|&g| text.contains(g))
}

fn parse_stats(text: &str) -> Option<MirrorSnapshot> {
    let mut snapshot = MirrorSnapshot::default();
    let mut found = false;
    let patterns: [(Suit, &Lazy<Regex>); 4] = [
        (Suit::Spade, &SPADE_COUNT),
        (Suit::Heart, &HEART_COUNT),
        (Suit::Diamond, &DIAMOND_COUNT),
        (Suit::Club, &CLUB_COUNT),
    ];
    for (suit, re) in patterns {
        if let Some(cap) = re.captures(text) {
            if let Ok(count) = cap[1].parse::<u32>() {
                snapshot.set(suit, count);
                found = true;
            }
        }
    }
    found.then_some(snapshot)
}

/// Classify one raw feed message.
///
/// Precedence: an in-progress sentinel makes the message inert; otherwise a
/// round number wins over stats pairs; a message with neither is
/// `Unrecognized`.
pub fn classify(text: &str) -> Inbound {
    if text.trim_start().starts_with(IN_PROGRESS_GLYPH) {
        return Inbound::Unrecognized;
    }

    if let Some(cap) = ROUND_TAG.captures(text) {
        if let Ok(round) = cap[1].parse::<u32>() {
            let result_groups = RESULT_GROUP
                .captures_iter(text)
                .map(|c| normalize_suits(&c[1]))
                .collect();
            return Inbound::Round(RoundUpdate {
                round: RoundNumber(round),
                finalized: is_finalized(text),
                result_groups,
            });
        }
    }

    match parse_stats(text) {
        Some(snapshot) => Inbound::Stats(StatsUpdate { snapshot }),
        None => Inbound::Unrecognized,
    }
}
