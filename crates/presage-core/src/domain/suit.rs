//! Card suits and the stats-feed snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four categorical outcomes the engine forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    /// ♠
    Spade,
    /// ♥
    Heart,
    /// ♦
    Diamond,
    /// ♣
    Club,
}

impl Suit {
    /// All suits, in snapshot index order.
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club];

    /// Canonical single-codepoint glyph. All presentation variants normalize
    /// to this form before any comparison.
    pub fn glyph(self) -> char {
        match self {
            Suit::Spade => '♠',
            Suit::Heart => '♥',
            Suit::Diamond => '♦',
            Suit::Club => '♣',
        }
    }

    /// Display form used in outbound announcements (emoji presentation).
    /// Presentation-only; never used for comparison.
    pub fn display(self) -> &'static str {
        match self {
            Suit::Spade => "♠️",
            Suit::Heart => "♥️",
            Suit::Diamond => "♦️",
            Suit::Club => "♣️",
        }
    }

    /// Map a canonical glyph back to a suit.
    pub fn from_glyph(c: char) -> Option<Suit> {
        match c {
            '♠' => Some(Suit::Spade),
            '♥' => Some(Suit::Heart),
            '♦' => Some(Suit::Diamond),
            '♣' => Some(Suit::Club),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Suit::Spade => 0,
            Suit::Heart => 1,
            Suit::Diamond => 2,
            Suit::Club => 3,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// Latest per-suit counts from the stats feed.
///
/// Overwritten wholesale on every `StatsUpdate`; suits absent from the feed
/// message count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSnapshot {
    counts: [u32; 4],
}

impl MirrorSnapshot {
    /// Build a snapshot from explicit per-suit counts.
    pub fn new(counts: [(Suit, u32); 4]) -> Self {
        let mut snapshot = Self::default();
        for (suit, count) in counts {
            snapshot.set(suit, count);
        }
        snapshot
    }

    /// Count observed for one suit.
    pub fn count(&self, suit: Suit) -> u32 {
        self.counts[suit.index()]
    }

    /// Set the count for one suit.
    pub fn set(&mut self, suit: Suit, count: u32) {
        self.counts[suit.index()] = count;
    }

    /// True when no suit has a non-zero count.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}
