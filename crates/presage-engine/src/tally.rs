//! Win/loss tallies keyed by attempt index.

use serde::{Deserialize, Serialize};

/// Running totals for finalized forecasts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Wins indexed by the attempt at which the suit appeared.
    pub wins_by_attempt: [u64; 4],
    /// Forecasts that exhausted the retry ladder.
    pub losses: u64,
}

impl Tally {
    /// Count a win at the given attempt index.
    pub fn record_win(&mut self, attempt: u8) {
        let index = usize::from(attempt).min(self.wins_by_attempt.len() - 1);
        self.wins_by_attempt[index] += 1;
    }

    /// Count a loss.
    pub fn record_loss(&mut self) {
        self.losses += 1;
    }

    /// Total wins across all attempts.
    pub fn wins(&self) -> u64 {
        self.wins_by_attempt.iter().sum()
    }

    /// Total finalized forecasts.
    pub fn total(&self) -> u64 {
        self.wins() + self.losses
    }

    /// Win rate in percent; zero when nothing is finalized yet.
    pub fn win_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.wins() as f64 * 100.0 / total as f64
    }

    /// Wipe all counters.
    pub fn reset(&mut self) {
        *self = Tally::default();
    }

    /// Human-readable summary published on the announce channel.
    pub fn summary_text(&self) -> String {
        let mut text = format!(
            "📊 Forecast summary\n\n✅ Win rate: {:.1}%\n❌ Loss rate: {:.1}%\n\nDetails:\n",
            self.win_rate(),
            100.0 - self.win_rate(),
        );
        for (attempt, count) in self.wins_by_attempt.iter().enumerate() {
            text.push_str(&format!("✅ attempt {attempt}: {count}\n"));
        }
        text.push_str(&format!("❌: {}\n\nTotal forecasts: {}", self.losses, self.total()));
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_and_totals() {
        let mut tally = Tally::default();
        tally.record_win(0);
        tally.record_win(2);
        tally.record_loss();
        assert_eq!(tally.wins(), 2);
        assert_eq!(tally.total(), 3);
        assert!((tally.win_rate() - 66.666).abs() < 0.01);
        assert_eq!(tally.wins_by_attempt, [1, 0, 1, 0]);

        tally.reset();
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.win_rate(), 0.0);
    }
}
