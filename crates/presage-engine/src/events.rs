//! Events on the single-writer engine queue.
//!
//! Feed messages, timer completions, and admin commands are all just events
//! here; the runtime consumes them one at a time, so every state transition
//! commits before the next event is looked at.

use crate::admin::{AdminCommand, AdminReply};
use presage_core::errors::Result;
use tokio::sync::oneshot;

/// One unit of work for the engine loop.
#[derive(Debug)]
pub enum EngineEvent {
    /// Raw text from the round feed.
    RoundText(String),
    /// Raw text from the stats feed.
    StatsText(String),
    /// A pause timer fired. Stale generations are ignored by the engine.
    PauseElapsed {
        /// Generation tag minted when the pause started.
        generation: u64,
    },
    /// Minute tick for the periodic summary.
    SummaryTick,
    /// The scheduled daily full reset.
    DailyReset,
    /// An administrative command with its reply channel.
    Admin {
        /// The command to execute.
        command: AdminCommand,
        /// Where to send the outcome.
        reply: oneshot::Sender<Result<AdminReply>>,
    },
    /// Stop the engine loop.
    Shutdown,
}
