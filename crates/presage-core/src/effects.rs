//! Outbound transport seam.
//!
//! The chat binding itself is out of scope; the engine only ever needs
//! "deliver text to destination X" and "edit previously delivered message M".
//! This trait defines those two operations; handlers live in
//! `presage-effects` (a console handler and an in-memory one for tests).

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for an outbound destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub i64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a previously delivered message, used for later edits.
///
/// A record whose handle is absent was never visibly announced; no edit is
/// attempted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle(pub i64);

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pure trait for outbound announcement operations.
#[async_trait]
pub trait TransportEffects: Send + Sync {
    /// Deliver text to a destination, returning a handle for later edits.
    async fn deliver(&self, destination: ChannelId, text: &str) -> Result<MessageHandle>;

    /// Edit a previously delivered message in place.
    async fn edit(&self, destination: ChannelId, handle: MessageHandle, text: &str)
        -> Result<()>;
}
