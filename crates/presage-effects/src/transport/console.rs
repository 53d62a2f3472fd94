//! Console transport handler.
//!
//! Writes outbound announcements to the tracing output and hands back
//! monotonically increasing message handles so edits remain addressable.
//! Stands in for the real chat binding during local runs.

use async_trait::async_trait;
use parking_lot::Mutex;
use presage_core::effects::{ChannelId, MessageHandle, TransportEffects};
use presage_core::errors::Result;
use std::sync::Arc;
use tracing::info;

/// Transport handler that logs instead of delivering.
#[derive(Debug, Clone, Default)]
pub struct ConsoleTransportHandler {
    next_handle: Arc<Mutex<i64>>,
}

impl ConsoleTransportHandler {
    /// Create a new console handler.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransportEffects for ConsoleTransportHandler {
    async fn deliver(&self, destination: ChannelId, text: &str) -> Result<MessageHandle> {
        let handle = {
            let mut next = self.next_handle.lock();
            *next += 1;
            MessageHandle(*next)
        };
        info!(%destination, %handle, text, "outbound");
        Ok(handle)
    }

    async fn edit(&self, destination: ChannelId, handle: MessageHandle, text: &str) -> Result<()> {
        info!(%destination, %handle, text, "outbound edit");
        Ok(())
    }
}
