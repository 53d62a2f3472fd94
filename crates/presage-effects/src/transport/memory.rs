//! In-memory transport handler for testing.
//!
//! Records every delivery and edit so tests can assert on outbound traffic,
//! and can be switched into a failing mode to exercise the best-effort
//! delivery path.

use async_trait::async_trait;
use parking_lot::Mutex;
use presage_core::effects::{ChannelId, MessageHandle, TransportEffects};
use presage_core::errors::{PresageError, Result};
use std::sync::Arc;

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMessage {
    /// Destination the text went to.
    pub destination: ChannelId,
    /// Handle the handler returned.
    pub handle: MessageHandle,
    /// Delivered text.
    pub text: String,
}

/// One recorded edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEdit {
    /// Destination of the edited message.
    pub destination: ChannelId,
    /// Handle the edit targeted.
    pub handle: MessageHandle,
    /// Replacement text.
    pub text: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_handle: i64,
    sent: Vec<RecordedMessage>,
    edits: Vec<RecordedEdit>,
    fail_deliveries: bool,
}

/// In-memory transport handler.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransportHandler {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryTransportHandler {
    /// Create a new recording handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `deliver` call fail.
    pub fn fail_deliveries(&self, fail: bool) {
        self.state.lock().fail_deliveries = fail;
    }

    /// All recorded deliveries so far.
    pub fn sent(&self) -> Vec<RecordedMessage> {
        self.state.lock().sent.clone()
    }

    /// All recorded edits so far.
    pub fn edits(&self) -> Vec<RecordedEdit> {
        self.state.lock().edits.clone()
    }

    /// Latest text associated with a handle, edits included.
    pub fn current_text(&self, handle: MessageHandle) -> Option<String> {
        let state = self.state.lock();
        state
            .edits
            .iter()
            .rev()
            .find(|e| e.handle == handle)
            .map(|e| e.text.clone())
            .or_else(|| {
                state
                    .sent
                    .iter()
                    .find(|m| m.handle == handle)
                    .map(|m| m.text.clone())
            })
    }
}

#[async_trait]
impl TransportEffects for InMemoryTransportHandler {
    async fn deliver(&self, destination: ChannelId, text: &str) -> Result<MessageHandle> {
        let mut state = self.state.lock();
        if state.fail_deliveries {
            return Err(PresageError::transport("simulated delivery failure"));
        }
        state.next_handle += 1;
        let handle = MessageHandle(state.next_handle);
        state.sent.push(RecordedMessage {
            destination,
            handle,
            text: text.to_string(),
        });
        Ok(handle)
    }

    async fn edit(&self, destination: ChannelId, handle: MessageHandle, text: &str) -> Result<()> {
        let mut state = self.state.lock();
        if !state.sent.iter().any(|m| m.handle == handle) {
            return Err(PresageError::transport(format!(
                "edit targets unknown handle {handle}"
            )));
        }
        state.edits.push(RecordedEdit {
            destination,
            handle,
            text: text.to_string(),
        });
        Ok(())
    }
}
