//! Transport effect handlers.

mod console;
mod memory;

pub use console::ConsoleTransportHandler;
pub use memory::{InMemoryTransportHandler, RecordedEdit, RecordedMessage};
