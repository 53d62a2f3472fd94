//! Effect handlers for the Presage transport seam.
//!
//! The trait lives in `presage-core::effects`; this crate provides the
//! handlers: a console handler for bootstrap/demo use (the real chat binding
//! is an external collaborator) and an in-memory handler for tests and
//! simulation.

pub mod transport;

pub use transport::{ConsoleTransportHandler, InMemoryTransportHandler};
