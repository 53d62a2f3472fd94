//! The stateful Presage engine.
//!
//! One [`engine::ForecastEngine`] owns every piece of transient state: the
//! single in-flight forecast record, the pause/throttle manager, the Rule B
//! detector, tallies, and the imposition history. All transitions are methods
//! on that object; there is no ambient module-level state.
//!
//! [`runtime`] wraps the engine in a single-consumer event loop: feed texts,
//! timer completions, and admin commands all arrive as [`events::EngineEvent`]
//! values on one queue, which is the sequential-dispatch guarantee that lets
//! the scheduler and verifier share the primary slot without locks.

pub mod admin;
pub mod engine;
pub mod events;
pub mod pause;
pub mod runtime;
pub mod tally;

pub use admin::{AdminCommand, AdminReply, StatusReport};
pub use engine::ForecastEngine;
pub use events::EngineEvent;
pub use pause::{Admission, PauseManager, PauseStart};
pub use runtime::{spawn_engine, EngineHandle};
pub use tally::Tally;
