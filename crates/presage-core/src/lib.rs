//! Core types and pure logic for the Presage forecast engine.
//!
//! This crate defines **what** the engine works with; the runtime crates
//! define **how** events flow. Everything here is side-effect free except the
//! `effects` module, which declares the outbound transport seam as a trait.
//!
//! - [`domain`]: suits, round numbers, forecast records, mirror snapshots
//! - [`parser`]: the feed message classifier
//! - [`rules`]: Rule A (cycle calculator) and Rule B (mirror detector)
//! - [`config`]: engine configuration with canonical defaults
//! - [`effects`]: the `TransportEffects` trait implemented in `presage-effects`

pub mod config;
pub mod domain;
pub mod effects;
pub mod errors;
pub mod parser;
pub mod rules;

pub use config::EngineConfig;
pub use domain::{
    ForecastRecord, ForecastState, MirrorSnapshot, RoundNumber, RuleOrigin, Suit,
};
pub use effects::{ChannelId, MessageHandle, TransportEffects};
pub use errors::{PresageError, Result};
pub use parser::{classify, Inbound, RoundUpdate, StatsUpdate};
