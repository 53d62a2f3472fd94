//! Single-writer event runtime.
//!
//! `spawn_engine` wires a [`ForecastEngine`] to an mpsc queue and runs it on
//! one task. Background timers (the pause sleep, the summary ticker, the
//! daily reset schedule) never mutate state themselves; they post events back
//! into the same queue, so timer callbacks are serialized like any other
//! event.
//!
//! The pause timer is owned here as a `JoinHandle` so force-resume and reset
//! can abort it; the generation tag carried by the completion event makes a
//! lost race harmless either way.

use crate::admin::{AdminCommand, AdminReply};
use crate::engine::ForecastEngine;
use crate::events::EngineEvent;
use crate::pause::PauseStart;
use chrono::{FixedOffset, NaiveTime, Utc};
use presage_core::effects::TransportEffects;
use presage_core::errors::{PresageError, Result};
use presage_core::EngineConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const EVENT_QUEUE_DEPTH: usize = 256;
const SUMMARY_TICK: Duration = Duration::from_secs(60);

/// Clonable handle for feeding events to a running engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineEvent>,
}

impl EngineHandle {
    /// Submit one raw round feed message.
    pub async fn round_text(&self, text: impl Into<String>) -> Result<()> {
        self.send(EngineEvent::RoundText(text.into())).await
    }

    /// Submit one raw stats feed message.
    pub async fn stats_text(&self, text: impl Into<String>) -> Result<()> {
        self.send(EngineEvent::StatsText(text.into())).await
    }

    /// Execute an administrative command and wait for its reply.
    pub async fn admin(&self, command: AdminCommand) -> Result<AdminReply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineEvent::Admin {
            command,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| PresageError::internal("engine dropped the admin reply"))?
    }

    /// Ask the engine loop to stop.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(EngineEvent::Shutdown).await
    }

    async fn send(&self, event: EngineEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| PresageError::internal("engine loop is gone"))
    }
}

struct RuntimeState {
    engine: ForecastEngine,
    tx: mpsc::Sender<EngineEvent>,
    pause_timer: Option<JoinHandle<()>>,
}

impl RuntimeState {
    fn arm_pause_timer(&mut self, start: PauseStart) {
        self.cancel_pause_timer();
        let tx = self.tx.clone();
        self.pause_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(start.duration).await;
            let _ = tx
                .send(EngineEvent::PauseElapsed {
                    generation: start.generation,
                })
                .await;
        }));
    }

    fn cancel_pause_timer(&mut self) {
        if let Some(timer) = self.pause_timer.take() {
            timer.abort();
        }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<EngineEvent>) {
        while let Some(event) = rx.recv().await {
            match event {
                EngineEvent::RoundText(text) => {
                    if let Some(start) = self.engine.on_round_text(&text).await {
                        self.arm_pause_timer(start);
                    }
                }
                EngineEvent::StatsText(text) => {
                    self.engine.on_stats_text(&text);
                }
                EngineEvent::PauseElapsed { generation } => {
                    if self.engine.pause_elapsed(generation) {
                        self.pause_timer = None;
                    } else {
                        debug!(generation, "stale pause timer ignored");
                    }
                }
                EngineEvent::SummaryTick => {
                    self.engine.on_summary_tick().await;
                }
                EngineEvent::DailyReset => {
                    self.cancel_pause_timer();
                    self.engine.full_reset();
                    warn!("scheduled daily reset executed");
                }
                EngineEvent::Admin { command, reply } => {
                    // Commands that end a pause must also drop its timer.
                    if matches!(command, AdminCommand::ForceResume | AdminCommand::Reset) {
                        self.cancel_pause_timer();
                    }
                    let outcome = self.engine.handle_admin(command).await;
                    let _ = reply.send(outcome);
                }
                EngineEvent::Shutdown => break,
            }
        }
        self.cancel_pause_timer();
        info!("engine loop stopped");
    }
}

/// Delay until the next occurrence of the configured reset time.
fn until_next_reset(config: &EngineConfig) -> Result<Duration> {
    let (hour, minute) = config.reset_time_parts()?;
    let offset = FixedOffset::east_opt(config.reset_utc_offset_hours * 3600)
        .ok_or_else(|| PresageError::invalid("reset offset out of range"))?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| PresageError::invalid("reset time out of range"))?;

    let now = Utc::now().with_timezone(&offset);
    let mut target = now.date_naive().and_time(time);
    if target <= now.naive_local() {
        target += chrono::Duration::days(1);
    }
    (target - now.naive_local())
        .to_std()
        .map_err(|_| PresageError::internal("reset schedule went backwards"))
}

/// Start an engine and its background schedulers.
///
/// Returns the handle for feeding events and the join handle of the loop
/// task. Background tasks stop on their own once the loop (and with it the
/// queue) is gone.
pub fn spawn_engine(
    config: &EngineConfig,
    transport: Arc<dyn TransportEffects>,
) -> Result<(EngineHandle, JoinHandle<()>)> {
    config.validate()?;
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let engine = ForecastEngine::new(config, transport);

    // Summary ticker: the engine decides each tick whether a summary is due,
    // so interval changes take effect without rewiring this task.
    let summary_tx = tx.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(SUMMARY_TICK).await;
            if summary_tx.send(EngineEvent::SummaryTick).await.is_err() {
                break;
            }
        }
    });

    // Daily reset schedule.
    let reset_tx = tx.clone();
    let reset_config = config.clone();
    tokio::spawn(async move {
        loop {
            let delay = match until_next_reset(&reset_config) {
                Ok(delay) => delay,
                Err(error) => {
                    warn!(%error, "daily reset schedule disabled");
                    break;
                }
            };
            debug!(?delay, "next daily reset scheduled");
            tokio::time::sleep(delay).await;
            if reset_tx.send(EngineEvent::DailyReset).await.is_err() {
                break;
            }
        }
    });

    let state = RuntimeState {
        engine,
        tx: tx.clone(),
        pause_timer: None,
    };
    let join = tokio::spawn(state.run(rx));
    Ok((EngineHandle { tx }, join))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_reset_is_within_a_day() {
        let config = EngineConfig::default();
        let delay = until_next_reset(&config).unwrap();
        assert!(delay <= Duration::from_secs(24 * 3600));
    }
}
