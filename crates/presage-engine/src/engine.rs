//! The forecast scheduler and outcome verifier.
//!
//! `ForecastEngine` owns all transient state and exposes one method per event
//! kind. Callers (the runtime loop) invoke these strictly sequentially, which
//! is what makes the shared primary-slot state safe without locks.
//!
//! Delivery is best-effort: a failed announcement is logged and the state
//! transition commits anyway, so verification never depends on the transport.

use crate::admin::{AdminCommand, AdminReply, Imposition, StatusReport};
use crate::pause::{Admission, PauseManager, PauseStart};
use crate::tally::Tally;
use chrono::{DateTime, Utc};
use presage_core::domain::{ForecastRecord, ForecastState, RoundNumber, RuleOrigin, Suit};
use presage_core::effects::{ChannelId, TransportEffects};
use presage_core::errors::{PresageError, Result};
use presage_core::parser::{self, Inbound, RoundUpdate};
use presage_core::rules::{cycle, MirrorDetector};
use presage_core::EngineConfig;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Status tag for a freshly announced forecast.
const WAITING_STATUS: &str = "⌛";
/// Status tag for an exhausted retry ladder.
const LOST_STATUS: &str = "❌";
/// Rule B impositions kept for the status report.
const IMPOSITION_HISTORY_LIMIT: usize = 10;

fn win_status(attempt: u8) -> String {
    // ✅ plus the attempt digit in keycap presentation, e.g. ✅0️⃣.
    let digit = char::from(b'0' + attempt.min(9));
    format!("✅{digit}\u{FE0F}\u{20E3}")
}

fn announcement_text(target: RoundNumber, suit: Suit, status: &str) -> String {
    format!("🔵{}  🌀 {} : {status}", target.0, suit.display())
}

/// The admission-controlled forecast state machine.
pub struct ForecastEngine {
    transport: Arc<dyn TransportEffects>,
    announce_channel: ChannelId,
    admin_channel: Option<ChannelId>,
    max_retries: u8,
    pause: PauseManager,
    mirror: MirrorDetector,
    tally: Tally,
    active: Option<ForecastRecord>,
    current_round: Option<RoundNumber>,
    impositions: VecDeque<Imposition>,
    summary_interval: Duration,
    last_summary_at: DateTime<Utc>,
}

impl ForecastEngine {
    /// Build an engine from a validated configuration and a transport handler.
    pub fn new(config: &EngineConfig, transport: Arc<dyn TransportEffects>) -> Self {
        Self {
            transport,
            announce_channel: config.announce_channel,
            admin_channel: config.admin_channel,
            max_retries: config.max_retries,
            pause: PauseManager::new(config.pause_cycle(), config.burst_threshold),
            mirror: MirrorDetector::new(config.mirror_threshold, config.rule_b_budget),
            tally: Tally::default(),
            active: None,
            current_round: None,
            impositions: VecDeque::new(),
            summary_interval: Duration::from_secs(config.summary_interval_mins * 60),
            last_summary_at: Utc::now(),
        }
    }

    /// Process one raw message from the round feed.
    ///
    /// Returns a pause-start instruction when the trigger that arrived with
    /// this message tripped the burst threshold.
    pub async fn on_round_text(&mut self, text: &str) -> Option<PauseStart> {
        match parser::classify(text) {
            Inbound::Round(update) => self.on_round_update(update).await,
            other => {
                debug!(?other, "round feed message was not a round update");
                None
            }
        }
    }

    /// Process one raw message from the stats feed.
    pub fn on_stats_text(&mut self, text: &str) {
        match parser::classify(text) {
            Inbound::Stats(update) => {
                self.mirror.observe(update.snapshot);
            }
            other => {
                debug!(?other, "stats feed message carried no counts");
            }
        }
    }

    async fn on_round_update(&mut self, update: RoundUpdate) -> Option<PauseStart> {
        if update.finalized {
            self.current_round = Some(update.round);
            self.verify(&update).await;
        }
        // Verification first: a terminal transition releases the primary
        // slot, and the same update may then qualify as a trigger.
        self.evaluate_trigger(update.round).await
    }

    /// Retry-ladder verification against a finalized round update.
    async fn verify(&mut self, update: &RoundUpdate) {
        let (expected, suit, attempt) = match &self.active {
            Some(record) => (record.expected_check_round(), record.suit, record.attempt),
            None => return,
        };
        if update.round != expected {
            debug!(round = %update.round, %expected, "finalized round matches no pending check");
            return;
        }
        let Some(group) = update.result_groups.first() else {
            debug!(round = %update.round, "finalized update carries no result group");
            return;
        };

        if parser::group_contains_suit(group, suit) {
            if let Some(mut record) = self.active.take() {
                record.state = ForecastState::Won { attempt };
                self.tally.record_win(attempt);
                info!(target = %record.target_round, %suit, attempt, "forecast won");
                self.edit_announcement(&record, &win_status(attempt)).await;
            }
        } else if attempt < self.max_retries {
            if let Some(record) = self.active.as_mut() {
                record.attempt += 1;
                info!(
                    target = %record.target_round,
                    attempt = record.attempt,
                    awaiting = %record.expected_check_round(),
                    "forecast missed, retrying"
                );
            }
        } else if let Some(mut record) = self.active.take() {
            record.state = ForecastState::Lost;
            self.tally.record_loss();
            info!(target = %record.target_round, %suit, "forecast lost");
            self.edit_announcement(&record, LOST_STATUS).await;
        }
    }

    /// Trigger detection and admission control.
    async fn evaluate_trigger(&mut self, round: RoundNumber) -> Option<PauseStart> {
        let target = cycle::trigger_target(round)?;
        if self.active.is_some() {
            debug!(%target, "primary slot occupied; trigger dropped");
            return None;
        }
        match self.pause.admit(Utc::now()) {
            Admission::Refuse => {
                debug!(%target, "pause active; trigger dropped");
                None
            }
            Admission::BeginPause(start) => Some(start),
            Admission::Admit => {
                if let Err(error) = self.launch_forecast(target, round).await {
                    debug!(%error, %target, "trigger produced no forecast");
                }
                None
            }
        }
    }

    /// Resolve a suit, create the primary record, and announce it.
    async fn launch_forecast(&mut self, target: RoundNumber, base: RoundNumber) -> Result<()> {
        let cycle_suit = cycle::suit_for(target);
        let (suit, origin) = match self.mirror.consume() {
            Some(suit) => (suit, RuleOrigin::Mirror),
            None => match cycle_suit {
                Some(suit) => (suit, RuleOrigin::Cycle),
                None => {
                    return Err(PresageError::invalid(format!(
                        "no rule yields a suit for {target}"
                    )))
                }
            },
        };

        let now = Utc::now();
        let mut record = ForecastRecord::new(target, suit, base, origin, now);
        let text = announcement_text(target, suit, WAITING_STATUS);
        match self.transport.deliver(self.announce_channel, &text).await {
            Ok(handle) => record.message_handle = Some(handle),
            // Best-effort: the record becomes the active primary regardless.
            Err(error) => warn!(%error, %target, "announcement delivery failed"),
        }

        if origin == RuleOrigin::Mirror {
            self.impositions.push_back(Imposition {
                target_round: target,
                suit,
                at: now,
            });
            while self.impositions.len() > IMPOSITION_HISTORY_LIMIT {
                self.impositions.pop_front();
            }
            if cycle_suit != Some(suit) {
                self.notify_imposition(target, suit, cycle_suit).await;
            }
        }

        info!(%target, %suit, ?origin, "forecast emitted");
        self.active = Some(record);
        self.pause.record_forecast_sent();
        Ok(())
    }

    async fn notify_imposition(&self, target: RoundNumber, suit: Suit, cycle_suit: Option<Suit>) {
        let Some(admin) = self.admin_channel else {
            return;
        };
        let overridden = cycle_suit.map_or_else(|| "none".to_string(), |s| s.display().to_string());
        let notice = format!(
            "⚠️ Mirror override: {} for {} (cycle rule {} ignored)",
            suit.display(),
            target,
            overridden,
        );
        if let Err(error) = self.transport.deliver(admin, &notice).await {
            warn!(%error, "imposition notice delivery failed");
        }
    }

    async fn edit_announcement(&self, record: &ForecastRecord, status: &str) {
        let Some(handle) = record.message_handle else {
            debug!(target = %record.target_round, "record was never announced; nothing to edit");
            return;
        };
        let text = announcement_text(record.target_round, record.suit, status);
        if let Err(error) = self
            .transport
            .edit(self.announce_channel, handle, &text)
            .await
        {
            warn!(%error, %handle, "announcement edit failed");
        }
    }

    /// Forward a pause-timer completion. Returns true when it ended the pause.
    pub fn pause_elapsed(&mut self, generation: u64) -> bool {
        let resumed = self.pause.pause_elapsed(generation);
        if resumed {
            info!(generation, "pause elapsed, admissions resume");
        }
        resumed
    }

    /// Minute tick for the periodic summary.
    pub async fn on_summary_tick(&mut self) {
        let now = Utc::now();
        let elapsed = (now - self.last_summary_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        if elapsed < self.summary_interval || self.tally.total() == 0 {
            return;
        }
        if let Err(error) = self.publish_summary().await {
            warn!(%error, "periodic summary delivery failed");
        }
        self.last_summary_at = now;
    }

    /// Publish the win/loss summary to the announce channel.
    pub async fn publish_summary(&self) -> Result<()> {
        self.transport
            .deliver(self.announce_channel, &self.tally.summary_text())
            .await?;
        Ok(())
    }

    /// Wipe all transient state. Deliberate, not crash recovery: the pause
    /// cycle index is the only thing that survives.
    pub fn full_reset(&mut self) {
        self.active = None;
        self.current_round = None;
        self.pause.reset();
        self.mirror.reset();
        self.tally.reset();
        self.impositions.clear();
        info!("engine state reset");
    }

    /// Execute one administrative command.
    pub async fn handle_admin(&mut self, command: AdminCommand) -> Result<AdminReply> {
        match command {
            AdminCommand::Status => Ok(AdminReply::Status(Box::new(self.status_report()))),
            AdminCommand::SetMirrorThreshold(threshold) => {
                if threshold < 2 {
                    return Err(PresageError::invalid("mirror threshold must be at least 2"));
                }
                self.mirror.set_threshold(threshold);
                Ok(AdminReply::Done(format!(
                    "mirror threshold set to {threshold}"
                )))
            }
            AdminCommand::SetPauseCycle(cycle) => {
                if cycle.is_empty() {
                    return Err(PresageError::invalid("pause cycle must be non-empty"));
                }
                if cycle.iter().any(Duration::is_zero) {
                    return Err(PresageError::invalid("pause durations must be positive"));
                }
                let len = cycle.len();
                self.pause.set_cycle(cycle);
                Ok(AdminReply::Done(format!(
                    "pause cycle replaced ({len} entries)"
                )))
            }
            AdminCommand::SetSummaryInterval(interval) => {
                if interval.is_zero() {
                    return Err(PresageError::invalid("summary interval must be positive"));
                }
                self.summary_interval = interval;
                Ok(AdminReply::Done(format!(
                    "summary interval set to {}s",
                    interval.as_secs()
                )))
            }
            AdminCommand::ForceForecast => {
                if self.active.is_some() {
                    return Err(PresageError::invalid("primary slot occupied"));
                }
                let base = self
                    .current_round
                    .ok_or_else(|| PresageError::invalid("no round observed yet"))?;
                let target = cycle::next_target_after(base)
                    .ok_or_else(|| PresageError::invalid("no valid target remains"))?;
                self.launch_forecast(target, base).await?;
                Ok(AdminReply::Done(format!("forecast forced for {target}")))
            }
            AdminCommand::ClearPending => match self.active.take() {
                Some(record) => {
                    warn!(target = %record.target_round, "pending record cleared by admin");
                    Ok(AdminReply::Done(format!(
                        "cleared pending record for {}",
                        record.target_round
                    )))
                }
                None => Ok(AdminReply::Done("no pending record".to_string())),
            },
            AdminCommand::ForceResume => {
                if self.pause.force_resume() {
                    info!("pause ended by admin");
                    Ok(AdminReply::Done("pause ended".to_string()))
                } else {
                    Ok(AdminReply::Done("no active pause".to_string()))
                }
            }
            AdminCommand::Reset => {
                self.full_reset();
                Ok(AdminReply::Done("engine state reset".to_string()))
            }
            AdminCommand::SendSummary => {
                if self.tally.total() == 0 {
                    return Ok(AdminReply::Done("summary is empty".to_string()));
                }
                self.publish_summary().await?;
                Ok(AdminReply::Done("summary published".to_string()))
            }
        }
    }

    /// Snapshot for the status report.
    pub fn status_report(&self) -> StatusReport {
        StatusReport {
            current_round: self.current_round,
            pending: self.active.clone(),
            pause: self.pause.status(),
            authorization: self.mirror.authorization(),
            impositions: self.impositions.iter().copied().collect(),
            tally: self.tally,
        }
    }

    /// The in-flight record, for tests and the runtime.
    pub fn pending(&self) -> Option<&ForecastRecord> {
        self.active.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presage_effects::InMemoryTransportHandler;

    fn engine_with(transport: &InMemoryTransportHandler) -> ForecastEngine {
        let mut config = EngineConfig::default();
        config.announce_channel = ChannelId(100);
        config.admin_channel = Some(ChannelId(200));
        ForecastEngine::new(&config, Arc::new(transport.clone()))
    }

    #[tokio::test]
    async fn trigger_creates_a_primary_record_and_announces_it() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        let pause = engine.on_round_text("#N 997 en cours").await;
        assert!(pause.is_none());
        let record = engine.pending().unwrap();
        assert_eq!(record.target_round, RoundNumber(998));
        assert_eq!(record.attempt, 0);
        assert_eq!(record.origin, RuleOrigin::Cycle);

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("998"));
        assert!(sent[0].text.contains(WAITING_STATUS));
    }

    #[tokio::test]
    async fn occupied_primary_slot_drops_further_triggers() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        engine.on_round_text("#N 997").await;
        let target = engine.pending().unwrap().target_round;
        engine.on_round_text("#N 1001").await;
        // Still the first record; the second trigger was dropped.
        assert_eq!(engine.pending().unwrap().target_round, target);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn win_at_attempt_zero_edits_and_releases() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        engine.on_round_text("#N 997").await;
        let suit = engine.pending().unwrap().suit;
        let text = format!("#N 998 ✅ 8({})", suit.display());
        engine.on_round_text(&text).await;

        assert!(engine.pending().is_none());
        assert_eq!(engine.status_report().tally.wins_by_attempt[0], 1);
        let edits = transport.edits();
        assert_eq!(edits.len(), 1);
        assert!(edits[0].text.contains("✅0️⃣"));
    }

    #[tokio::test]
    async fn four_misses_exhaust_the_ladder_exactly() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        // Target 996: the four checks land on 996..=999, none of which
        // precedes a valid new target, so no fresh trigger interferes.
        engine.on_round_text("#N 995").await;
        assert_eq!(engine.pending().unwrap().target_round, RoundNumber(996));
        let suit = engine.pending().unwrap().suit;
        // A result group guaranteed not to contain the forecast suit.
        let other = Suit::ALL
            .into_iter()
            .find(|&s| s != suit)
            .unwrap();

        for (i, round) in [996u32, 997, 998, 999].iter().enumerate() {
            assert!(engine.pending().is_some(), "record gone before miss {i}");
            let text = format!("#N {round} ✅ 8({})", other.glyph());
            engine.on_round_text(&text).await;
        }

        // Lost exactly after the fourth check, never earlier.
        assert!(engine.pending().is_none());
        let report = engine.status_report();
        assert_eq!(report.tally.losses, 1);
        assert_eq!(report.tally.wins(), 0);
        let edits = transport.edits();
        assert!(edits.last().unwrap().text.contains(LOST_STATUS));
    }

    #[tokio::test]
    async fn win_at_attempt_two_does_not_proceed_to_three() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        engine.on_round_text("#N 997").await;
        let suit = engine.pending().unwrap().suit;
        let other = Suit::ALL.into_iter().find(|&s| s != suit).unwrap();

        engine
            .on_round_text(&format!("#N 998 ✅ 8({})", other.glyph()))
            .await;
        engine
            .on_round_text(&format!("#N 999 ✅ 8({})", other.glyph()))
            .await;
        engine
            .on_round_text(&format!("#N 1000 ✅ 8({})", suit.glyph()))
            .await;

        assert!(engine.pending().is_none());
        let report = engine.status_report();
        assert_eq!(report.tally.wins_by_attempt, [0, 0, 1, 0]);
        assert!(transport.edits().last().unwrap().text.contains("✅2️⃣"));
    }

    #[tokio::test]
    async fn mismatched_finalized_round_is_ignored_for_verification() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        engine.on_round_text("#N 997").await;
        let suit = engine.pending().unwrap().suit;
        // Round 996 matches no pending check; the record must be untouched.
        engine
            .on_round_text(&format!("#N 996 ✅ 8({})", suit.glyph()))
            .await;
        let record = engine.pending().unwrap();
        assert_eq!(record.attempt, 0);
        assert_eq!(record.expected_check_round(), RoundNumber(998));
    }

    #[tokio::test]
    async fn rule_b_overrides_rule_a_and_notifies_admin() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        // ♠=9 vs ♦=3 trips pair one; ♦ is authorized.
        engine.on_stats_text("♠️ : 9\n♦️ : 3\n♥️ : 2\n♣️ : 2");
        engine.on_round_text("#N 997").await;

        let record = engine.pending().unwrap();
        assert_eq!(record.origin, RuleOrigin::Mirror);
        assert_eq!(record.suit, Suit::Diamond);

        // Rule A for 998 is not ♦, so the admin channel got a notice.
        let admin_messages: Vec<_> = transport
            .sent()
            .into_iter()
            .filter(|m| m.destination == ChannelId(200))
            .collect();
        assert_eq!(admin_messages.len(), 1);
        assert!(admin_messages[0].text.contains("override"));
    }

    #[tokio::test]
    async fn rule_b_budget_yields_back_to_rule_a() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        engine.on_stats_text("♠️ : 9\n♦️ : 3");
        engine.on_round_text("#N 997").await;
        assert_eq!(engine.pending().unwrap().origin, RuleOrigin::Mirror);

        // Win immediately to release the slot.
        engine.on_round_text("#N 998 ✅ 8(♦)").await;
        assert!(engine.pending().is_none());

        // Budget (1) exhausted: the next forecast comes from Rule A.
        engine.on_round_text("#N 1001").await;
        assert_eq!(engine.pending().unwrap().origin, RuleOrigin::Cycle);
    }

    #[tokio::test]
    async fn fresh_stats_reauthorize_a_spent_suit() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        engine.on_stats_text("♠️ : 9\n♦️ : 3");
        engine.on_round_text("#N 997").await;
        assert_eq!(engine.pending().unwrap().origin, RuleOrigin::Mirror);
        engine.on_round_text("#N 998 ✅ 8(♦)").await;

        // No new stats yet, so Rule A takes over.
        engine.on_round_text("#N 1001").await;
        let record = engine.pending().unwrap();
        assert_eq!(record.origin, RuleOrigin::Cycle);
        let suit = record.suit;
        engine
            .on_round_text(&format!("#N 1002 ✅ 8({})", suit.glyph()))
            .await;
        assert!(engine.pending().is_none());

        // The imbalance still stands on the next stats message; the same
        // suit imposes again.
        engine.on_stats_text("♠️ : 10\n♦️ : 3");
        engine.on_round_text("#N 1003").await;
        let record = engine.pending().unwrap();
        assert_eq!(record.origin, RuleOrigin::Mirror);
        assert_eq!(record.suit, Suit::Diamond);
    }

    #[tokio::test]
    async fn delivery_failure_still_commits_the_record() {
        let transport = InMemoryTransportHandler::new();
        transport.fail_deliveries(true);
        let mut engine = engine_with(&transport);

        engine.on_round_text("#N 997").await;
        let record = engine.pending().unwrap();
        assert!(record.message_handle.is_none());

        // Verification proceeds independently of delivery success.
        transport.fail_deliveries(false);
        let suit = record.suit;
        engine
            .on_round_text(&format!("#N 998 ✅ 8({})", suit.glyph()))
            .await;
        assert!(engine.pending().is_none());
        assert_eq!(engine.status_report().tally.wins(), 1);
        // No handle, so no edit was attempted.
        assert!(transport.edits().is_empty());
    }

    #[tokio::test]
    async fn burst_threshold_starts_a_pause_and_refuses_the_trigger() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        // Four forecasts, each resolved immediately so the slot frees up.
        for base in [997u32, 1001, 1003, 1005] {
            engine.on_round_text(&format!("#N {base}")).await;
            let record = engine.pending().unwrap().clone();
            let text = format!(
                "#N {} ✅ 8({})",
                record.expected_check_round().0,
                record.suit.glyph()
            );
            engine.on_round_text(&text).await;
            assert!(engine.pending().is_none());
        }

        // Fifth trigger trips the burst threshold (4).
        let start = engine.on_round_text("#N 1007").await;
        let start = start.expect("pause should begin");
        assert_eq!(start.duration, Duration::from_secs(300));
        assert!(engine.pending().is_none());

        // While paused, triggers are refused.
        assert!(engine.on_round_text("#N 1011").await.is_none());
        assert!(engine.pending().is_none());

        // Completion re-opens admission immediately.
        assert!(engine.pause_elapsed(start.generation));
        engine.on_round_text("#N 1013").await;
        assert!(engine.pending().is_some());
    }

    #[tokio::test]
    async fn released_slot_admits_the_very_next_trigger() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        engine.on_round_text("#N 997").await;
        let suit = engine.pending().unwrap().suit;
        // 1001 finalizes nothing relevant and triggers nothing while occupied.
        engine.on_round_text("#N 1001").await;
        assert_eq!(engine.pending().unwrap().target_round, RoundNumber(998));

        // Win releases the slot; the same qualifying round re-triggers next.
        engine
            .on_round_text(&format!("#N 998 ✅ 8({})", suit.glyph()))
            .await;
        assert!(engine.pending().is_none());
        engine.on_round_text("#N 1003").await;
        assert_eq!(engine.pending().unwrap().target_round, RoundNumber(1004));
    }

    #[tokio::test]
    async fn admin_validation_and_reset() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        assert!(engine
            .handle_admin(AdminCommand::SetMirrorThreshold(1))
            .await
            .is_err());
        assert!(engine
            .handle_admin(AdminCommand::SetPauseCycle(vec![]))
            .await
            .is_err());
        assert!(engine
            .handle_admin(AdminCommand::SetMirrorThreshold(8))
            .await
            .is_ok());

        engine.on_round_text("#N 997").await;
        assert!(engine.pending().is_some());
        engine.handle_admin(AdminCommand::Reset).await.unwrap();
        assert!(engine.pending().is_none());
        let report = engine.status_report();
        assert_eq!(report.tally.total(), 0);
        assert_eq!(report.current_round, None);
    }

    #[tokio::test]
    async fn force_forecast_respects_the_primary_slot() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        // No round observed yet: refused.
        assert!(engine.handle_admin(AdminCommand::ForceForecast).await.is_err());

        engine.on_round_text("#N 996 ✅ 3(♣)").await;
        let reply = engine.handle_admin(AdminCommand::ForceForecast).await.unwrap();
        assert_matches::assert_matches!(reply, AdminReply::Done(_));
        assert_eq!(engine.pending().unwrap().target_round, RoundNumber(998));

        // Slot now occupied: a second force is refused.
        assert!(engine.handle_admin(AdminCommand::ForceForecast).await.is_err());
    }

    #[tokio::test]
    async fn clear_pending_releases_a_stuck_record() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        engine.on_round_text("#N 997").await;
        assert!(engine.pending().is_some());
        engine.handle_admin(AdminCommand::ClearPending).await.unwrap();
        assert!(engine.pending().is_none());

        engine.on_round_text("#N 1001").await;
        assert!(engine.pending().is_some());
    }

    #[tokio::test]
    async fn heart_variant_in_results_verifies_a_heart_forecast() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        // Rule A for target 6 is ♥ (cycle head).
        engine.on_round_text("#N 5").await;
        let record = engine.pending().unwrap();
        assert_eq!(record.target_round, RoundNumber(6));
        assert_eq!(record.suit, Suit::Heart);

        // The feed renders hearts with the heavy-heart codepoint.
        engine.on_round_text("#N 6 ✅ 9(❤️)").await;
        assert!(engine.pending().is_none());
        assert_eq!(engine.status_report().tally.wins_by_attempt[0], 1);
    }

    #[tokio::test]
    async fn in_progress_messages_neither_trigger_nor_verify() {
        let transport = InMemoryTransportHandler::new();
        let mut engine = engine_with(&transport);

        engine.on_round_text("⏰ #N 997").await;
        assert!(engine.pending().is_none());

        engine.on_round_text("#N 997").await;
        let suit = engine.pending().unwrap().suit;
        engine
            .on_round_text(&format!("⏰ #N 998 ✅ 8({})", suit.glyph()))
            .await;
        // Still pending: the in-progress edit did not verify.
        assert_eq!(engine.pending().unwrap().attempt, 0);
    }
}
