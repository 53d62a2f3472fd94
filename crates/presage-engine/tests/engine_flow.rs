//! End-to-end engine scenarios over the in-memory transport.
//!
//! Everything goes through the event queue, exactly as feed messages would in
//! production; admin `Status` round-trips double as synchronization points
//! because the queue is strictly FIFO.

use presage_core::domain::{RoundNumber, Suit};
use presage_core::effects::ChannelId;
use presage_core::EngineConfig;
use presage_engine::admin::{AdminCommand, AdminReply, StatusReport};
use presage_engine::runtime::{spawn_engine, EngineHandle};
use presage_effects::InMemoryTransportHandler;
use std::sync::Arc;
use std::time::Duration;

const ANNOUNCE: ChannelId = ChannelId(100);

fn test_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.announce_channel = ANNOUNCE;
    config.pause_cycle_secs = vec![300, 600];
    config
}

fn start(config: EngineConfig) -> (EngineHandle, InMemoryTransportHandler) {
    let transport = InMemoryTransportHandler::new();
    let (handle, _join) = spawn_engine(&config, Arc::new(transport.clone())).unwrap();
    (handle, transport)
}

/// Let tasks woken by a clock jump run and enqueue their events before the
/// next assertion round-trips through the queue.
async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

async fn status(handle: &EngineHandle) -> StatusReport {
    match handle.admin(AdminCommand::Status).await.unwrap() {
        AdminReply::Status(report) => *report,
        other => panic!("expected status reply, got {other:?}"),
    }
}

#[tokio::test]
async fn forecast_round_trip_wins_at_attempt_zero() {
    let (handle, transport) = start(test_config());

    handle.round_text("#N 997 en cours").await.unwrap();
    let report = status(&handle).await;
    let record = report.pending.expect("primary record should exist");
    assert_eq!(record.target_round, RoundNumber(998));

    // Finalized result containing the forecast suit, in variant form.
    let glyph = match record.suit {
        Suit::Heart => "❤️".to_string(),
        other => other.display().to_string(),
    };
    handle
        .round_text(format!("#N 998 ✅ 8({glyph})"))
        .await
        .unwrap();

    let report = status(&handle).await;
    assert!(report.pending.is_none());
    assert_eq!(report.tally.wins_by_attempt[0], 1);
    assert_eq!(report.current_round, Some(RoundNumber(998)));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination, ANNOUNCE);
    let edited = transport.current_text(sent[0].handle).unwrap();
    assert!(edited.contains("✅0️⃣"), "got {edited}");

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn pause_begins_after_burst_and_resumes_on_its_timer() {
    let mut config = test_config();
    config.burst_threshold = 1;
    let (handle, transport) = start(config);

    // First forecast consumes the burst budget; resolve it immediately.
    handle.round_text("#N 997").await.unwrap();
    let record = status(&handle).await.pending.unwrap();
    handle
        .round_text(format!(
            "#N 998 ✅ 8({})",
            record.suit.glyph()
        ))
        .await
        .unwrap();

    // Next trigger is refused and starts the first pause (300 s).
    handle.round_text("#N 1001").await.unwrap();
    let report = status(&handle).await;
    assert!(report.pending.is_none());
    assert!(report.pause.active);
    assert_eq!(report.pause.cycle_index, 1);

    // While paused, triggers stay refused.
    handle.round_text("#N 1003").await.unwrap();
    assert!(status(&handle).await.pending.is_none());

    // Let the pause timer fire.
    tokio::time::advance(Duration::from_secs(301)).await;
    settle().await;
    let report = status(&handle).await;
    assert!(!report.pause.active);

    // Admission is open again.
    handle.round_text("#N 1005").await.unwrap();
    let report = status(&handle).await;
    assert_eq!(
        report.pending.map(|r| r.target_round),
        Some(RoundNumber(1006))
    );

    assert_eq!(transport.sent().len(), 2);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn force_resume_cancels_the_pause_timer() {
    let mut config = test_config();
    config.burst_threshold = 1;
    let (handle, _transport) = start(config);

    handle.round_text("#N 997").await.unwrap();
    let record = status(&handle).await.pending.unwrap();
    handle
        .round_text(format!("#N 998 ✅ 8({})", record.suit.glyph()))
        .await
        .unwrap();
    handle.round_text("#N 1001").await.unwrap();
    assert!(status(&handle).await.pause.active);

    let reply = handle.admin(AdminCommand::ForceResume).await.unwrap();
    assert_matches::assert_matches!(reply, AdminReply::Done(_));
    assert!(!status(&handle).await.pause.active);

    // A forecast emitted right after the forced resume.
    handle.round_text("#N 1003").await.unwrap();
    assert!(status(&handle).await.pending.is_some());

    // The aborted timer's deadline passing must not end anything or flip
    // state; the generation tag already moved on.
    tokio::time::advance(Duration::from_secs(400)).await;
    settle().await;
    let report = status(&handle).await;
    assert!(!report.pause.active);
    assert!(report.pending.is_some());

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn daily_reset_wipes_transient_state() {
    let (handle, _transport) = start(test_config());

    handle.round_text("#N 997").await.unwrap();
    assert!(status(&handle).await.pending.is_some());

    // Jump past the next scheduled reset, wherever in the day it falls.
    tokio::time::advance(Duration::from_secs(25 * 3600)).await;
    settle().await;

    let report = status(&handle).await;
    assert!(report.pending.is_none());
    assert_eq!(report.current_round, None);
    assert_eq!(report.tally.total(), 0);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn stats_feed_drives_rule_b_through_the_queue() {
    let (handle, transport) = start(test_config());

    handle
        .stats_text("♠️ : 9 (23.7 %)\n♥️ : 2\n♦️ : 3\n♣️ : 2")
        .await
        .unwrap();
    handle.round_text("#N 997").await.unwrap();

    let report = status(&handle).await;
    let record = report.pending.unwrap();
    assert_eq!(record.suit, Suit::Diamond);
    assert_eq!(report.impositions.len(), 1);
    assert_eq!(report.impositions[0].target_round, RoundNumber(998));

    assert_eq!(transport.sent().len(), 1);
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn invalid_admin_input_changes_nothing() {
    let (handle, _transport) = start(test_config());

    assert!(handle
        .admin(AdminCommand::SetMirrorThreshold(1))
        .await
        .is_err());
    assert!(handle
        .admin(AdminCommand::SetPauseCycle(vec![]))
        .await
        .is_err());
    assert!(handle
        .admin(AdminCommand::SetSummaryInterval(Duration::ZERO))
        .await
        .is_err());

    // The engine is still alive and behaving normally.
    handle.round_text("#N 997").await.unwrap();
    assert!(status(&handle).await.pending.is_some());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn summary_command_publishes_the_tally() {
    let (handle, transport) = start(test_config());

    // Empty tally: nothing published.
    let reply = handle.admin(AdminCommand::SendSummary).await.unwrap();
    assert_matches::assert_matches!(reply, AdminReply::Done(text) if text.contains("empty"));
    assert!(transport.sent().is_empty());

    handle.round_text("#N 997").await.unwrap();
    let record = status(&handle).await.pending.unwrap();
    handle
        .round_text(format!("#N 998 ✅ 8({})", record.suit.glyph()))
        .await
        .unwrap();

    handle.admin(AdminCommand::SendSummary).await.unwrap();
    let sent = transport.sent();
    let summary = &sent.last().unwrap().text;
    assert!(summary.contains("Total forecasts: 1"), "got {summary}");

    handle.shutdown().await.unwrap();
}
