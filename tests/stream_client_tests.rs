//! Stream client: routing frames into the registry and the notifiers.

use std::time::Duration;

use arbwatch::application::registry::{AlertPolicy, OpportunityRegistry};
use arbwatch::application::stream::{StreamClient, StreamSupervisor, StreamUpdate};
use arbwatch::domain::{ConnectionStatus, OpportunityId};
use arbwatch::port::{Event, NotifierRegistry, TransportEvent};
use arbwatch::testkit::config;
use arbwatch::testkit::domain::{error_frame, heartbeat_frame, opportunity_frame};
use arbwatch::testkit::notifier::RecordingNotifier;
use arbwatch::testkit::stream::{closed, frame, ScriptedTransport};
use rust_decimal_macros::dec;
use serde_json::json;

fn client(
    transport: ScriptedTransport,
    capacity: usize,
) -> (StreamClient<ScriptedTransport>, RecordingNotifier) {
    let supervisor = StreamSupervisor::new(transport, config::stream_url(), &config::stream(true));
    let registry = OpportunityRegistry::new(capacity, AlertPolicy::default());
    let recorder = RecordingNotifier::new();
    let mut notifiers = NotifierRegistry::new();
    notifiers.register(Box::new(recorder.clone()));
    (StreamClient::new(supervisor, registry, notifiers), recorder)
}

/// Step until `n` opportunity updates were seen.
async fn take_opportunities(
    client: &mut StreamClient<ScriptedTransport>,
    n: usize,
) -> Vec<StreamUpdate> {
    let mut seen = Vec::new();
    while seen.len() < n {
        match client.step().await {
            Some(update @ StreamUpdate::Opportunity { .. }) => seen.push(update),
            Some(_) => {}
            None => break,
        }
    }
    seen
}

#[tokio::test(start_paused = true)]
async fn opportunities_are_stored_and_alerts_raised() {
    let transport = ScriptedTransport::new().with_connection(vec![
        frame(opportunity_frame("low", "2.5", 1)),
        frame(opportunity_frame("high", "12.5", 2)),
    ]);
    let (mut client, recorder) = client(transport, 10);
    client.connect(None).await;

    let updates = take_opportunities(&mut client, 2).await;
    assert_eq!(updates.len(), 2);
    assert!(matches!(
        &updates[0],
        StreamUpdate::Opportunity { inserted: true, alert: None, .. }
    ));
    let StreamUpdate::Opportunity { alert: Some(alert), .. } = &updates[1] else {
        panic!("expected an alert for the 12.5% opportunity");
    };
    assert_eq!(alert.profit_pct, dec!(12.5));
    assert_eq!(alert.duration, Duration::from_millis(300));

    assert_eq!(client.registry().len(), 2);
    let newest = client.registry().iter().next().unwrap();
    assert_eq!(newest.opportunity_id, OpportunityId::from("high"));
    assert_eq!(recorder.alerts().len(), 1);
    assert_eq!(client.dispatcher().last_sequence(), Some(2));
}

#[tokio::test(start_paused = true)]
async fn repeated_id_replaces_in_place() {
    let transport = ScriptedTransport::new().with_connection(vec![
        frame(opportunity_frame("a", "1", 1)),
        frame(opportunity_frame("b", "1", 2)),
        frame(opportunity_frame("a", "3", 3)),
    ]);
    let (mut client, _) = client(transport, 10);
    client.connect(None).await;

    let updates = take_opportunities(&mut client, 3).await;
    assert!(matches!(
        &updates[2],
        StreamUpdate::Opportunity { inserted: false, .. }
    ));
    let ids: Vec<&str> = client
        .registry()
        .iter()
        .map(|o| o.opportunity_id.as_str())
        .collect();
    assert_eq!(ids, vec!["b", "a"]);
    let a = client.registry().get(&"a".into()).unwrap();
    assert_eq!(a.expected_profit_pct, Some(dec!(3)));
}

#[tokio::test(start_paused = true)]
async fn registry_stays_within_capacity() {
    let transport = ScriptedTransport::new().with_connection(
        (1..=5)
            .map(|i| frame(opportunity_frame(&format!("opp-{i}"), "1", i)))
            .collect(),
    );
    let (mut client, _) = client(transport, 3);
    client.connect(None).await;

    take_opportunities(&mut client, 5).await;
    assert_eq!(client.registry().len(), 3);
    assert!(client.registry().get(&"opp-1".into()).is_none());
    assert!(client.registry().get(&"opp-5".into()).is_some());
}

#[tokio::test(start_paused = true)]
async fn server_error_is_recorded_without_closing() {
    let transport = ScriptedTransport::new()
        .with_connection(vec![frame(error_frame("rate limited", 1))]);
    let wire = transport.recorder();
    let (mut client, recorder) = client(transport, 10);
    client.connect(None).await;

    let mut saw_error = false;
    for _ in 0..3 {
        if let Some(StreamUpdate::ServerError(message)) = client.step().await {
            assert_eq!(message, "rate limited");
            saw_error = true;
            break;
        }
    }
    assert!(saw_error);
    assert_eq!(client.status(), ConnectionStatus::Connected);
    assert_eq!(client.error(), Some("rate limited"));
    assert!(wire.closes().is_empty());
    assert!(recorder
        .events()
        .contains(&Event::ServerError("rate limited".into())));
}

#[tokio::test(start_paused = true)]
async fn authenticated_heartbeat_upgrades_status() {
    let transport =
        ScriptedTransport::new().with_connection(vec![frame(heartbeat_frame(true, 1))]);
    let (mut client, recorder) = client(transport, 10);
    client.connect(None).await;
    assert_eq!(client.status(), ConnectionStatus::Connected);

    let mut upgraded = false;
    for _ in 0..3 {
        if client.step().await == Some(StreamUpdate::Connection(ConnectionStatus::Authenticated)) {
            upgraded = true;
            break;
        }
    }
    assert!(upgraded);
    assert_eq!(client.tier(), Some("pro"));
    assert_eq!(
        recorder.statuses(),
        vec![ConnectionStatus::Connected, ConnectionStatus::Authenticated]
    );
}

#[tokio::test(start_paused = true)]
async fn undecodable_frames_are_dropped() {
    let transport = ScriptedTransport::new().with_connection(vec![
        TransportEvent::Frame("not json".into()),
        frame(json!({"type": "no_such_kind", "payload": {}})),
        frame(opportunity_frame("ok", "1", 3)),
    ]);
    let (mut client, _) = client(transport, 10);
    client.connect(None).await;

    take_opportunities(&mut client, 1).await;
    assert_eq!(client.dispatcher().dropped(), 2);
    assert_eq!(client.registry().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn informational_kinds_reach_notifiers() {
    let transport = ScriptedTransport::new().with_connection(vec![
        frame(json!({"type": "market_update", "payload": {"market": "m1"}})),
        frame(json!({"type": "risk_alert", "payload": {"level": "high"}})),
    ]);
    let (mut client, recorder) = client(transport, 10);
    client.connect(None).await;

    let mut forwarded = 0;
    while forwarded < 2 {
        if client.step().await == Some(StreamUpdate::Forwarded) {
            forwarded += 1;
        }
    }
    let events = recorder.events();
    assert!(events.contains(&Event::MarketUpdate(json!({"market": "m1"}))));
    assert!(events.contains(&Event::RiskAlert(json!({"level": "high"}))));
}

#[tokio::test(start_paused = true)]
async fn reconnect_resets_sequence_tracking() {
    let transport = ScriptedTransport::new()
        .with_connection(vec![frame(opportunity_frame("a", "1", 40)), closed(1006)])
        .with_connection(vec![frame(opportunity_frame("b", "1", 1))]);
    let (mut client, recorder) = client(transport, 10);
    client.connect(None).await;

    take_opportunities(&mut client, 2).await;
    assert_eq!(client.dispatcher().last_sequence(), Some(1));
    assert_eq!(client.registry().len(), 2);
    assert_eq!(
        recorder.statuses(),
        vec![
            ConnectionStatus::Connected,
            ConnectionStatus::Disconnected,
            ConnectionStatus::Connected,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn run_until_disconnects_on_shutdown() {
    let transport = ScriptedTransport::new().with_connection(vec![
        frame(opportunity_frame("a", "1", 1)),
        frame(opportunity_frame("b", "1", 2)),
    ]);
    let wire = transport.recorder();
    let (mut client, _) = client(transport, 10);
    client.connect(None).await;

    client
        .run_until(tokio::time::sleep(Duration::from_secs(1)))
        .await;

    assert_eq!(client.registry().len(), 2);
    assert_eq!(client.status(), ConnectionStatus::Disconnected);
    assert_eq!(wire.closes(), vec![1000]);
}
