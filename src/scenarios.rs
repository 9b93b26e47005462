//! End-to-end scenarios with every component wired together
//!
//! The connection manager notifies the check trigger, the trigger posts to
//! the event channel and the coordinator consumes from it, as on the device.
//! Radio, transport, installer and device are mocks.

use crate::connection::manager::{ConnectionManager, ConnectionState, ConnectionStatus};
use crate::connection::traits::mock::MockWifiLink;
use crate::connection::traits::LinkEvent;
use crate::coordinator::handler::{
    CoordinatorState, SequenceOutcome, UpdateCoordinator, UpdateError,
};
use crate::coordinator::trigger::{CheckTrigger, TickOutcome};
use crate::events::EventChannel;
use crate::install::traits::mock::{Call, CallJournal, MockDevice, MockInstaller};
use crate::manifest::fetcher::ManifestDefect;
use crate::manifest::traits::mock::{MockHttpTransport, MockReply};
use crate::manifest::traits::TransportError;
use crate::trust::{Endpoint, TrustAnchors};
use futures::executor::block_on;

const ADDRESS: [u8; 4] = [192, 168, 4, 17];
const ANCHORS: TrustAnchors = TrustAnchors::new("manifest-ca", "artifact-ca");

type Coordinator<'a, 'j> =
    UpdateCoordinator<'a, MockHttpTransport, MockInstaller<'j>, MockDevice<'j>, 2>;

fn coordinator<'a, 'j>(
    events: &'a EventChannel<2>,
    journal: &'j CallJournal,
) -> Coordinator<'a, 'j> {
    UpdateCoordinator::new(
        events,
        MockHttpTransport::new(),
        MockInstaller::new(journal),
        MockDevice::new(journal),
    )
    .with_trust_anchors(ANCHORS)
}

fn manager<'a>(
    status: &'a ConnectionStatus,
    trigger: &'a CheckTrigger<'a, 2>,
    max_retry: u8,
) -> ConnectionManager<'a, MockWifiLink> {
    let mut manager = ConnectionManager::with_max_retry(MockWifiLink::new(), status, max_retry);
    manager.on_transition(trigger).unwrap();
    manager
}

fn connect(manager: &mut ConnectionManager<'_, MockWifiLink>) {
    manager.handle_event(LinkEvent::Started);
    manager.handle_event(LinkEvent::GotAddress(ADDRESS));
}

#[test]
fn test_connect_tick_no_update() {
    let status = ConnectionStatus::new();
    let events = EventChannel::new();
    let trigger = CheckTrigger::new(&events);
    let journal = CallJournal::new();
    let mut manager = manager(&status, &trigger, 3);
    let mut coordinator = coordinator(&events, &journal);
    coordinator.transport().queue_reply(MockReply::status(204, b""));

    connect(&mut manager);
    assert_eq!(trigger.tick(), TickOutcome::Posted);

    let outcome = block_on(coordinator.process_next());

    assert_eq!(outcome, SequenceOutcome::NoUpdate);
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
    assert_eq!(journal.restart_count(), 0);
    assert_eq!(journal.install_count(), 0);
}

#[test]
fn test_connect_tick_update_restarts_once() {
    let status = ConnectionStatus::new();
    let events = EventChannel::new();
    let trigger = CheckTrigger::new(&events);
    let journal = CallJournal::new();
    let mut manager = manager(&status, &trigger, 3);
    let mut coordinator = coordinator(&events, &journal);
    coordinator.transport().queue_reply(MockReply::status(
        200,
        br#"{"download_url": "https://cdn/fw.bin"}"#,
    ));

    connect(&mut manager);
    assert_eq!(trigger.tick(), TickOutcome::Posted);

    // run() returns once the restart has been issued
    block_on(coordinator.run());

    assert_eq!(coordinator.state(), CoordinatorState::Rebooting);
    let calls = journal.calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        Call::Install { url, endpoint, .. } => {
            assert_eq!(url.as_str(), "https://cdn/fw.bin");
            assert_eq!(*endpoint, Endpoint::ArtifactHost);
        }
        other => panic!("expected install first, got {:?}", other),
    }
    assert_eq!(calls[1], Call::Restart);
    assert_eq!(journal.restart_count(), 1);
}

#[test]
fn test_connect_tick_decode_failure() {
    let status = ConnectionStatus::new();
    let events = EventChannel::new();
    let trigger = CheckTrigger::new(&events);
    let journal = CallJournal::new();
    let mut manager = manager(&status, &trigger, 3);
    let mut coordinator = coordinator(&events, &journal);
    coordinator
        .transport()
        .queue_reply(MockReply::status(200, b"{download_url: https://cdn/fw.bin}"));

    connect(&mut manager);
    assert_eq!(trigger.tick(), TickOutcome::Posted);

    let outcome = block_on(coordinator.process_next());

    assert_eq!(
        outcome,
        SequenceOutcome::Failed(UpdateError::Decode(ManifestDefect::Malformed))
    );
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
    assert!(journal.calls().is_empty());
}

#[test]
fn test_exhausted_link_keeps_timer_disarmed() {
    let status = ConnectionStatus::new();
    let events = EventChannel::new();
    let trigger = CheckTrigger::new(&events);
    let mut manager = manager(&status, &trigger, 3);

    manager.handle_event(LinkEvent::Started);
    for _ in 0..3 {
        manager.handle_event(LinkEvent::Disconnected);
    }

    assert_eq!(manager.state(), ConnectionState::Failed);
    assert_eq!(status.current(), ConnectionState::Failed);
    let attempts = manager.link().connect_calls();

    // Further link noise triggers no reconnects and no checks
    for _ in 0..5 {
        manager.handle_event(LinkEvent::Disconnected);
        assert_eq!(trigger.tick(), TickOutcome::Disarmed);
    }
    assert_eq!(manager.link().connect_calls(), attempts);
    assert!(!trigger.is_armed());
    assert!(events.is_empty());
}

#[test]
fn test_failure_after_connection_disarms() {
    let status = ConnectionStatus::new();
    let events = EventChannel::new();
    let trigger = CheckTrigger::new(&events);
    let mut manager = manager(&status, &trigger, 3);

    connect(&mut manager);
    assert!(trigger.is_armed());

    for _ in 0..3 {
        manager.handle_event(LinkEvent::Disconnected);
    }

    assert_eq!(manager.state(), ConnectionState::Failed);
    assert_eq!(trigger.tick(), TickOutcome::Disarmed);
}

#[test]
fn test_disconnect_disarms_before_next_tick() {
    let status = ConnectionStatus::new();
    let events = EventChannel::new();
    let trigger = CheckTrigger::new(&events);
    let mut manager = manager(&status, &trigger, 3);

    connect(&mut manager);
    manager.handle_event(LinkEvent::Disconnected);

    assert_eq!(trigger.tick(), TickOutcome::Disarmed);
    assert!(events.is_empty());

    // Reconnecting arms it again
    manager.handle_event(LinkEvent::GotAddress(ADDRESS));
    assert_eq!(trigger.tick(), TickOutcome::Posted);
}

#[test]
fn test_queued_check_survives_disconnect() {
    let status = ConnectionStatus::new();
    let events = EventChannel::new();
    let trigger = CheckTrigger::new(&events);
    let journal = CallJournal::new();
    let mut manager = manager(&status, &trigger, 3);
    let mut coordinator = coordinator(&events, &journal);
    coordinator
        .transport()
        .queue_reply(MockReply::Failure(TransportError::Io));

    connect(&mut manager);
    assert_eq!(trigger.tick(), TickOutcome::Posted);
    manager.handle_event(LinkEvent::Disconnected);

    // The already-posted check still runs and fails on its own
    let outcome = block_on(coordinator.process_next());

    assert_eq!(
        outcome,
        SequenceOutcome::Failed(UpdateError::Transport(TransportError::Io))
    );
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
    assert_eq!(journal.restart_count(), 0);
}

#[test]
fn test_ticks_while_busy_are_dropped_not_queued() {
    let status = ConnectionStatus::new();
    let events = EventChannel::new();
    let trigger = CheckTrigger::new(&events);
    let journal = CallJournal::new();
    let mut manager = manager(&status, &trigger, 3);
    let mut coordinator = coordinator(&events, &journal);
    coordinator.transport().queue_reply(MockReply::status(204, b""));
    coordinator.transport().queue_reply(MockReply::status(404, b""));

    connect(&mut manager);
    assert_eq!(trigger.tick(), TickOutcome::Posted);
    assert_eq!(trigger.tick(), TickOutcome::Posted);
    assert_eq!(trigger.request_check(), TickOutcome::Dropped);

    block_on(async {
        assert_eq!(coordinator.process_next().await, SequenceOutcome::NoUpdate);
        assert_eq!(
            coordinator.process_next().await,
            SequenceOutcome::Failed(UpdateError::Protocol(404))
        );
    });

    assert!(events.is_empty());
    assert_eq!(coordinator.transport().get_requests().len(), 2);
}
