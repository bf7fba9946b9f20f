use interlink_core::channel::types::channel::{Order, State};
use interlink_core::channel::types::error::PacketError;
use interlink_core::channel::types::packet::Packet;
use interlink_core::channel::types::timeout::TimeoutHeight;
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::{IbcEvent, MessageEvent};
use interlink_core::host::types::identifiers::{ChannelId, Sequence};
use interlink_core::host::types::path::CommitmentPath;
use interlink_core::host::ValidationContext;
use interlink_testkit::fixtures::core::channel::{dummy_packet, dummy_port_id, dummy_version};
use interlink_testkit::relayer::context::RelayerContext;
use interlink_testkit::relayer::error::RelayerError;
use interlink_testkit::testapp::core::router::MockRouter;
use rstest::*;

const TIMEOUT_OFFSET: u64 = 2;

/// Opens a channel and sends a packet from `A` that times out
/// `TIMEOUT_OFFSET` blocks after `B`'s current height.
fn sent_packet(ordering: Order) -> (RelayerContext, ChannelId, Packet) {
    let mut relayer =
        RelayerContext::connected(MockRouter::new_with_dummy(), MockRouter::new_with_dummy());

    let (chan_id_on_a, _) = relayer
        .open_channel(dummy_port_id(), dummy_port_id(), ordering, dummy_version())
        .unwrap();

    let packet = Packet {
        timeout_height_on_b: TimeoutHeight::At(
            relayer.get_ctx_b().latest_height().add(TIMEOUT_OFFSET),
        ),
        ..dummy_packet(1)
    };
    relayer.send_packet_on_a(packet.clone()).unwrap();

    (relayer, chan_id_on_a, packet)
}

fn expire_on_b(relayer: &mut RelayerContext) {
    for _ in 0..TIMEOUT_OFFSET {
        relayer.get_ctx_b_mut().advance_block();
    }
}

#[test_log::test]
fn timeout_unordered_happy_path() {
    let (mut relayer, chan_id_on_a, packet) = sent_packet(Order::Unordered);

    expire_on_b(&mut relayer);

    let events_before = relayer.get_ctx_a().get_events().len();

    relayer.packet_timeout_on_a(packet.clone()).unwrap();

    let ctx_a = relayer.get_ctx_a();

    assert!(matches!(
        ctx_a.get_packet_commitment(&CommitmentPath::new(
            &dummy_port_id(),
            &chan_id_on_a,
            Sequence::from(1)
        )),
        Err(ContextError::PacketError(
            PacketError::PacketCommitmentNotFound { .. }
        ))
    ));

    let ibc_events: Vec<_> = ctx_a.get_events().into_iter().skip(events_before).collect();

    assert_eq!(ibc_events.len(), 2);
    assert!(matches!(
        ibc_events[0],
        IbcEvent::Message(MessageEvent::Channel)
    ));
    let IbcEvent::TimeoutPacket(event) = &ibc_events[1] else {
        panic!("expected a timeout packet event, got {:?}", ibc_events[1]);
    };
    assert_eq!(event.packet, packet);

    assert_eq!(
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap()
            .state,
        State::Open
    );
}

#[test_log::test]
fn timeout_ordered_closes_channel() {
    let (mut relayer, chan_id_on_a, packet) = sent_packet(Order::Ordered);

    expire_on_b(&mut relayer);

    relayer.packet_timeout_on_a(packet).unwrap();

    assert_eq!(
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap()
            .state,
        State::Closed
    );
    assert!(matches!(
        relayer.get_ctx_a().last_event(),
        Some(IbcEvent::ChannelClosed(_))
    ));
}

#[rstest]
#[case(Order::Unordered)]
#[case(Order::Ordered)]
fn timeout_fail_not_reached(#[case] ordering: Order) {
    let (mut relayer, chan_id_on_a, packet) = sent_packet(ordering);

    let res = relayer.packet_timeout_on_a(packet);

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::PacketError(
            PacketError::PacketTimeoutNotReached { .. }
        )))
    ));
    assert!(relayer
        .get_ctx_a()
        .get_packet_commitment(&CommitmentPath::new(
            &dummy_port_id(),
            &chan_id_on_a,
            Sequence::from(1)
        ))
        .is_ok());
}

#[test_log::test]
fn timeout_fail_twice() {
    let (mut relayer, _, packet) = sent_packet(Order::Unordered);

    expire_on_b(&mut relayer);

    relayer.packet_timeout_on_a(packet.clone()).unwrap();

    let res = relayer.packet_timeout_on_a(packet);

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::PacketError(
            PacketError::PacketCommitmentNotFound { .. }
        )))
    ));
}

#[test_log::test]
fn timeout_fail_unordered_packet_received() {
    let (mut relayer, _, packet) = sent_packet(Order::Unordered);

    relayer.packet_recv_on_b(packet.clone()).unwrap();
    expire_on_b(&mut relayer);

    let res = relayer.packet_timeout_on_a(packet);

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::PacketError(
            PacketError::PacketVerificationFailed { .. }
        )))
    ));
}

#[test_log::test]
fn timeout_fail_ordered_packet_received() {
    let (mut relayer, chan_id_on_a, packet) = sent_packet(Order::Ordered);

    relayer.packet_recv_on_b(packet.clone()).unwrap();
    expire_on_b(&mut relayer);

    let res = relayer.packet_timeout_on_a(packet);

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::PacketError(
            PacketError::PacketAlreadyReceived { .. }
        )))
    ));
    assert_eq!(
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap()
            .state,
        State::Open
    );
}
