use interlink_core::channel::types::channel::Order;
use interlink_core::channel::types::error::PacketError;
use interlink_core::channel::types::packet::{Packet, Receipt};
use interlink_core::channel::types::timeout::TimeoutHeight;
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::{IbcEvent, MessageEvent};
use interlink_core::host::types::identifiers::{ChannelId, Sequence};
use interlink_core::host::types::path::{AckPath, SeqRecvPath};
use interlink_core::host::ValidationContext;
use interlink_testkit::fixtures::core::channel::{dummy_packet, dummy_port_id, dummy_version};
use interlink_testkit::relayer::context::RelayerContext;
use interlink_testkit::relayer::error::RelayerError;
use interlink_testkit::testapp::applications::dummy::{
    dummy_error_ack, dummy_success_ack, DummyModule, DUMMY_MODULE_ID, DUMMY_PORT_ID,
};
use interlink_testkit::testapp::core::router::MockRouter;
use rstest::*;

fn open_relayer(router_b: MockRouter, ordering: Order) -> (RelayerContext, ChannelId, ChannelId) {
    let mut relayer = RelayerContext::connected(MockRouter::new_with_dummy(), router_b);

    let (chan_id_on_a, chan_id_on_b) = relayer
        .open_channel(dummy_port_id(), dummy_port_id(), ordering, dummy_version())
        .unwrap();

    (relayer, chan_id_on_a, chan_id_on_b)
}

#[rstest]
#[case(Order::Unordered)]
#[case(Order::Ordered)]
fn recv_packet_happy_path(#[case] ordering: Order) {
    let (mut relayer, _, chan_id_on_b) = open_relayer(MockRouter::new_with_dummy(), ordering);

    let packet = dummy_packet(1);
    relayer.send_packet_on_a(packet.clone()).unwrap();

    let events_before = relayer.get_ctx_b().get_events().len();

    let acknowledgement = relayer.packet_recv_on_b(packet.clone()).unwrap();
    assert_eq!(acknowledgement, dummy_success_ack());

    let ibc_events: Vec<_> = relayer
        .get_ctx_b()
        .get_events()
        .into_iter()
        .skip(events_before)
        .collect();

    assert_eq!(ibc_events.len(), 5);
    assert!(matches!(
        ibc_events[0],
        IbcEvent::Message(MessageEvent::Channel)
    ));
    assert!(matches!(ibc_events[1], IbcEvent::ReceivePacket(_)));
    assert!(matches!(
        ibc_events[2],
        IbcEvent::Message(MessageEvent::Channel)
    ));
    assert!(matches!(ibc_events[3], IbcEvent::WriteAcknowledgement(_)));
    let IbcEvent::Module(module_event) = &ibc_events[4] else {
        panic!("expected a module event, got {:?}", ibc_events[4]);
    };
    assert_eq!(module_event.kind, "dummy_recv");

    let ctx_b = relayer.get_ctx_b();
    let port_id = dummy_port_id();

    assert!(ctx_b
        .get_packet_acknowledgement(&AckPath::new(&port_id, &chan_id_on_b, Sequence::from(1)))
        .is_ok());

    match ordering {
        Order::Unordered => assert!(matches!(
            ctx_b.packet_receipt(&port_id, &chan_id_on_b, Sequence::from(1)),
            Receipt::Ok
        )),
        _ => assert_eq!(
            ctx_b
                .get_next_sequence_recv(&SeqRecvPath::new(&port_id, &chan_id_on_b))
                .unwrap(),
            Sequence::from(2)
        ),
    }
}

#[test_log::test]
fn recv_packet_error_acknowledgement() {
    let router_b = MockRouter::default().with_module(
        DUMMY_PORT_ID,
        DUMMY_MODULE_ID,
        DummyModule::default().failing_receives(),
    );
    let (mut relayer, _, chan_id_on_b) = open_relayer(router_b, Order::Unordered);

    let acknowledgement = relayer.relay_packet(dummy_packet(1)).unwrap();

    assert_eq!(acknowledgement, dummy_error_ack());

    // the packet still counts as received
    assert!(matches!(
        relayer
            .get_ctx_b()
            .packet_receipt(&dummy_port_id(), &chan_id_on_b, Sequence::from(1)),
        Receipt::Ok
    ));
    assert!(relayer
        .get_ctx_b()
        .get_logs()
        .contains(&"dummy: rejected packet 1".to_string()));
}

#[rstest]
#[case(Order::Unordered)]
#[case(Order::Ordered)]
fn recv_packet_twice_is_a_no_op(#[case] ordering: Order) {
    let (mut relayer, _, _) = open_relayer(MockRouter::new_with_dummy(), ordering);

    let packet = dummy_packet(1);
    relayer.send_packet_on_a(packet.clone()).unwrap();
    relayer.packet_recv_on_b(packet.clone()).unwrap();

    let events_before = relayer.get_ctx_b().get_events().len();

    // the message goes through, but nothing is written a second time
    let res = relayer.packet_recv_on_b(packet);

    assert!(matches!(res, Err(RelayerError::MissingEvent { .. })));
    assert_eq!(relayer.get_ctx_b().get_events().len(), events_before);
}

#[test_log::test]
fn recv_packet_ordered_out_of_order() {
    let (mut relayer, _, chan_id_on_b) = open_relayer(MockRouter::new_with_dummy(), Order::Ordered);

    relayer.send_packet_on_a(dummy_packet(1)).unwrap();
    relayer.send_packet_on_a(dummy_packet(2)).unwrap();

    let res = relayer.packet_recv_on_b(dummy_packet(2));

    let Err(RelayerError::TransactionFailed(ContextError::PacketError(
        PacketError::PacketSequenceMismatch { expected, actual },
    ))) = res
    else {
        panic!("expected a sequence mismatch, got {res:?}");
    };
    assert_eq!(expected, Sequence::from(1));
    assert_eq!(actual, Sequence::from(2));

    relayer.packet_recv_on_b(dummy_packet(1)).unwrap();
    relayer.packet_recv_on_b(dummy_packet(2)).unwrap();

    assert_eq!(
        relayer
            .get_ctx_b()
            .get_next_sequence_recv(&SeqRecvPath::new(&dummy_port_id(), &chan_id_on_b))
            .unwrap(),
        Sequence::from(3)
    );
}

#[test_log::test]
fn recv_packet_unordered_any_order() {
    let (mut relayer, _, chan_id_on_b) =
        open_relayer(MockRouter::new_with_dummy(), Order::Unordered);

    for seq in 1..=3 {
        relayer.send_packet_on_a(dummy_packet(seq)).unwrap();
    }

    for seq in [3, 1, 2] {
        relayer.packet_recv_on_b(dummy_packet(seq)).unwrap();
    }

    for seq in 1..=3 {
        assert!(matches!(
            relayer
                .get_ctx_b()
                .packet_receipt(&dummy_port_id(), &chan_id_on_b, Sequence::from(seq)),
            Receipt::Ok
        ));
    }
}

#[test_log::test]
fn recv_packet_fail_timed_out() {
    let (mut relayer, _, _) = open_relayer(MockRouter::new_with_dummy(), Order::Unordered);

    let packet = Packet {
        timeout_height_on_b: TimeoutHeight::At(relayer.get_ctx_b().latest_height().add(2)),
        ..dummy_packet(1)
    };
    relayer.send_packet_on_a(packet.clone()).unwrap();

    relayer.get_ctx_b_mut().advance_block();
    relayer.get_ctx_b_mut().advance_block();

    let res = relayer.packet_recv_on_b(packet);

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::PacketError(
            PacketError::PacketTimeoutElapsed { .. }
        )))
    ));
}

#[test_log::test]
fn recv_packet_fail_never_sent() {
    let (mut relayer, _, _) = open_relayer(MockRouter::new_with_dummy(), Order::Unordered);

    let res = relayer.packet_recv_on_b(dummy_packet(1));

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::PacketError(
            PacketError::PacketVerificationFailed { .. }
        )))
    ));
}
