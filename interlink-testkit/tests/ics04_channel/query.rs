use interlink_core::channel::query::{
    query_channel, query_next_sequence_ack, query_next_sequence_receive,
    query_next_sequence_send, query_packet_acknowledgement, query_packet_commitment,
    query_packet_commitments, query_unreceived_acks, query_unreceived_packets, query_upgrade,
    query_upgrade_error,
};
use interlink_core::channel::types::channel::{Order, State};
use interlink_core::channel::types::error::{ChannelError, UpgradeError};
use interlink_core::handler::types::error::ContextError;
use interlink_core::host::types::identifiers::{ChannelId, Sequence};
use interlink_testkit::fixtures::core::channel::{
    dummy_packet, dummy_port_id, dummy_upgrade_fields, dummy_upgrade_timeout, dummy_version,
};
use interlink_testkit::relayer::context::RelayerContext;
use interlink_testkit::testapp::applications::dummy::{DummyModule, DUMMY_MODULE_ID, DUMMY_PORT_ID};
use interlink_testkit::testapp::core::router::MockRouter;
use rstest::*;

fn open_relayer(router_b: MockRouter, ordering: Order) -> (RelayerContext, ChannelId, ChannelId) {
    let mut relayer = RelayerContext::connected(MockRouter::new_with_dummy(), router_b);

    let (chan_id_on_a, chan_id_on_b) = relayer
        .open_channel(dummy_port_id(), dummy_port_id(), ordering, dummy_version())
        .unwrap();

    (relayer, chan_id_on_a, chan_id_on_b)
}

fn seqs(numbers: &[u64]) -> Vec<Sequence> {
    numbers.iter().copied().map(Sequence::from).collect()
}

#[test_log::test]
fn query_channel_and_sequences() {
    let (relayer, chan_id_on_a, chan_id_on_b) =
        open_relayer(MockRouter::new_with_dummy(), Order::Ordered);

    let identified = query_channel(relayer.get_ctx_a(), &dummy_port_id(), &chan_id_on_a).unwrap();
    assert_eq!(identified.port_id, dummy_port_id());
    assert_eq!(identified.channel_id, chan_id_on_a);
    assert_eq!(identified.channel_end.state, State::Open);
    assert_eq!(identified.channel_end.remote.channel_id, Some(chan_id_on_b));

    let ctx_a = relayer.get_ctx_a();
    let port_id = dummy_port_id();
    assert_eq!(
        query_next_sequence_send(ctx_a, &port_id, &chan_id_on_a).unwrap(),
        Sequence::from(1)
    );
    assert_eq!(
        query_next_sequence_receive(ctx_a, &port_id, &chan_id_on_a).unwrap(),
        Sequence::from(1)
    );
    assert_eq!(
        query_next_sequence_ack(ctx_a, &port_id, &chan_id_on_a).unwrap(),
        Sequence::from(1)
    );
}

#[test_log::test]
fn query_channel_unknown() {
    let (relayer, _, _) = open_relayer(MockRouter::new_with_dummy(), Order::Unordered);

    let res = query_channel(relayer.get_ctx_a(), &dummy_port_id(), &ChannelId::new(9));

    assert!(matches!(
        res,
        Err(ContextError::ChannelError(ChannelError::ChannelNotFound { .. }))
    ));
}

#[rstest]
#[case(Order::Unordered, &[1, 3])]
#[case(Order::Ordered, &[1, 2, 3])]
fn query_unreceived_packets_after_partial_relay(
    #[case] ordering: Order,
    #[case] expected: &[u64],
) {
    let (mut relayer, _, chan_id_on_b) = open_relayer(MockRouter::new_with_dummy(), ordering);

    for seq in 1..=3 {
        relayer.send_packet_on_a(dummy_packet(seq)).unwrap();
    }

    // an ordered end refuses packet 2 before packet 1
    if ordering == Order::Unordered {
        relayer.packet_recv_on_b(dummy_packet(2)).unwrap();
    }

    let unreceived = query_unreceived_packets(
        relayer.get_ctx_b(),
        &dummy_port_id(),
        &chan_id_on_b,
        seqs(&[1, 2, 3]),
    )
    .unwrap();

    assert_eq!(unreceived, seqs(expected));
}

#[test_log::test]
fn query_unreceived_packets_ordered_cursor() {
    let (mut relayer, _, chan_id_on_b) = open_relayer(MockRouter::new_with_dummy(), Order::Ordered);

    for seq in 1..=3 {
        relayer.send_packet_on_a(dummy_packet(seq)).unwrap();
    }
    relayer.packet_recv_on_b(dummy_packet(1)).unwrap();

    let unreceived = query_unreceived_packets(
        relayer.get_ctx_b(),
        &dummy_port_id(),
        &chan_id_on_b,
        seqs(&[1, 2, 3]),
    )
    .unwrap();

    assert_eq!(unreceived, seqs(&[2, 3]));
}

#[test_log::test]
fn query_commitments_and_unreceived_acks() {
    let (mut relayer, chan_id_on_a, chan_id_on_b) =
        open_relayer(MockRouter::new_with_dummy(), Order::Unordered);

    for seq in 1..=3 {
        relayer.send_packet_on_a(dummy_packet(seq)).unwrap();
    }

    let ack_2 = relayer.packet_recv_on_b(dummy_packet(2)).unwrap();
    relayer.packet_ack_on_a(dummy_packet(2), ack_2).unwrap();

    let ctx_a = relayer.get_ctx_a();
    let port_id = dummy_port_id();

    let mut in_flight = query_packet_commitments(ctx_a, &port_id, &chan_id_on_a).unwrap();
    in_flight.sort();
    assert_eq!(in_flight, seqs(&[1, 3]));

    assert!(query_packet_commitment(ctx_a, &port_id, &chan_id_on_a, Sequence::from(1)).is_ok());
    assert!(query_packet_commitment(ctx_a, &port_id, &chan_id_on_a, Sequence::from(2)).is_err());

    assert_eq!(
        query_unreceived_acks(ctx_a, &port_id, &chan_id_on_a, seqs(&[1, 2, 3])).unwrap(),
        seqs(&[1, 3])
    );

    let ctx_b = relayer.get_ctx_b();
    assert!(
        query_packet_acknowledgement(ctx_b, &port_id, &chan_id_on_b, Sequence::from(2)).is_ok()
    );
    assert!(
        query_packet_acknowledgement(ctx_b, &port_id, &chan_id_on_b, Sequence::from(1)).is_err()
    );
}

#[test_log::test]
fn query_upgrade_state() {
    let router_b = MockRouter::default().with_module(
        DUMMY_PORT_ID,
        DUMMY_MODULE_ID,
        DummyModule::default().rejecting_upgrades(),
    );
    let (mut relayer, chan_id_on_a, chan_id_on_b) = open_relayer(router_b, Order::Unordered);

    let port_id = dummy_port_id();

    assert!(matches!(
        query_upgrade(relayer.get_ctx_a(), &port_id, &chan_id_on_a),
        Err(ContextError::UpgradeError(UpgradeError::UpgradeNotFound { .. }))
    ));
    assert_eq!(
        query_upgrade_error(relayer.get_ctx_b(), &port_id, &chan_id_on_b).unwrap(),
        None
    );

    let fields = dummy_upgrade_fields(Order::Unordered, "dummy-2");
    relayer
        .upgrade_init_on_a(
            port_id.clone(),
            chan_id_on_a.clone(),
            fields.clone(),
            dummy_upgrade_timeout(),
        )
        .unwrap();

    let upgrade = query_upgrade(relayer.get_ctx_a(), &port_id, &chan_id_on_a).unwrap();
    assert_eq!(upgrade.fields, fields);

    relayer
        .upgrade_try_on_b(port_id.clone(), chan_id_on_b.clone())
        .unwrap();

    let receipt = query_upgrade_error(relayer.get_ctx_b(), &port_id, &chan_id_on_b)
        .unwrap()
        .expect("the rejected attempt leaves a receipt");
    assert_eq!(receipt.sequence, 1);
}
