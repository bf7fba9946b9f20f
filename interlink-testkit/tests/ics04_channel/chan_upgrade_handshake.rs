use interlink_core::channel::types::channel::{Order, State};
use interlink_core::channel::types::error::{ChannelError, PacketError};
use interlink_core::channel::types::Version;
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::IbcEvent;
use interlink_core::host::types::identifiers::{ChannelId, Sequence};
use interlink_core::host::types::path::{ChannelUpgradePath, SeqAckPath, SeqRecvPath};
use interlink_core::host::ValidationContext;
use interlink_testkit::fixtures::core::channel::{
    dummy_packet, dummy_port_id, dummy_upgrade_fields, dummy_upgrade_timeout, dummy_version,
};
use interlink_testkit::relayer::context::RelayerContext;
use interlink_testkit::relayer::error::RelayerError;
use interlink_testkit::testapp::core::router::MockRouter;
use interlink_testkit::testapp::core::types::MockContext;

fn open_relayer() -> (RelayerContext, ChannelId, ChannelId) {
    let mut relayer =
        RelayerContext::connected(MockRouter::new_with_dummy(), MockRouter::new_with_dummy());

    let (chan_id_on_a, chan_id_on_b) = relayer
        .open_channel(
            dummy_port_id(),
            dummy_port_id(),
            Order::Unordered,
            dummy_version(),
        )
        .unwrap();

    (relayer, chan_id_on_a, chan_id_on_b)
}

fn next_sequences(ctx: &MockContext, chan_id: &ChannelId) -> (Sequence, Sequence) {
    let recv = ctx
        .get_next_sequence_recv(&SeqRecvPath::new(&dummy_port_id(), chan_id))
        .unwrap();
    let ack = ctx
        .get_next_sequence_ack(&SeqAckPath::new(&dummy_port_id(), chan_id))
        .unwrap();

    (recv, ack)
}

#[test_log::test]
fn upgrade_unordered_to_ordered() {
    let (mut relayer, chan_id_on_a, chan_id_on_b) = open_relayer();

    relayer.relay_packet(dummy_packet(1)).unwrap();
    relayer.relay_packet(dummy_packet(2)).unwrap();

    let mut relayer = relayer.reverse();
    relayer.relay_packet(dummy_packet(1)).unwrap();
    let mut relayer = relayer.reverse();

    relayer
        .upgrade_channel(
            dummy_port_id(),
            chan_id_on_a.clone(),
            dummy_upgrade_fields(Order::Ordered, "dummy-1"),
            dummy_upgrade_timeout(),
        )
        .unwrap();

    for chan_end in [
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap(),
        relayer
            .channel_end_on_b(&dummy_port_id(), &chan_id_on_b)
            .unwrap(),
    ] {
        assert_eq!(chan_end.state, State::Open);
        assert_eq!(chan_end.ordering, Order::Ordered);
        assert_eq!(chan_end.upgrade_sequence, 1);
    }

    // each end expects what the other one stopped sending at, and acks from
    // where it stopped sending itself
    assert_eq!(
        next_sequences(relayer.get_ctx_a(), &chan_id_on_a),
        (Sequence::from(2), Sequence::from(3))
    );
    assert_eq!(
        next_sequences(relayer.get_ctx_b(), &chan_id_on_b),
        (Sequence::from(3), Sequence::from(2))
    );

    for ctx in [relayer.get_ctx_a(), relayer.get_ctx_b()] {
        assert!(ctx
            .channel_upgrade(&ChannelUpgradePath::new(&dummy_port_id(), &ChannelId::zero()))
            .unwrap()
            .is_none());
    }

    assert!(matches!(
        relayer.get_ctx_a().last_event(),
        Some(IbcEvent::UpgradeOpenChannel(_))
    ));
    assert!(relayer
        .get_ctx_a()
        .get_logs()
        .contains(&"dummy: dummy/channel-0 now runs dummy-1".to_string()));

    // the upgraded channel delivers in order from where it left off
    relayer.relay_packet(dummy_packet(3)).unwrap();

    assert_eq!(
        next_sequences(relayer.get_ctx_b(), &chan_id_on_b).0,
        Sequence::from(4)
    );
    assert_eq!(
        next_sequences(relayer.get_ctx_a(), &chan_id_on_a).1,
        Sequence::from(4)
    );
}

#[test_log::test]
fn upgrade_version_only() {
    let (mut relayer, chan_id_on_a, chan_id_on_b) = open_relayer();

    relayer.relay_packet(dummy_packet(1)).unwrap();

    relayer
        .upgrade_channel(
            dummy_port_id(),
            chan_id_on_a.clone(),
            dummy_upgrade_fields(Order::Unordered, "dummy-2"),
            dummy_upgrade_timeout(),
        )
        .unwrap();

    let new_version = Version::new("dummy-2".to_string());

    for chan_end in [
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap(),
        relayer
            .channel_end_on_b(&dummy_port_id(), &chan_id_on_b)
            .unwrap(),
    ] {
        assert_eq!(chan_end.state, State::Open);
        assert_eq!(chan_end.ordering, Order::Unordered);
        assert_eq!(chan_end.version, new_version);
    }

    relayer.relay_packet(dummy_packet(2)).unwrap();
}

#[test_log::test]
fn upgrade_with_packets_in_flight() {
    let (mut relayer, chan_id_on_a, chan_id_on_b) = open_relayer();

    let packet = dummy_packet(1);
    relayer.send_packet_on_a(packet.clone()).unwrap();

    relayer
        .upgrade_init_on_a(
            dummy_port_id(),
            chan_id_on_a.clone(),
            dummy_upgrade_fields(Order::Unordered, "dummy-2"),
            dummy_upgrade_timeout(),
        )
        .unwrap();
    relayer
        .upgrade_try_on_b(dummy_port_id(), chan_id_on_b.clone())
        .unwrap();
    relayer
        .upgrade_ack_on_a(dummy_port_id(), chan_id_on_a.clone())
        .unwrap();

    let upgrade_on_a = relayer
        .get_ctx_a()
        .channel_upgrade(&ChannelUpgradePath::new(&dummy_port_id(), &chan_id_on_a))
        .unwrap()
        .expect("upgrade is stored");
    assert_eq!(upgrade_on_a.next_sequence_send, Sequence::from(2));
    assert_eq!(
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap()
            .state,
        State::Flushing
    );

    // a flushing channel sends nothing new
    let res = relayer.send_packet_on_a(dummy_packet(2));
    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::PacketError(
            PacketError::Channel(ChannelError::InvalidState { .. })
        )))
    ));

    relayer
        .upgrade_confirm_on_b(dummy_port_id(), chan_id_on_b.clone())
        .unwrap();

    // B has nothing of its own in flight, but A is still flushing
    assert_eq!(
        relayer
            .channel_end_on_b(&dummy_port_id(), &chan_id_on_b)
            .unwrap()
            .state,
        State::FlushComplete
    );

    // A cannot commit before its last packet is acknowledged
    let res = relayer.upgrade_open_on_a(dummy_port_id(), chan_id_on_a.clone());
    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::ChannelError(
            ChannelError::InvalidState { .. }
        )))
    ));

    let acknowledgement = relayer.packet_recv_on_b(packet.clone()).unwrap();
    relayer.packet_ack_on_a(packet, acknowledgement).unwrap();

    assert_eq!(
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap()
            .state,
        State::FlushComplete
    );

    relayer
        .upgrade_open_on_a(dummy_port_id(), chan_id_on_a.clone())
        .unwrap();

    let mut relayer = relayer.reverse();
    relayer
        .upgrade_open_on_a(dummy_port_id(), chan_id_on_b.clone())
        .unwrap();
    let mut relayer = relayer.reverse();

    let new_version = Version::new("dummy-2".to_string());

    for chan_end in [
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap(),
        relayer
            .channel_end_on_b(&dummy_port_id(), &chan_id_on_b)
            .unwrap(),
    ] {
        assert_eq!(chan_end.state, State::Open);
        assert_eq!(chan_end.version, new_version);
    }

    relayer.relay_packet(dummy_packet(2)).unwrap();
}
