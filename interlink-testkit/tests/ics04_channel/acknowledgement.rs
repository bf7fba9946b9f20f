use interlink_core::channel::types::channel::Order;
use interlink_core::channel::types::error::PacketError;
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::IbcEvent;
use interlink_core::host::types::identifiers::{ChannelId, Sequence};
use interlink_core::host::types::path::{CommitmentPath, SeqAckPath};
use interlink_core::host::ValidationContext;
use interlink_testkit::fixtures::core::channel::{dummy_packet, dummy_port_id, dummy_version};
use interlink_testkit::relayer::context::RelayerContext;
use interlink_testkit::relayer::error::RelayerError;
use interlink_testkit::testapp::applications::dummy::dummy_error_ack;
use interlink_testkit::testapp::core::router::MockRouter;
use rstest::*;

pub struct Fixture {
    pub relayer: RelayerContext,
    pub chan_id_on_a: ChannelId,
}

fn open_fixture(ordering: Order) -> Fixture {
    let mut relayer =
        RelayerContext::connected(MockRouter::new_with_dummy(), MockRouter::new_with_dummy());

    let (chan_id_on_a, _) = relayer
        .open_channel(dummy_port_id(), dummy_port_id(), ordering, dummy_version())
        .unwrap();

    Fixture {
        relayer,
        chan_id_on_a,
    }
}

#[rstest]
#[case(Order::Unordered)]
#[case(Order::Ordered)]
fn ack_happy_path(#[case] ordering: Order) {
    let Fixture {
        mut relayer,
        chan_id_on_a,
    } = open_fixture(ordering);

    let packet = dummy_packet(1);
    let acknowledgement = relayer.relay_packet(packet.clone()).unwrap();

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

    let Some(IbcEvent::AcknowledgePacket(event)) = ctx_a.last_event() else {
        panic!("expected an acknowledge packet event");
    };
    assert_eq!(event.packet, packet);
    assert_eq!(event.channel_ordering, ordering);

    if ordering == Order::Ordered {
        assert_eq!(
            ctx_a
                .get_next_sequence_ack(&SeqAckPath::new(&dummy_port_id(), &chan_id_on_a))
                .unwrap(),
            Sequence::from(2)
        );
    }

    // acknowledging the same packet again finds nothing to clear
    let res = relayer.packet_ack_on_a(packet, acknowledgement);

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::PacketError(
            PacketError::PacketCommitmentNotFound { .. }
        )))
    ));
}

#[test_log::test]
fn ack_fail_forged_acknowledgement() {
    let Fixture { mut relayer, .. } = open_fixture(Order::Unordered);

    let packet = dummy_packet(1);
    relayer.send_packet_on_a(packet.clone()).unwrap();
    relayer.packet_recv_on_b(packet.clone()).unwrap();

    // B wrote a success acknowledgement
    let res = relayer.packet_ack_on_a(packet, dummy_error_ack());

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::PacketError(
            PacketError::PacketVerificationFailed { .. }
        )))
    ));
}

#[test_log::test]
fn ack_fail_modified_packet() {
    let Fixture { mut relayer, .. } = open_fixture(Order::Unordered);

    let packet = dummy_packet(1);
    let acknowledgement = relayer.relay_packet(packet.clone()).unwrap();

    relayer.send_packet_on_a(dummy_packet(2)).unwrap();
    relayer.packet_recv_on_b(dummy_packet(2)).unwrap();

    let mut tampered = dummy_packet(2);
    tampered.data = b"pong".to_vec();

    let res = relayer.packet_ack_on_a(tampered, acknowledgement);

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::PacketError(
            PacketError::IncorrectPacketCommitment { .. }
        )))
    ));
}

#[test_log::test]
fn ack_ordered_out_of_order() {
    let Fixture { mut relayer, .. } = open_fixture(Order::Ordered);

    relayer.send_packet_on_a(dummy_packet(1)).unwrap();
    relayer.send_packet_on_a(dummy_packet(2)).unwrap();

    let ack_1 = relayer.packet_recv_on_b(dummy_packet(1)).unwrap();
    let ack_2 = relayer.packet_recv_on_b(dummy_packet(2)).unwrap();

    let res = relayer.packet_ack_on_a(dummy_packet(2), ack_2.clone());

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::PacketError(
            PacketError::PacketSequenceMismatch { .. }
        )))
    ));

    relayer.packet_ack_on_a(dummy_packet(1), ack_1).unwrap();
    relayer.packet_ack_on_a(dummy_packet(2), ack_2).unwrap();
}
