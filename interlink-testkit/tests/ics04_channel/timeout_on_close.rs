use interlink_core::channel::types::channel::{Order, State};
use interlink_core::channel::types::error::{ChannelError, PacketError};
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::IbcEvent;
use interlink_core::host::types::identifiers::{ChannelId, Sequence};
use interlink_core::host::types::path::CommitmentPath;
use interlink_core::host::ValidationContext;
use interlink_testkit::fixtures::core::channel::{dummy_packet, dummy_port_id, dummy_version};
use interlink_testkit::relayer::context::RelayerContext;
use interlink_testkit::relayer::error::RelayerError;
use interlink_testkit::testapp::core::router::MockRouter;
use rstest::*;

fn open_and_send(ordering: Order) -> (RelayerContext, ChannelId, ChannelId) {
    let mut relayer =
        RelayerContext::connected(MockRouter::new_with_dummy(), MockRouter::new_with_dummy());

    let (chan_id_on_a, chan_id_on_b) = relayer
        .open_channel(dummy_port_id(), dummy_port_id(), ordering, dummy_version())
        .unwrap();

    relayer.send_packet_on_a(dummy_packet(1)).unwrap();

    (relayer, chan_id_on_a, chan_id_on_b)
}

/// `B` closes its end of the channel on its own.
fn close_on_b(relayer: RelayerContext, chan_id_on_b: ChannelId) -> RelayerContext {
    let mut relayer = relayer.reverse();

    relayer
        .channel_close_init_on_a(dummy_port_id(), chan_id_on_b)
        .unwrap();

    relayer.reverse()
}

#[rstest]
#[case(Order::Unordered)]
#[case(Order::Ordered)]
fn timeout_on_close_happy_path(#[case] ordering: Order) {
    let (relayer, chan_id_on_a, chan_id_on_b) = open_and_send(ordering);
    let mut relayer = close_on_b(relayer, chan_id_on_b);

    relayer
        .packet_timeout_on_close_on_a(dummy_packet(1))
        .unwrap();

    let ctx_a = relayer.get_ctx_a();

    assert!(ctx_a
        .get_packet_commitment(&CommitmentPath::new(
            &dummy_port_id(),
            &chan_id_on_a,
            Sequence::from(1)
        ))
        .is_err());

    let expected_state = match ordering {
        Order::Ordered => State::Closed,
        _ => State::Open,
    };
    assert_eq!(
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap()
            .state,
        expected_state
    );

    assert!(relayer
        .get_ctx_a()
        .get_events()
        .iter()
        .any(|event| matches!(event, IbcEvent::TimeoutPacket(_))));
}

#[test_log::test]
fn timeout_on_close_fail_counterparty_open() {
    let (mut relayer, _, _) = open_and_send(Order::Unordered);

    let res = relayer.packet_timeout_on_close_on_a(dummy_packet(1));

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::ChannelError(
            ChannelError::VerifyChannelFailed(_)
        )))
    ));
}

#[test_log::test]
fn timeout_on_close_fail_packet_received() {
    let (mut relayer, _, chan_id_on_b) = open_and_send(Order::Unordered);

    relayer.packet_recv_on_b(dummy_packet(1)).unwrap();

    let mut relayer = close_on_b(relayer, chan_id_on_b);

    let res = relayer.packet_timeout_on_close_on_a(dummy_packet(1));

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::PacketError(
            PacketError::PacketVerificationFailed { .. }
        )))
    ));
}
