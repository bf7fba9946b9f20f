use interlink_core::channel::types::channel::{Order, State};
use interlink_core::channel::types::error::ChannelError;
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::IbcEvent;
use interlink_core::host::types::identifiers::{ChannelId, Sequence};
use interlink_core::host::types::path::SeqRecvPath;
use interlink_core::host::ValidationContext;
use interlink_testkit::fixtures::core::channel::{dummy_port_id, dummy_version};
use interlink_testkit::relayer::context::RelayerContext;
use interlink_testkit::relayer::error::RelayerError;
use interlink_testkit::testapp::core::router::MockRouter;
use rstest::*;

fn init_and_try(ordering: Order) -> (RelayerContext, ChannelId, ChannelId) {
    let mut relayer =
        RelayerContext::connected(MockRouter::new_with_dummy(), MockRouter::new_with_dummy());

    let chan_id_on_a = relayer
        .channel_open_init_on_a(dummy_port_id(), dummy_port_id(), ordering, dummy_version())
        .unwrap();

    let chan_id_on_b = relayer
        .channel_open_try_on_b(dummy_port_id(), chan_id_on_a.clone(), dummy_port_id())
        .unwrap();

    (relayer, chan_id_on_a, chan_id_on_b)
}

#[rstest]
#[case(Order::Unordered)]
#[case(Order::Ordered)]
fn chan_open_confirm_happy_path(#[case] ordering: Order) {
    let (mut relayer, chan_id_on_a, chan_id_on_b) = init_and_try(ordering);

    relayer
        .channel_open_ack_on_a(
            dummy_port_id(),
            chan_id_on_a.clone(),
            dummy_port_id(),
            chan_id_on_b.clone(),
        )
        .unwrap();

    relayer
        .channel_open_confirm_on_b(
            dummy_port_id(),
            chan_id_on_a,
            dummy_port_id(),
            chan_id_on_b.clone(),
        )
        .unwrap();

    let chan_end_on_b = relayer
        .channel_end_on_b(&dummy_port_id(), &chan_id_on_b)
        .unwrap();
    assert_eq!(chan_end_on_b.state, State::Open);
    assert_eq!(chan_end_on_b.ordering, ordering);

    assert_eq!(
        relayer
            .get_ctx_b()
            .get_next_sequence_recv(&SeqRecvPath::new(&dummy_port_id(), &chan_id_on_b))
            .unwrap(),
        Sequence::from(1)
    );

    assert!(matches!(
        relayer.get_ctx_b().last_event(),
        Some(IbcEvent::OpenConfirmChannel(_))
    ));
}

#[test_log::test]
fn chan_open_confirm_fail_before_ack() {
    let (mut relayer, chan_id_on_a, chan_id_on_b) = init_and_try(Order::Unordered);

    // A is still in INIT, so its channel end does not match the OPEN one B expects
    let res = relayer.channel_open_confirm_on_b(
        dummy_port_id(),
        chan_id_on_a,
        dummy_port_id(),
        chan_id_on_b.clone(),
    );

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::ChannelError(
            ChannelError::VerifyChannelFailed(_)
        )))
    ));
    assert_eq!(
        relayer
            .channel_end_on_b(&dummy_port_id(), &chan_id_on_b)
            .unwrap()
            .state,
        State::TryOpen
    );
}
