use interlink_core::channel::types::channel::{Order, State};
use interlink_core::channel::types::error::ChannelError;
use interlink_core::channel::types::msgs::{ChannelMsg, MsgChannelCloseInit};
use interlink_core::entrypoint::{execute, validate};
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::{IbcEvent, MessageEvent};
use interlink_core::handler::types::msgs::MsgEnvelope;
use interlink_core::host::types::error::HostError;
use interlink_core::host::types::identifiers::{ChannelId, ConnectionId};
use interlink_core::host::types::path::ChannelEndPath;
use interlink_core::host::ValidationContext;
use interlink_testkit::fixtures::core::channel::{
    dummy_port_id, dummy_version, ChannelConfig, ConnectionConfig,
};
use interlink_testkit::fixtures::core::signer::dummy_account_id;
use interlink_testkit::relayer::context::RelayerContext;
use interlink_testkit::relayer::error::RelayerError;
use interlink_testkit::testapp::core::router::MockRouter;
use interlink_testkit::testapp::core::types::MockContext;
use rstest::*;

fn close_init_msg() -> MsgEnvelope {
    MsgEnvelope::Channel(ChannelMsg::CloseInit(MsgChannelCloseInit {
        port_id_on_a: dummy_port_id(),
        chan_id_on_a: ChannelId::zero(),
        signer: dummy_account_id(),
    }))
}

fn context_with_channel(state: State, owned: bool) -> MockContext {
    let ctx = MockContext::default()
        .with_connection(ConnectionId::zero(), ConnectionConfig::builder().build());

    let chan_end = ChannelConfig::builder().state(state).build();

    if owned {
        ctx.with_owned_channel(dummy_port_id(), ChannelId::zero(), chan_end)
    } else {
        ctx.with_channel(dummy_port_id(), ChannelId::zero(), chan_end)
    }
}

#[test_log::test]
fn chan_close_init_event_height() {
    let mut ctx = context_with_channel(State::Open, true);
    let mut router = MockRouter::new_with_dummy();

    let res = validate(&ctx, &router, close_init_msg());
    assert!(res.is_ok(), "Validation expected to succeed (happy path)");

    let res = execute(&mut ctx, &mut router, close_init_msg());
    assert!(res.is_ok(), "Execution of chan_close_init_msg should succeed");

    let ibc_events = ctx.get_events();

    assert_eq!(ibc_events.len(), 2);

    assert!(matches!(
        ibc_events[0],
        IbcEvent::Message(MessageEvent::Channel)
    ));

    assert!(matches!(ibc_events[1], IbcEvent::CloseInitChannel(_)));

    let chan_end = ctx
        .channel_end(&ChannelEndPath::new(&dummy_port_id(), &ChannelId::zero()))
        .unwrap();
    assert_eq!(chan_end.state, State::Closed);
}

#[rstest]
#[case(State::Init)]
#[case(State::TryOpen)]
#[case(State::Closed)]
fn chan_close_init_fail_channel_not_open(#[case] state: State) {
    let ctx = context_with_channel(state, true);

    let res = validate(&ctx, &MockRouter::new_with_dummy(), close_init_msg());

    assert!(matches!(
        res,
        Err(ContextError::ChannelError(ChannelError::InvalidState { .. }))
    ));
}

#[test_log::test]
fn chan_close_init_fail_without_capability() {
    let ctx = context_with_channel(State::Open, false);

    let res = validate(&ctx, &MockRouter::new_with_dummy(), close_init_msg());

    assert!(matches!(
        res,
        Err(ContextError::HostError(HostError::CapabilityNotFound { .. }))
    ));
}

#[rstest]
#[case(Order::Unordered)]
#[case(Order::Ordered)]
fn chan_close_handshake(#[case] ordering: Order) {
    let mut relayer =
        RelayerContext::connected(MockRouter::new_with_dummy(), MockRouter::new_with_dummy());

    let (chan_id_on_a, chan_id_on_b) = relayer
        .open_channel(dummy_port_id(), dummy_port_id(), ordering, dummy_version())
        .unwrap();

    relayer
        .close_channel(
            dummy_port_id(),
            chan_id_on_a.clone(),
            dummy_port_id(),
            chan_id_on_b.clone(),
        )
        .unwrap();

    assert_eq!(
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap()
            .state,
        State::Closed
    );
    assert_eq!(
        relayer
            .channel_end_on_b(&dummy_port_id(), &chan_id_on_b)
            .unwrap()
            .state,
        State::Closed
    );
    assert!(matches!(
        relayer.get_ctx_b().last_event(),
        Some(IbcEvent::CloseConfirmChannel(_))
    ));
}

#[test_log::test]
fn chan_close_confirm_fail_counterparty_still_open() {
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

    let res = relayer.channel_close_confirm_on_b(
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
        State::Open
    );
}
