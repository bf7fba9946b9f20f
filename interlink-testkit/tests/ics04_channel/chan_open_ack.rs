use interlink_core::channel::types::channel::{Order, State};
use interlink_core::channel::types::error::ChannelError;
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::{IbcEvent, MessageEvent};
use interlink_core::host::types::identifiers::{ChannelId, Sequence};
use interlink_core::host::types::path::{SeqAckPath, SeqRecvPath, SeqSendPath};
use interlink_core::host::ValidationContext;
use interlink_testkit::fixtures::core::channel::{dummy_port_id, dummy_version};
use interlink_testkit::relayer::context::RelayerContext;
use interlink_testkit::relayer::error::RelayerError;
use interlink_testkit::testapp::core::router::MockRouter;
use rstest::*;

pub struct Fixture {
    pub relayer: RelayerContext,
    pub chan_id_on_a: ChannelId,
    pub chan_id_on_b: ChannelId,
}

/// A channel that went through init on `A` and try on `B`.
#[fixture]
fn fixture() -> Fixture {
    let mut relayer =
        RelayerContext::connected(MockRouter::new_with_dummy(), MockRouter::new_with_dummy());

    let chan_id_on_a = relayer
        .channel_open_init_on_a(
            dummy_port_id(),
            dummy_port_id(),
            Order::Unordered,
            dummy_version(),
        )
        .unwrap();

    let chan_id_on_b = relayer
        .channel_open_try_on_b(dummy_port_id(), chan_id_on_a.clone(), dummy_port_id())
        .unwrap();

    Fixture {
        relayer,
        chan_id_on_a,
        chan_id_on_b,
    }
}

#[rstest]
fn chan_open_ack_happy_path(fixture: Fixture) {
    let Fixture {
        mut relayer,
        chan_id_on_a,
        chan_id_on_b,
    } = fixture;

    relayer
        .channel_open_ack_on_a(
            dummy_port_id(),
            chan_id_on_a.clone(),
            dummy_port_id(),
            chan_id_on_b.clone(),
        )
        .unwrap();

    let chan_end_on_a = relayer
        .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
        .unwrap();
    assert_eq!(chan_end_on_a.state, State::Open);
    assert_eq!(chan_end_on_a.counterparty().channel_id(), Some(&chan_id_on_b));

    let ctx_a = relayer.get_ctx_a();
    let port_id = dummy_port_id();
    assert_eq!(
        ctx_a
            .get_next_sequence_send(&SeqSendPath::new(&port_id, &chan_id_on_a))
            .unwrap(),
        Sequence::from(1)
    );
    assert_eq!(
        ctx_a
            .get_next_sequence_recv(&SeqRecvPath::new(&port_id, &chan_id_on_a))
            .unwrap(),
        Sequence::from(1)
    );
    assert_eq!(
        ctx_a
            .get_next_sequence_ack(&SeqAckPath::new(&port_id, &chan_id_on_a))
            .unwrap(),
        Sequence::from(1)
    );

    let ibc_events = ctx_a.get_events();
    let n = ibc_events.len();
    assert!(matches!(
        ibc_events[n - 2],
        IbcEvent::Message(MessageEvent::Channel)
    ));
    assert!(matches!(ibc_events[n - 1], IbcEvent::OpenAckChannel(_)));
}

#[rstest]
fn chan_open_ack_fail_twice(fixture: Fixture) {
    let Fixture {
        mut relayer,
        chan_id_on_a,
        chan_id_on_b,
    } = fixture;

    relayer
        .channel_open_ack_on_a(
            dummy_port_id(),
            chan_id_on_a.clone(),
            dummy_port_id(),
            chan_id_on_b.clone(),
        )
        .unwrap();

    let res = relayer.channel_open_ack_on_a(
        dummy_port_id(),
        chan_id_on_a,
        dummy_port_id(),
        chan_id_on_b,
    );

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::ChannelError(
            ChannelError::InvalidState { .. }
        )))
    ));
}

#[rstest]
fn chan_open_ack_fail_wrong_counterparty_channel(fixture: Fixture) {
    let Fixture {
        mut relayer,
        chan_id_on_a,
        ..
    } = fixture;

    // nothing lives under channel-7 on B
    let res = relayer.channel_open_ack_on_a(
        dummy_port_id(),
        chan_id_on_a.clone(),
        dummy_port_id(),
        ChannelId::new(7),
    );

    assert!(matches!(
        res,
        Err(RelayerError::QueryFailed(ContextError::ChannelError(
            ChannelError::ChannelNotFound { .. }
        )))
    ));
    assert_eq!(
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap()
            .state,
        State::Init
    );
}
