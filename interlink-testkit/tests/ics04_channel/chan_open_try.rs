use interlink_core::channel::types::channel::{Order, State};
use interlink_core::channel::types::error::ChannelError;
use interlink_core::channel::types::msgs::{ChannelMsg, MsgChannelOpenTry};
use interlink_core::channel::types::packet::Packet;
use interlink_core::channel::types::timeout::TimeoutHeight;
use interlink_core::channel::types::Version;
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::IbcEvent;
use interlink_core::handler::types::msgs::MsgEnvelope;
use interlink_core::host::types::error::HostError;
use interlink_core::host::types::identifiers::{ChannelId, ConnectionId, PortId};
use interlink_core::host::types::path::{ChannelCapabilityPath, ChannelEndPath};
use interlink_core::host::{ExecutionContext, ValidationContext};
use interlink_testkit::fixtures::core::channel::{dummy_packet, dummy_port_id, dummy_version};
use interlink_testkit::fixtures::core::signer::dummy_account_id;
use interlink_testkit::relayer::context::RelayerContext;
use interlink_testkit::relayer::error::RelayerError;
use interlink_testkit::testapp::applications::account_host::{
    account_version, ACCOUNT_HOST_PORT_ID,
};
use interlink_testkit::testapp::core::router::MockRouter;
use rstest::*;

const OWNER: &str = "cosmos1owner";

fn account_host_port_id() -> PortId {
    PortId::new(ACCOUNT_HOST_PORT_ID.to_string()).unwrap()
}

fn account_relayer() -> RelayerContext {
    RelayerContext::connected(
        MockRouter::new_with_dummy(),
        MockRouter::new_with_account_host(),
    )
}

/// Opens an account channel for `OWNER`, times out a packet on it so that
/// both ends close, and releases the capability of the host end.
fn closed_account_channel() -> (RelayerContext, ChannelId) {
    let mut relayer = account_relayer();

    let (chan_id_on_a, chan_id_on_b) = relayer
        .open_channel(
            dummy_port_id(),
            account_host_port_id(),
            Order::Ordered,
            account_version(OWNER),
        )
        .unwrap();

    let packet = Packet {
        port_id_on_b: account_host_port_id(),
        chan_id_on_a: chan_id_on_a.clone(),
        chan_id_on_b: chan_id_on_b.clone(),
        timeout_height_on_b: TimeoutHeight::At(relayer.get_ctx_b().latest_height().increment()),
        ..dummy_packet(1)
    };

    relayer.send_packet_on_a(packet.clone()).unwrap();

    relayer.get_ctx_b_mut().advance_block();
    relayer.get_ctx_b_mut().advance_block();

    relayer.packet_timeout_on_a(packet).unwrap();

    assert_eq!(
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap()
            .state,
        State::Closed
    );

    relayer
        .channel_close_confirm_on_b(
            dummy_port_id(),
            chan_id_on_a,
            account_host_port_id(),
            chan_id_on_b.clone(),
        )
        .unwrap();

    let capability_path = ChannelCapabilityPath::new(&account_host_port_id(), &chan_id_on_b);
    let capability = relayer
        .get_ctx_b()
        .get_capability(&capability_path)
        .unwrap();
    relayer
        .get_ctx_b_mut()
        .release_capability(&capability_path, capability)
        .unwrap();

    (relayer, chan_id_on_b)
}

#[test_log::test]
fn chan_open_try_happy_path() {
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

    let chan_end_on_b = relayer
        .channel_end_on_b(&dummy_port_id(), &chan_id_on_b)
        .unwrap();

    assert_eq!(chan_end_on_b.state, State::TryOpen);
    assert_eq!(chan_end_on_b.ordering, Order::Unordered);
    assert_eq!(chan_end_on_b.version, dummy_version());
    assert_eq!(chan_end_on_b.counterparty().channel_id(), Some(&chan_id_on_a));
    assert_eq!(relayer.get_ctx_b().channel_counter().unwrap(), 1);
}

#[test_log::test]
fn chan_open_try_fail_proof_mismatch() {
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

    // claims a version chain A never proposed
    let msg = MsgChannelOpenTry {
        port_id_on_b: dummy_port_id(),
        connection_hops_on_b: vec![ConnectionId::zero()],
        port_id_on_a: dummy_port_id(),
        proof_chan_end_on_a: relayer
            .get_ctx_a()
            .prove(ChannelEndPath::new(&dummy_port_id(), &chan_id_on_a)),
        chan_id_on_a,
        version_supported_on_a: Version::new("dummy-2".to_string()),
        proof_height_on_a: relayer.get_ctx_a().latest_height(),
        ordering: Order::Unordered,
        signer: dummy_account_id(),
    };

    let res = relayer.deliver_on_b(MsgEnvelope::Channel(ChannelMsg::OpenTry(msg)));

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::ChannelError(
            ChannelError::VerifyChannelFailed(_)
        )))
    ));
    assert_eq!(relayer.get_ctx_b().channel_counter().unwrap(), 0);
}

#[rstest]
#[case(Order::Unordered)]
fn chan_open_try_account_host_rejects_unordered(#[case] ordering: Order) {
    let mut relayer = account_relayer();

    let chan_id_on_a = relayer
        .channel_open_init_on_a(
            dummy_port_id(),
            account_host_port_id(),
            ordering,
            account_version(OWNER),
        )
        .unwrap();

    let res = relayer.channel_open_try_on_b(dummy_port_id(), chan_id_on_a, account_host_port_id());

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::ChannelError(
            ChannelError::InvalidOrderType { .. }
        )))
    ));
}

#[test_log::test]
fn chan_open_try_account_host_rejects_second_active_channel() {
    let mut relayer = account_relayer();

    relayer
        .open_channel(
            dummy_port_id(),
            account_host_port_id(),
            Order::Ordered,
            account_version(OWNER),
        )
        .unwrap();

    let chan_id_on_a = relayer
        .channel_open_init_on_a(
            dummy_port_id(),
            account_host_port_id(),
            Order::Ordered,
            account_version(OWNER),
        )
        .unwrap();

    let res = relayer.channel_open_try_on_b(dummy_port_id(), chan_id_on_a, account_host_port_id());

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::ChannelError(
            ChannelError::ActiveChannelExists { .. }
        )))
    ));
}

#[test_log::test]
fn chan_open_try_account_host_reopens_for_same_owner() {
    let (mut relayer, closed_chan_id_on_b) = closed_account_channel();

    let chan_id_on_a = relayer
        .channel_open_init_on_a(
            dummy_port_id(),
            account_host_port_id(),
            Order::Ordered,
            account_version(OWNER),
        )
        .unwrap();

    let chan_id_on_b = relayer
        .channel_open_try_on_b(
            dummy_port_id(),
            chan_id_on_a.clone(),
            account_host_port_id(),
        )
        .unwrap();

    assert_ne!(chan_id_on_b, closed_chan_id_on_b);

    let bound = relayer
        .get_ctx_b()
        .get_events()
        .into_iter()
        .rev()
        .find_map(|event| match event {
            IbcEvent::Module(event) => Some(event),
            _ => None,
        })
        .unwrap();
    assert_eq!(bound.kind, "account_channel_bound");

    relayer
        .channel_open_ack_on_a(
            dummy_port_id(),
            chan_id_on_a.clone(),
            account_host_port_id(),
            chan_id_on_b.clone(),
        )
        .unwrap();
    relayer
        .channel_open_confirm_on_b(
            dummy_port_id(),
            chan_id_on_a,
            account_host_port_id(),
            chan_id_on_b.clone(),
        )
        .unwrap();

    assert_eq!(
        relayer
            .channel_end_on_b(&account_host_port_id(), &chan_id_on_b)
            .unwrap()
            .state,
        State::Open
    );
}

#[test_log::test]
fn chan_open_try_account_host_rejects_other_owner() {
    let (mut relayer, _) = closed_account_channel();

    let chan_id_on_a = relayer
        .channel_open_init_on_a(
            dummy_port_id(),
            account_host_port_id(),
            Order::Ordered,
            account_version("cosmos1intruder"),
        )
        .unwrap();

    let res = relayer.channel_open_try_on_b(dummy_port_id(), chan_id_on_a, account_host_port_id());

    let Err(RelayerError::TransactionFailed(ContextError::ChannelError(
        ChannelError::AppModule { description },
    ))) = res
    else {
        panic!("expected an application error, got {res:?}");
    };
    assert_eq!(
        description,
        format!("invalid account address: expected {OWNER}, got cosmos1intruder")
    );
}

#[test_log::test]
fn chan_open_try_account_host_requires_released_capability() {
    let mut relayer = account_relayer();

    let (chan_id_on_a, chan_id_on_b) = relayer
        .open_channel(
            dummy_port_id(),
            account_host_port_id(),
            Order::Ordered,
            account_version(OWNER),
        )
        .unwrap();

    relayer
        .close_channel(
            dummy_port_id(),
            chan_id_on_a,
            account_host_port_id(),
            chan_id_on_b,
        )
        .unwrap();

    let chan_id_on_a = relayer
        .channel_open_init_on_a(
            dummy_port_id(),
            account_host_port_id(),
            Order::Ordered,
            account_version(OWNER),
        )
        .unwrap();

    let res = relayer.channel_open_try_on_b(dummy_port_id(), chan_id_on_a, account_host_port_id());

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::HostError(
            HostError::CapabilityAlreadyClaimed { .. }
        )))
    ));
}
