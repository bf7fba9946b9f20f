use interlink_core::channel::types::channel::{Order, State};
use interlink_core::channel::types::error::UpgradeError;
use interlink_core::channel::types::upgrade::ErrorReceipt;
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::IbcEvent;
use interlink_core::host::types::identifiers::{ChannelId, Sequence};
use interlink_core::host::types::path::{ChannelEndPath, ChannelUpgradePath};
use interlink_core::host::{ExecutionContext, ValidationContext};
use interlink_testkit::fixtures::core::channel::{
    dummy_packet, dummy_port_id, dummy_upgrade_fields, dummy_upgrade_timeout, dummy_version,
};
use interlink_testkit::relayer::context::RelayerContext;
use interlink_testkit::relayer::error::RelayerError;
use interlink_testkit::testapp::applications::dummy::{DummyModule, DUMMY_MODULE_ID, DUMMY_PORT_ID};
use interlink_testkit::testapp::core::router::MockRouter;
use interlink_testkit::testapp::core::types::MockContext;
use rstest::*;

fn open_relayer(router_b: MockRouter) -> (RelayerContext, ChannelId, ChannelId) {
    let mut relayer = RelayerContext::connected(MockRouter::new_with_dummy(), router_b);

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

fn error_receipt(ctx: &MockContext, chan_id: &ChannelId) -> Option<ErrorReceipt> {
    ctx.ibc_store
        .lock()
        .upgrade_errors
        .get(&dummy_port_id())
        .and_then(|receipts| receipts.get(chan_id))
        .cloned()
}

#[rstest]
#[case(Order::Unordered, "dummy-2")]
#[case(Order::Ordered, "dummy-1")]
fn chan_upgrade_try_happy_path(#[case] ordering: Order, #[case] version: &str) {
    let (mut relayer, chan_id_on_a, chan_id_on_b) = open_relayer(MockRouter::new_with_dummy());

    relayer.send_packet_on_a(dummy_packet(1)).unwrap();

    relayer
        .upgrade_init_on_a(
            dummy_port_id(),
            chan_id_on_a,
            dummy_upgrade_fields(ordering, version),
            dummy_upgrade_timeout(),
        )
        .unwrap();

    relayer
        .upgrade_try_on_b(dummy_port_id(), chan_id_on_b.clone())
        .unwrap();

    let ctx_b = relayer.get_ctx_b();

    let chan_end_on_b = ctx_b
        .channel_end(&ChannelEndPath::new(&dummy_port_id(), &chan_id_on_b))
        .unwrap();
    assert_eq!(chan_end_on_b.state, State::TryUpgrade);
    assert_eq!(chan_end_on_b.upgrade_sequence, 1);
    assert_eq!(chan_end_on_b.ordering, Order::Unordered);

    let upgrade_on_b = ctx_b
        .channel_upgrade(&ChannelUpgradePath::new(&dummy_port_id(), &chan_id_on_b))
        .unwrap()
        .expect("upgrade is stored");
    assert_eq!(upgrade_on_b.fields, dummy_upgrade_fields(ordering, version));
    // B has not sent anything, so it stops sending at its first sequence
    assert_eq!(upgrade_on_b.next_sequence_send, Sequence::from(1));

    assert!(matches!(
        ctx_b.last_event(),
        Some(IbcEvent::UpgradeTryChannel(_))
    ));
}

#[test_log::test]
fn chan_upgrade_try_application_veto_aborts() {
    let router_b = MockRouter::default().with_module(
        DUMMY_PORT_ID,
        DUMMY_MODULE_ID,
        DummyModule::default().rejecting_upgrades(),
    );
    let (mut relayer, chan_id_on_a, chan_id_on_b) = open_relayer(router_b);

    relayer
        .upgrade_init_on_a(
            dummy_port_id(),
            chan_id_on_a,
            dummy_upgrade_fields(Order::Unordered, "dummy-2"),
            dummy_upgrade_timeout(),
        )
        .unwrap();

    // the veto does not fail the message
    relayer
        .upgrade_try_on_b(dummy_port_id(), chan_id_on_b.clone())
        .unwrap();

    let ctx_b = relayer.get_ctx_b();

    let chan_end_on_b = ctx_b
        .channel_end(&ChannelEndPath::new(&dummy_port_id(), &chan_id_on_b))
        .unwrap();
    assert_eq!(chan_end_on_b.state, State::Open);
    assert_eq!(chan_end_on_b.upgrade_sequence, 2);
    assert_eq!(chan_end_on_b.version, dummy_version());

    assert!(ctx_b
        .channel_upgrade(&ChannelUpgradePath::new(&dummy_port_id(), &chan_id_on_b))
        .unwrap()
        .is_none());

    let receipt = error_receipt(ctx_b, &chan_id_on_b).expect("error receipt is written");
    assert_eq!(receipt.sequence, 1);
    assert!(receipt.message.contains("rejected"));

    let Some(IbcEvent::UpgradeErrorChannel(event)) = ctx_b.last_event() else {
        panic!("expected an upgrade error event");
    };
    assert_eq!(event.error_receipt, receipt);
}

#[test_log::test]
fn chan_upgrade_try_outdated_sequence_writes_receipt() {
    let (mut relayer, chan_id_on_a, chan_id_on_b) = open_relayer(MockRouter::new_with_dummy());

    // B already went through later attempts
    let chan_end_path_on_b = ChannelEndPath::new(&dummy_port_id(), &chan_id_on_b);
    let mut chan_end_on_b = relayer.get_ctx_b().channel_end(&chan_end_path_on_b).unwrap();
    chan_end_on_b.upgrade_sequence = 5;
    relayer
        .get_ctx_b_mut()
        .store_channel(&chan_end_path_on_b, chan_end_on_b)
        .unwrap();

    relayer
        .upgrade_init_on_a(
            dummy_port_id(),
            chan_id_on_a,
            dummy_upgrade_fields(Order::Unordered, "dummy-2"),
            dummy_upgrade_timeout(),
        )
        .unwrap();

    relayer
        .upgrade_try_on_b(dummy_port_id(), chan_id_on_b.clone())
        .unwrap();

    let ctx_b = relayer.get_ctx_b();

    let chan_end_on_b = ctx_b.channel_end(&chan_end_path_on_b).unwrap();
    assert_eq!(chan_end_on_b.state, State::Open);
    assert_eq!(chan_end_on_b.upgrade_sequence, 5);

    let receipt = error_receipt(ctx_b, &chan_id_on_b).expect("error receipt is written");
    assert_eq!(receipt.sequence, 5);
}

/// Both ends propose an upgrade before either answers the other.
fn propose_on_both_ends(
    relayer: RelayerContext,
    chan_id_on_a: &ChannelId,
    version_on_a: &str,
    chan_id_on_b: &ChannelId,
    version_on_b: &str,
) -> RelayerContext {
    let mut relayer = relayer;

    relayer
        .upgrade_init_on_a(
            dummy_port_id(),
            chan_id_on_a.clone(),
            dummy_upgrade_fields(Order::Unordered, version_on_a),
            dummy_upgrade_timeout(),
        )
        .unwrap();

    let mut relayer = relayer.reverse();

    relayer
        .upgrade_init_on_a(
            dummy_port_id(),
            chan_id_on_b.clone(),
            dummy_upgrade_fields(Order::Unordered, version_on_b),
            dummy_upgrade_timeout(),
        )
        .unwrap();

    relayer.reverse()
}

/// Runs the crossing handshake in which A's proposal wins.
fn finish_with_a_winning(
    relayer: RelayerContext,
    chan_id_on_a: &ChannelId,
    chan_id_on_b: &ChannelId,
    version: &str,
) -> RelayerContext {
    let mut relayer = relayer.reverse();

    // A holds on to its own proposal
    let res = relayer.upgrade_try_on_b(dummy_port_id(), chan_id_on_a.clone());

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::UpgradeError(
            UpgradeError::UpgradeSequenceLost { .. }
        )))
    ));

    let mut relayer = relayer.reverse();

    // while B gives way to it
    relayer
        .upgrade_try_on_b(dummy_port_id(), chan_id_on_b.clone())
        .unwrap();

    let upgrade_on_b = relayer
        .get_ctx_b()
        .channel_upgrade(&ChannelUpgradePath::new(&dummy_port_id(), chan_id_on_b))
        .unwrap()
        .expect("upgrade is stored");
    assert_eq!(upgrade_on_b.fields.version.as_str(), version);

    relayer
        .upgrade_ack_on_a(dummy_port_id(), chan_id_on_a.clone())
        .unwrap();
    relayer
        .upgrade_confirm_on_b(dummy_port_id(), chan_id_on_b.clone())
        .unwrap();
    relayer
        .upgrade_open_on_a(dummy_port_id(), chan_id_on_a.clone())
        .unwrap();

    for chan_end in [
        relayer
            .channel_end_on_a(&dummy_port_id(), chan_id_on_a)
            .unwrap(),
        relayer
            .channel_end_on_b(&dummy_port_id(), chan_id_on_b)
            .unwrap(),
    ] {
        assert_eq!(chan_end.state, State::Open);
        assert_eq!(chan_end.version.as_str(), version);
        assert_eq!(chan_end.upgrade_sequence, 1);
    }

    relayer
}

#[test_log::test]
fn chan_upgrade_try_crossing_hellos_same_channel_ids() {
    let (relayer, chan_id_on_a, chan_id_on_b) = open_relayer(MockRouter::new_with_dummy());

    assert_eq!(chan_id_on_a, ChannelId::zero());
    assert_eq!(chan_id_on_b, ChannelId::zero());

    // equal sequences and channel ids: the lower version decides
    let relayer = propose_on_both_ends(
        relayer,
        &chan_id_on_a,
        "dummy-2",
        &chan_id_on_b,
        "dummy-3",
    );

    finish_with_a_winning(relayer, &chan_id_on_a, &chan_id_on_b, "dummy-2");
}

#[test_log::test]
fn chan_upgrade_try_crossing_hellos_channel_id_decides() {
    let relayer =
        RelayerContext::connected(MockRouter::new_with_dummy(), MockRouter::new_with_dummy());

    // B allocates channel-1, which sorts after A's channel-0
    relayer.get_ctx_b().ibc_store.lock().channel_ids_counter = 1;

    let mut relayer = relayer;
    let (chan_id_on_a, chan_id_on_b) = relayer
        .open_channel(
            dummy_port_id(),
            dummy_port_id(),
            Order::Unordered,
            dummy_version(),
        )
        .unwrap();
    assert_eq!(chan_id_on_b, ChannelId::new(1));

    let relayer = propose_on_both_ends(
        relayer,
        &chan_id_on_a,
        "dummy-2",
        &chan_id_on_b,
        "dummy-2",
    );

    finish_with_a_winning(relayer, &chan_id_on_a, &chan_id_on_b, "dummy-2");
}

#[test_log::test]
fn chan_upgrade_try_identical_crossing_hellos_abort() {
    let (relayer, chan_id_on_a, chan_id_on_b) = open_relayer(MockRouter::new_with_dummy());

    let mut relayer =
        propose_on_both_ends(relayer, &chan_id_on_a, "dummy-2", &chan_id_on_b, "dummy-2");

    // nothing tells the proposals apart, so B abandons its own
    relayer
        .upgrade_try_on_b(dummy_port_id(), chan_id_on_b.clone())
        .unwrap();

    let ctx_b = relayer.get_ctx_b();

    let chan_end_on_b = relayer
        .channel_end_on_b(&dummy_port_id(), &chan_id_on_b)
        .unwrap();
    assert_eq!(chan_end_on_b.state, State::Open);
    assert_eq!(chan_end_on_b.version, dummy_version());
    assert_eq!(chan_end_on_b.upgrade_sequence, 2);

    let receipt = error_receipt(ctx_b, &chan_id_on_b).expect("error receipt is written");
    assert_eq!(receipt.sequence, 1);
    assert!(receipt.message.contains("same upgrade"));
    assert!(matches!(
        ctx_b.last_event(),
        Some(IbcEvent::UpgradeErrorChannel(_))
    ));

    // A cancels on B's receipt, leaving both ends on the old fields
    relayer
        .upgrade_cancel_on_a(dummy_port_id(), chan_id_on_a.clone())
        .unwrap();

    let chan_end_on_a = relayer
        .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
        .unwrap();
    assert_eq!(chan_end_on_a.state, State::Open);
    assert_eq!(chan_end_on_a.upgrade_sequence, 2);

    // a later attempt from one side goes through
    relayer
        .upgrade_channel(
            dummy_port_id(),
            chan_id_on_a.clone(),
            dummy_upgrade_fields(Order::Unordered, "dummy-2"),
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
        assert_eq!(chan_end.version.as_str(), "dummy-2");
        assert_eq!(chan_end.upgrade_sequence, 3);
    }
}
