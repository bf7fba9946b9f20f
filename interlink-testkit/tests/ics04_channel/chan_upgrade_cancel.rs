use interlink_core::channel::types::channel::{Order, State};
use interlink_core::channel::types::error::UpgradeError;
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::IbcEvent;
use interlink_core::host::types::identifiers::ChannelId;
use interlink_core::host::types::path::{ChannelEndPath, ChannelUpgradePath};
use interlink_core::host::{ExecutionContext, ValidationContext};
use interlink_testkit::fixtures::core::channel::{
    dummy_port_id, dummy_upgrade_fields, dummy_upgrade_timeout, dummy_version,
};
use interlink_testkit::relayer::context::RelayerContext;
use interlink_testkit::relayer::error::RelayerError;
use interlink_testkit::testapp::applications::dummy::{DummyModule, DUMMY_MODULE_ID, DUMMY_PORT_ID};
use interlink_testkit::testapp::core::router::MockRouter;

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

fn propose_on_a(relayer: &mut RelayerContext, chan_id_on_a: &ChannelId) {
    relayer
        .upgrade_init_on_a(
            dummy_port_id(),
            chan_id_on_a.clone(),
            dummy_upgrade_fields(Order::Unordered, "dummy-2"),
            dummy_upgrade_timeout(),
        )
        .unwrap();
}

#[test_log::test]
fn chan_upgrade_cancel_after_rejection() {
    let router_b = MockRouter::default().with_module(
        DUMMY_PORT_ID,
        DUMMY_MODULE_ID,
        DummyModule::default().rejecting_upgrades(),
    );
    let (mut relayer, chan_id_on_a, chan_id_on_b) = open_relayer(router_b);

    propose_on_a(&mut relayer, &chan_id_on_a);
    relayer
        .upgrade_try_on_b(dummy_port_id(), chan_id_on_b)
        .unwrap();

    relayer
        .upgrade_cancel_on_a(dummy_port_id(), chan_id_on_a.clone())
        .unwrap();

    let ctx_a = relayer.get_ctx_a();

    let chan_end_on_a = ctx_a
        .channel_end(&ChannelEndPath::new(&dummy_port_id(), &chan_id_on_a))
        .unwrap();
    assert_eq!(chan_end_on_a.state, State::Open);
    assert_eq!(chan_end_on_a.version, dummy_version());
    assert_eq!(chan_end_on_a.upgrade_sequence, 2);

    assert!(ctx_a
        .channel_upgrade(&ChannelUpgradePath::new(&dummy_port_id(), &chan_id_on_a))
        .unwrap()
        .is_none());

    let Some(IbcEvent::UpgradeCancelledChannel(event)) = ctx_a.last_event() else {
        panic!("expected an upgrade cancelled event");
    };
    assert_eq!(event.attributes.upgrade_sequence, 2);
}

#[test_log::test]
fn chan_upgrade_cancel_fast_forwards_sequence() {
    let (mut relayer, chan_id_on_a, chan_id_on_b) = open_relayer(MockRouter::new_with_dummy());

    let chan_end_path_on_b = ChannelEndPath::new(&dummy_port_id(), &chan_id_on_b);
    let mut chan_end_on_b = relayer.get_ctx_b().channel_end(&chan_end_path_on_b).unwrap();
    chan_end_on_b.upgrade_sequence = 5;
    relayer
        .get_ctx_b_mut()
        .store_channel(&chan_end_path_on_b, chan_end_on_b)
        .unwrap();

    // B answers with an error receipt for its own, later, sequence
    propose_on_a(&mut relayer, &chan_id_on_a);
    relayer
        .upgrade_try_on_b(dummy_port_id(), chan_id_on_b.clone())
        .unwrap();
    relayer
        .upgrade_cancel_on_a(dummy_port_id(), chan_id_on_a.clone())
        .unwrap();

    assert_eq!(
        relayer
            .channel_end_on_a(&dummy_port_id(), &chan_id_on_a)
            .unwrap()
            .upgrade_sequence,
        6
    );

    // the next attempt lands above both ends
    propose_on_a(&mut relayer, &chan_id_on_a);
    relayer
        .upgrade_try_on_b(dummy_port_id(), chan_id_on_b.clone())
        .unwrap();

    let chan_end_on_b = relayer
        .channel_end_on_b(&dummy_port_id(), &chan_id_on_b)
        .unwrap();
    assert_eq!(chan_end_on_b.state, State::TryUpgrade);
    assert_eq!(chan_end_on_b.upgrade_sequence, 7);
}

#[test_log::test]
fn chan_upgrade_cancel_fail_no_upgrade() {
    let router_b = MockRouter::default().with_module(
        DUMMY_PORT_ID,
        DUMMY_MODULE_ID,
        DummyModule::default().rejecting_upgrades(),
    );
    let (mut relayer, chan_id_on_a, chan_id_on_b) = open_relayer(router_b);

    propose_on_a(&mut relayer, &chan_id_on_a);
    relayer
        .upgrade_try_on_b(dummy_port_id(), chan_id_on_b)
        .unwrap();
    relayer
        .upgrade_cancel_on_a(dummy_port_id(), chan_id_on_a.clone())
        .unwrap();

    // the same receipt cannot cancel anything a second time
    let res = relayer.upgrade_cancel_on_a(dummy_port_id(), chan_id_on_a);

    assert!(matches!(
        res,
        Err(RelayerError::TransactionFailed(ContextError::UpgradeError(
            UpgradeError::UpgradeNotFound { .. }
        )))
    ));
}
