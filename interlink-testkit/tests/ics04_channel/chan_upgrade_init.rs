use interlink_core::channel::types::channel::{Order, State};
use interlink_core::channel::types::error::{ChannelError, UpgradeError};
use interlink_core::channel::types::msgs::{MsgChannelUpgradeInit, UpgradeMsg};
use interlink_core::channel::types::timeout::{TimeoutHeight, TimeoutTimestamp};
use interlink_core::channel::types::upgrade::{UpgradeFields, UpgradeTimeout};
use interlink_core::channel::types::Version;
use interlink_core::connection_types::error::ConnectionError;
use interlink_core::entrypoint::{execute, validate};
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::{IbcEvent, MessageEvent};
use interlink_core::handler::types::msgs::MsgEnvelope;
use interlink_core::host::types::identifiers::{ChannelId, ConnectionId, PortId, Sequence};
use interlink_core::host::types::path::{ChannelEndPath, ChannelUpgradePath};
use interlink_core::host::ValidationContext;
use interlink_testkit::fixtures::core::channel::{
    dummy_port_id, dummy_upgrade_fields, dummy_upgrade_timeout, ChannelConfig, ConnectionConfig,
};
use interlink_testkit::fixtures::core::signer::dummy_account_id;
use interlink_testkit::testapp::applications::account_host::{
    account_version, ACCOUNT_HOST_PORT_ID,
};
use interlink_testkit::testapp::applications::dummy::{
    DummyModule, DUMMY_MODULE_ID, DUMMY_PORT_ID, DUMMY_VERSION,
};
use interlink_testkit::testapp::core::router::MockRouter;
use interlink_testkit::testapp::core::types::MockContext;
use rstest::*;

const UPGRADE_SEQUENCE: u64 = 4;

pub struct Fixture {
    pub ctx: MockContext,
    pub router: MockRouter,
    pub msg: MsgChannelUpgradeInit,
}

#[fixture]
fn fixture() -> Fixture {
    let ctx = MockContext::default()
        .with_connection(ConnectionId::zero(), ConnectionConfig::builder().build())
        .with_channel(
            dummy_port_id(),
            ChannelId::zero(),
            ChannelConfig::builder()
                .upgrade_sequence(UPGRADE_SEQUENCE)
                .build(),
        );

    let msg = MsgChannelUpgradeInit {
        port_id_on_a: dummy_port_id(),
        chan_id_on_a: ChannelId::zero(),
        fields: dummy_upgrade_fields(Order::Unordered, "dummy-2"),
        timeout: dummy_upgrade_timeout(),
        signer: dummy_account_id(),
    };

    Fixture {
        ctx,
        router: MockRouter::new_with_dummy(),
        msg,
    }
}

fn envelope(msg: MsgChannelUpgradeInit) -> MsgEnvelope {
    MsgEnvelope::Upgrade(UpgradeMsg::Init(msg))
}

#[rstest]
fn chan_upgrade_init_version_only(fixture: Fixture) {
    let Fixture {
        mut ctx,
        mut router,
        msg,
    } = fixture;

    let res = validate(&ctx, &router, envelope(msg.clone()));
    assert!(res.is_ok(), "Validation succeeds; good parameters: {res:?}");

    let res = execute(&mut ctx, &mut router, envelope(msg.clone()));
    assert!(res.is_ok(), "Execution succeeds; good parameters: {res:?}");

    let chan_end = ctx
        .channel_end(&ChannelEndPath::new(&dummy_port_id(), &ChannelId::zero()))
        .unwrap();
    assert_eq!(chan_end.state, State::InitUpgrade);
    assert_eq!(chan_end.upgrade_sequence, UPGRADE_SEQUENCE + 1);
    // nothing changes on the channel until the upgrade is committed
    assert_eq!(chan_end.version.to_string(), DUMMY_VERSION);

    let upgrade = ctx
        .channel_upgrade(&ChannelUpgradePath::new(&dummy_port_id(), &ChannelId::zero()))
        .unwrap()
        .expect("upgrade is stored");
    assert_eq!(upgrade.fields, msg.fields);
    assert_eq!(upgrade.timeout, msg.timeout);
    assert_eq!(upgrade.next_sequence_send, Sequence::from(0));

    let ibc_events = ctx.get_events();
    assert_eq!(ibc_events.len(), 2);
    assert!(matches!(
        ibc_events[0],
        IbcEvent::Message(MessageEvent::Channel)
    ));
    let IbcEvent::UpgradeInitChannel(event) = &ibc_events[1] else {
        panic!("expected an upgrade init event, got {:?}", ibc_events[1]);
    };
    assert_eq!(event.attributes.upgrade_sequence, UPGRADE_SEQUENCE + 1);
}

#[rstest]
fn chan_upgrade_init_to_ordered(fixture: Fixture) {
    let Fixture {
        mut ctx,
        mut router,
        mut msg,
    } = fixture;

    msg.fields = dummy_upgrade_fields(Order::Ordered, DUMMY_VERSION);

    execute(&mut ctx, &mut router, envelope(msg)).unwrap();

    let chan_end = ctx
        .channel_end(&ChannelEndPath::new(&dummy_port_id(), &ChannelId::zero()))
        .unwrap();
    assert_eq!(chan_end.ordering, Order::Unordered);
    assert_eq!(chan_end.state, State::InitUpgrade);
}

#[rstest]
fn chan_upgrade_init_fail_fields_unchanged(fixture: Fixture) {
    let Fixture {
        ctx,
        router,
        mut msg,
    } = fixture;

    msg.fields = dummy_upgrade_fields(Order::Unordered, DUMMY_VERSION);

    let res = validate(&ctx, &router, envelope(msg));

    assert!(matches!(
        res,
        Err(ContextError::UpgradeError(
            UpgradeError::UpgradeFieldsUnchanged
        ))
    ));
}

#[rstest]
#[case::back_to_current(DUMMY_VERSION, false)]
#[case::another_version("dummy-3", true)]
fn chan_upgrade_init_application_version(
    fixture: Fixture,
    #[case] app_version: &str,
    #[case] accepted: bool,
) {
    let Fixture { mut ctx, msg, .. } = fixture;

    let mut router = MockRouter::default().with_module(
        DUMMY_PORT_ID,
        DUMMY_MODULE_ID,
        DummyModule::default().proposing_upgrade_version(Version::new(app_version.to_string())),
    );

    let res = validate(&ctx, &router, envelope(msg.clone()));
    assert_eq!(res.is_ok(), accepted, "validation: {res:?}");

    let res = execute(&mut ctx, &mut router, envelope(msg));
    assert_eq!(res.is_ok(), accepted, "execution: {res:?}");

    let chan_end = ctx
        .channel_end(&ChannelEndPath::new(&dummy_port_id(), &ChannelId::zero()))
        .unwrap();
    let upgrade = ctx
        .channel_upgrade(&ChannelUpgradePath::new(&dummy_port_id(), &ChannelId::zero()))
        .unwrap();

    if accepted {
        assert_eq!(chan_end.state, State::InitUpgrade);
        assert_eq!(
            upgrade.expect("upgrade is stored").fields.version.as_str(),
            app_version
        );
    } else {
        assert!(matches!(
            res,
            Err(ContextError::UpgradeError(
                UpgradeError::UpgradeFieldsUnchanged
            ))
        ));
        assert_eq!(chan_end.state, State::Open);
        assert_eq!(chan_end.upgrade_sequence, UPGRADE_SEQUENCE);
        assert!(upgrade.is_none());
    }
}

#[rstest]
#[case::empty_version(dummy_upgrade_fields(Order::Unordered, ""))]
#[case::two_hops(UpgradeFields::new(
    Order::Unordered,
    vec![ConnectionId::zero(), ConnectionId::new(1)],
    "dummy-2".to_string().into(),
))]
#[case::no_ordering(dummy_upgrade_fields(Order::None, "dummy-2"))]
fn chan_upgrade_init_fail_invalid_fields(fixture: Fixture, #[case] fields: UpgradeFields) {
    let Fixture {
        ctx,
        router,
        mut msg,
    } = fixture;

    msg.fields = fields;

    let res = validate(&ctx, &router, envelope(msg));

    assert!(matches!(
        res,
        Err(ContextError::UpgradeError(
            UpgradeError::InvalidUpgradeFields { .. }
        ))
    ));
}

#[rstest]
fn chan_upgrade_init_fail_timeout_not_set(fixture: Fixture) {
    let Fixture {
        ctx,
        router,
        mut msg,
    } = fixture;

    msg.timeout = UpgradeTimeout {
        height: TimeoutHeight::Never,
        timestamp: TimeoutTimestamp::Never,
    };

    let res = validate(&ctx, &router, envelope(msg));

    assert!(matches!(
        res,
        Err(ContextError::UpgradeError(
            UpgradeError::InvalidUpgradeTimeout
        ))
    ));
}

#[rstest]
fn chan_upgrade_init_fail_unknown_connection(fixture: Fixture) {
    let Fixture {
        ctx,
        router,
        mut msg,
    } = fixture;

    msg.fields = UpgradeFields::new(
        Order::Unordered,
        vec![ConnectionId::new(7)],
        "dummy-2".to_string().into(),
    );

    let res = validate(&ctx, &router, envelope(msg));

    assert!(matches!(
        res,
        Err(ContextError::ConnectionError(
            ConnectionError::ConnectionNotFound { .. }
        ))
    ));
}

#[rstest]
#[case(State::Init)]
#[case(State::InitUpgrade)]
#[case(State::Flushing)]
#[case(State::Closed)]
fn chan_upgrade_init_fail_channel_not_open(fixture: Fixture, #[case] state: State) {
    let Fixture { router, msg, .. } = fixture;

    let ctx = MockContext::default()
        .with_connection(ConnectionId::zero(), ConnectionConfig::builder().build())
        .with_channel(
            dummy_port_id(),
            ChannelId::zero(),
            ChannelConfig::builder().state(state).build(),
        );

    let res = validate(&ctx, &router, envelope(msg));

    assert!(matches!(
        res,
        Err(ContextError::ChannelError(ChannelError::InvalidState { .. }))
    ));
}

#[test_log::test]
fn chan_upgrade_init_fail_account_host_unordered() {
    let port_id = PortId::new(ACCOUNT_HOST_PORT_ID.to_string()).unwrap();
    let version = account_version("cosmos1owner");

    let ctx = MockContext::default()
        .with_connection(ConnectionId::zero(), ConnectionConfig::builder().build())
        .with_channel(
            port_id.clone(),
            ChannelId::zero(),
            ChannelConfig::builder()
                .ordering(Order::Ordered)
                .version(version.clone())
                .build(),
        );

    let msg = MsgChannelUpgradeInit {
        port_id_on_a: port_id,
        chan_id_on_a: ChannelId::zero(),
        fields: UpgradeFields::new(Order::Unordered, vec![ConnectionId::zero()], version),
        timeout: dummy_upgrade_timeout(),
        signer: dummy_account_id(),
    };

    let res = validate(&ctx, &MockRouter::new_with_account_host(), envelope(msg));

    assert!(matches!(
        res,
        Err(ContextError::ChannelError(ChannelError::InvalidOrderType { .. }))
    ));
}
