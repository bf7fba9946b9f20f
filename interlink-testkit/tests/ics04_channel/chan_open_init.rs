use interlink_core::channel::types::channel::{Order, State};
use interlink_core::channel::types::error::ChannelError;
use interlink_core::channel::types::msgs::{ChannelMsg, MsgChannelOpenInit};
use interlink_core::connection_types::error::ConnectionError;
use interlink_core::connection_types::State as ConnectionState;
use interlink_core::entrypoint::{execute, validate};
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::{IbcEvent, MessageEvent};
use interlink_core::handler::types::msgs::MsgEnvelope;
use interlink_core::host::types::error::HostError;
use interlink_core::host::types::identifiers::{ChannelId, ConnectionId};
use interlink_core::host::types::path::{ChannelCapabilityPath, ChannelEndPath};
use interlink_core::host::{ExecutionContext, ValidationContext};
use interlink_core::primitives::Signer;
use interlink_testkit::fixtures::core::channel::{dummy_port_id, dummy_version, ConnectionConfig};
use interlink_testkit::fixtures::core::signer::dummy_account_id;
use interlink_testkit::testapp::core::router::MockRouter;
use interlink_testkit::testapp::core::types::MockContext;
use rstest::*;

pub struct Fixture {
    pub ctx: MockContext,
    pub router: MockRouter,
    pub msg: MsgChannelOpenInit,
}

#[fixture]
fn fixture() -> Fixture {
    let ctx = MockContext::default()
        .with_connection(ConnectionId::zero(), ConnectionConfig::builder().build());

    let msg = MsgChannelOpenInit {
        port_id_on_a: dummy_port_id(),
        connection_hops_on_a: vec![ConnectionId::zero()],
        port_id_on_b: dummy_port_id(),
        ordering: Order::Unordered,
        signer: dummy_account_id(),
        version_proposal: dummy_version(),
    };

    Fixture {
        ctx,
        router: MockRouter::new_with_dummy(),
        msg,
    }
}

fn envelope(msg: MsgChannelOpenInit) -> MsgEnvelope {
    MsgEnvelope::Channel(ChannelMsg::OpenInit(msg))
}

#[rstest]
fn chan_open_init_validate_happy_path(fixture: Fixture) {
    let Fixture { ctx, router, msg } = fixture;

    let res = validate(&ctx, &router, envelope(msg));

    assert!(res.is_ok(), "Validation succeeds; good parameters")
}

#[rstest]
fn chan_open_init_execute_happy_path(fixture: Fixture) {
    let Fixture {
        mut ctx,
        mut router,
        msg,
    } = fixture;

    let res = execute(&mut ctx, &mut router, envelope(msg));

    assert!(res.is_ok(), "Execution succeeds; good parameters");

    assert_eq!(ctx.channel_counter().unwrap(), 1);

    let chan_end_on_a = ctx
        .channel_end(&ChannelEndPath::new(&dummy_port_id(), &ChannelId::zero()))
        .unwrap();
    assert_eq!(chan_end_on_a.state, State::Init);
    assert_eq!(chan_end_on_a.counterparty().channel_id(), None);

    let capability_path = ChannelCapabilityPath::new(&dummy_port_id(), &ChannelId::zero());
    assert!(ctx.get_capability(&capability_path).is_some());

    let ibc_events = ctx.get_events();

    assert_eq!(ibc_events.len(), 2);

    assert!(matches!(
        ibc_events[0],
        IbcEvent::Message(MessageEvent::Channel)
    ));
    let IbcEvent::OpenInitChannel(event) = &ibc_events[1] else {
        panic!("unexpected event: {:?}", ibc_events[1]);
    };
    assert_eq!(event.chan_id_on_a, ChannelId::zero());
}

#[rstest]
fn chan_open_init_assigns_increasing_identifiers(fixture: Fixture) {
    let Fixture {
        mut ctx,
        mut router,
        msg,
    } = fixture;

    for expected in 0..3 {
        execute(&mut ctx, &mut router, envelope(msg.clone())).unwrap();

        let Some(IbcEvent::OpenInitChannel(event)) = ctx.last_event() else {
            panic!("expected an open init event");
        };
        assert_eq!(event.chan_id_on_a, ChannelId::new(expected));
    }

    assert_eq!(ctx.channel_counter().unwrap(), 3);
}

#[rstest]
fn chan_open_init_fail_no_connection(fixture: Fixture) {
    let Fixture { router, msg, .. } = fixture;

    let res = validate(&MockContext::default(), &router, envelope(msg));

    assert!(
        matches!(
            res,
            Err(ContextError::ConnectionError(
                ConnectionError::ConnectionNotFound { .. }
            ))
        ),
        "Validation fails because no connection exists in the context"
    )
}

#[rstest]
fn chan_open_init_fail_connection_not_open(fixture: Fixture) {
    let Fixture { router, msg, .. } = fixture;

    let ctx = MockContext::default().with_connection(
        ConnectionId::zero(),
        ConnectionConfig::builder()
            .state(ConnectionState::Init)
            .build(),
    );

    let res = validate(&ctx, &router, envelope(msg));

    assert!(
        matches!(
            res,
            Err(ContextError::ConnectionError(ConnectionError::InvalidState { .. }))
        ),
        "Validation fails because the connection is not open"
    )
}

#[rstest]
fn chan_open_init_fail_ordering_none(fixture: Fixture) {
    let Fixture { ctx, router, msg } = fixture;

    let msg = MsgChannelOpenInit {
        ordering: Order::None,
        ..msg
    };

    let res = validate(&ctx, &router, envelope(msg));

    assert!(matches!(
        res,
        Err(ContextError::ChannelError(ChannelError::InvalidOrderType { .. }))
    ))
}

#[rstest]
fn chan_open_init_fail_multiple_hops(fixture: Fixture) {
    let Fixture { ctx, router, msg } = fixture;

    let msg = MsgChannelOpenInit {
        connection_hops_on_a: vec![ConnectionId::zero(), ConnectionId::new(1)],
        ..msg
    };

    let res = validate(&ctx, &router, envelope(msg));

    assert!(matches!(
        res,
        Err(ContextError::ChannelError(
            ChannelError::InvalidConnectionHopsLength {
                expected: 1,
                actual: 2
            }
        ))
    ))
}

#[rstest]
fn chan_open_init_fail_capability_already_claimed(fixture: Fixture) {
    let Fixture {
        mut ctx,
        router,
        msg,
    } = fixture;

    // a capability left behind under the identifier the channel would get
    let capability_path = ChannelCapabilityPath::new(&dummy_port_id(), &ChannelId::zero());
    ctx.claim_capability(&capability_path).unwrap();

    let res = validate(&ctx, &router, envelope(msg));

    assert!(
        matches!(
            res,
            Err(ContextError::HostError(HostError::CapabilityAlreadyClaimed { .. }))
        ),
        "Validation fails because the capability is already claimed"
    )
}

#[rstest]
fn chan_open_init_fail_empty_signer(fixture: Fixture) {
    let Fixture { ctx, router, msg } = fixture;

    let msg = MsgChannelOpenInit {
        signer: Signer::new_empty(),
        ..msg
    };

    let res = validate(&ctx, &router, envelope(msg));

    assert!(matches!(
        res,
        Err(ContextError::HostError(HostError::InvalidSigner { .. }))
    ))
}

#[test_log::test]
fn chan_open_init_fail_unbound_port() {
    let ctx = MockContext::default()
        .with_connection(ConnectionId::zero(), ConnectionConfig::builder().build());

    let msg = MsgChannelOpenInit {
        port_id_on_a: "unbound".parse().unwrap(),
        connection_hops_on_a: vec![ConnectionId::zero()],
        port_id_on_b: dummy_port_id(),
        ordering: Order::Unordered,
        signer: dummy_account_id(),
        version_proposal: dummy_version(),
    };

    let res = validate(&ctx, &MockRouter::new_with_dummy(), envelope(msg));

    assert!(matches!(res, Err(ContextError::RouterError(_))))
}
