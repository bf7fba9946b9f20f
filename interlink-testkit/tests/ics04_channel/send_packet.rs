use interlink_core::channel::handler::send_packet;
use interlink_core::channel::types::channel::State;
use interlink_core::channel::types::error::{ChannelError, PacketError};
use interlink_core::channel::types::packet::Packet;
use interlink_core::channel::types::timeout::{TimeoutHeight, TimeoutTimestamp};
use interlink_core::client_types::Height;
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::{IbcEvent, MessageEvent};
use interlink_core::host::types::capability::Capability;
use interlink_core::host::types::error::HostError;
use interlink_core::host::types::identifiers::{ChannelId, ConnectionId, Sequence};
use interlink_core::host::types::path::{ChannelCapabilityPath, CommitmentPath, SeqSendPath};
use interlink_core::host::ValidationContext;
use interlink_core::primitives::Timestamp;
use interlink_testkit::fixtures::core::channel::{
    dummy_client_id, dummy_packet, dummy_port_id, ChannelConfig, ConnectionConfig,
};
use interlink_testkit::fixtures::core::context::year_2023;
use interlink_testkit::testapp::core::types::{MockClientConfig, MockContext};
use rstest::*;

const CLIENT_HEIGHT: u64 = 10;

fn context_with_channel(state: State) -> MockContext {
    MockContext::default()
        .with_client_config(
            MockClientConfig::builder()
                .client_id(dummy_client_id())
                .latest_height(Height::new(0, CLIENT_HEIGHT).unwrap())
                .latest_timestamp(year_2023())
                .build(),
        )
        .with_connection(ConnectionId::zero(), ConnectionConfig::builder().build())
        .with_owned_channel(
            dummy_port_id(),
            ChannelId::zero(),
            ChannelConfig::builder().state(state).build(),
        )
        .with_send_sequence(dummy_port_id(), ChannelId::zero(), Sequence::from(1))
}

fn capability(ctx: &MockContext) -> Capability {
    ctx.get_capability(&ChannelCapabilityPath::new(
        &dummy_port_id(),
        &ChannelId::zero(),
    ))
    .unwrap()
}

fn packet_with_timeout_height(revision_height: u64) -> Packet {
    Packet {
        timeout_height_on_b: TimeoutHeight::At(Height::new(0, revision_height).unwrap()),
        ..dummy_packet(1)
    }
}

#[rstest]
#[case::open(State::Open)]
#[case::upgrade_proposed(State::InitUpgrade)]
fn send_packet_happy_path(#[case] state: State) {
    let mut ctx = context_with_channel(state);
    let capability = capability(&ctx);

    let res = send_packet(&mut ctx, &capability, dummy_packet(1));

    assert!(res.is_ok(), "send_packet failed: {res:?}");

    assert_eq!(
        ctx.get_next_sequence_send(&SeqSendPath::new(&dummy_port_id(), &ChannelId::zero()))
            .unwrap(),
        Sequence::from(2)
    );
    assert!(ctx
        .get_packet_commitment(&CommitmentPath::new(
            &dummy_port_id(),
            &ChannelId::zero(),
            Sequence::from(1)
        ))
        .is_ok());

    let ibc_events = ctx.get_events();

    assert!(matches!(
        &ibc_events[0],
        &IbcEvent::Message(MessageEvent::Channel)
    ));
    let IbcEvent::SendPacket(event) = &ibc_events[1] else {
        panic!("unexpected event: {:?}", ibc_events[1]);
    };
    assert_eq!(event.packet, dummy_packet(1));
    assert_eq!(event.src_connection_id, ConnectionId::zero());
}

#[test_log::test]
fn send_packet_processing() {
    struct Test {
        name: String,
        ctx: MockContext,
        packet: Packet,
        want_pass: bool,
    }

    let tests: Vec<Test> = vec![
        Test {
            name: "Processing fails because no channel exists in the context".to_string(),
            ctx: MockContext::default(),
            packet: dummy_packet(1),
            want_pass: false,
        },
        Test {
            name: "Good parameters".to_string(),
            ctx: context_with_channel(State::Open),
            packet: dummy_packet(1),
            want_pass: true,
        },
        Test {
            name: "Packet timeout height one past the client height".to_string(),
            ctx: context_with_channel(State::Open),
            packet: packet_with_timeout_height(CLIENT_HEIGHT + 1),
            want_pass: true,
        },
        Test {
            name: "Packet timeout height equal to the client height".to_string(),
            ctx: context_with_channel(State::Open),
            packet: packet_with_timeout_height(CLIENT_HEIGHT),
            want_pass: false,
        },
        Test {
            name: "Packet timeout height one before the client height".to_string(),
            ctx: context_with_channel(State::Open),
            packet: packet_with_timeout_height(CLIENT_HEIGHT - 1),
            want_pass: false,
        },
        Test {
            name: "Packet timeout timestamp already passed on the counterparty".to_string(),
            ctx: context_with_channel(State::Open),
            packet: Packet {
                timeout_height_on_b: TimeoutHeight::Never,
                timeout_timestamp_on_b: TimeoutTimestamp::At(Timestamp::from_nanoseconds(1)),
                ..dummy_packet(1)
            },
            want_pass: false,
        },
        Test {
            name: "Packet without any timeout".to_string(),
            ctx: context_with_channel(State::Open),
            packet: Packet {
                timeout_height_on_b: TimeoutHeight::Never,
                timeout_timestamp_on_b: TimeoutTimestamp::Never,
                ..dummy_packet(1)
            },
            want_pass: false,
        },
        Test {
            name: "Packet to a channel the channel end does not point to".to_string(),
            ctx: context_with_channel(State::Open),
            packet: Packet {
                chan_id_on_b: ChannelId::new(5),
                ..dummy_packet(1)
            },
            want_pass: false,
        },
        Test {
            name: "Channel is flushing an upgrade".to_string(),
            ctx: context_with_channel(State::Flushing),
            packet: dummy_packet(1),
            want_pass: false,
        },
    ]
    .into_iter()
    .collect();

    for mut test in tests {
        // a channel that is not in the context has no capability either
        let capability = test
            .ctx
            .get_capability(&ChannelCapabilityPath::new(
                &dummy_port_id(),
                &ChannelId::zero(),
            ))
            .unwrap_or_else(|| Capability::new(1));

        let res = send_packet(&mut test.ctx, &capability, test.packet.clone());

        assert_eq!(
            res.is_ok(),
            test.want_pass,
            "send_packet: test \"{}\" failed: {res:?}",
            test.name
        );
    }
}

#[test_log::test]
fn send_packet_fail_sequence_mismatch() {
    let mut ctx = context_with_channel(State::Open);
    let capability = capability(&ctx);

    let res = send_packet(&mut ctx, &capability, dummy_packet(2));

    assert!(matches!(
        res,
        Err(ContextError::PacketError(
            PacketError::PacketSequenceMismatch { .. }
        ))
    ));
}

#[test_log::test]
fn send_packet_fail_foreign_capability() {
    let mut ctx = context_with_channel(State::Open);

    let res = send_packet(&mut ctx, &Capability::new(999), dummy_packet(1));

    assert!(matches!(
        res,
        Err(ContextError::HostError(
            HostError::CapabilityNotAuthenticated { .. }
        ))
    ));
    assert!(ctx.get_events().is_empty());
}

#[rstest]
#[case(State::Closed)]
#[case(State::TryUpgrade)]
#[case(State::FlushComplete)]
fn send_packet_fail_channel_not_accepting(#[case] state: State) {
    let mut ctx = context_with_channel(state);
    let capability = capability(&ctx);

    let res = send_packet(&mut ctx, &capability, dummy_packet(1));

    assert!(matches!(
        res,
        Err(ContextError::PacketError(PacketError::Channel(
            ChannelError::InvalidState { .. }
        )))
    ));
}
