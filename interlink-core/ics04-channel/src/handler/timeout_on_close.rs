use interlink_core_channel_types::channel::{ChannelEnd, Counterparty, State};
use interlink_core_channel_types::error::ChannelError;
use interlink_core_channel_types::msgs::MsgTimeoutOnClose;
use interlink_core_connection_types::error::ConnectionError;
use interlink_core_handler_types::error::ContextError;
use interlink_core_host::types::path::{ChannelEndPath, Path};
use interlink_core_host::{ProofVerifier, ValidationContext};
use interlink_primitives::prelude::*;
use interlink_primitives::proto::Protobuf;

use super::timeout::{verify_packet_commitment, verify_packet_unreceived};

pub(crate) fn validate<Ctx>(ctx_a: &Ctx, msg: &MsgTimeoutOnClose) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx_a.validate_message_signer(&msg.signer)?;

    let packet = &msg.packet;
    let chan_end_path_on_a = ChannelEndPath::new(&packet.port_id_on_a, &packet.chan_id_on_a);
    let chan_end_on_a = ctx_a.channel_end(&chan_end_path_on_a)?;

    let counterparty = Counterparty::new(
        packet.port_id_on_b.clone(),
        Some(packet.chan_id_on_b.clone()),
    );

    chan_end_on_a.verify_counterparty_matches(&counterparty)?;

    //verify the packet was sent, check the store
    verify_packet_commitment(ctx_a, packet)?;

    let conn_id_on_a = chan_end_on_a.connection_hops()[0].clone();
    let conn_end_on_a = ctx_a.connection_end(&conn_id_on_a)?;

    // Verify proofs
    {
        let client_id_on_a = conn_end_on_a.client_id();
        let verifier = ctx_a.proof_verifier();

        verifier.validate_proof_height(client_id_on_a, &msg.proof_height_on_b)?;

        let prefix_on_b = conn_end_on_a.counterparty().prefix();
        let port_id_on_b = chan_end_on_a.counterparty().port_id.clone();
        let chan_id_on_b = chan_end_on_a
            .counterparty()
            .channel_id()
            .ok_or(ChannelError::MissingCounterparty)?;
        let conn_id_on_b = conn_end_on_a
            .counterparty()
            .connection_id()
            .ok_or(ConnectionError::MissingCounterpartyConnectionId)?;
        let expected_chan_end_on_b = ChannelEnd::new(
            State::Closed,
            *chan_end_on_a.ordering(),
            Counterparty::new(
                packet.port_id_on_a.clone(),
                Some(packet.chan_id_on_a.clone()),
            ),
            vec![conn_id_on_b.clone()],
            chan_end_on_a.version().clone(),
            msg.counterparty_upgrade_sequence,
        )?;

        let chan_end_path_on_b = ChannelEndPath::new(&port_id_on_b, chan_id_on_b);

        // Verify the proof for the channel state against the expected channel end.
        verifier
            .verify_membership(
                client_id_on_a,
                prefix_on_b,
                &msg.proof_close_on_b,
                &msg.proof_height_on_b,
                Path::ChannelEnd(chan_end_path_on_b),
                expected_chan_end_on_b.encode_vec(),
            )
            .map_err(ChannelError::VerifyChannelFailed)?;

        verify_packet_unreceived(
            ctx_a,
            &conn_end_on_a,
            chan_end_on_a.ordering,
            packet,
            msg.next_seq_recv_on_b,
            &msg.proof_unreceived_on_b,
            &msg.proof_height_on_b,
        )?;
    };

    Ok(())
}
