//! Implementation of the host contexts for [`MockContext`].

use interlink_core::channel::types::channel::ChannelEnd;
use interlink_core::channel::types::commitment::{AcknowledgementCommitment, PacketCommitment};
use interlink_core::channel::types::error::{ChannelError, PacketError};
use interlink_core::channel::types::packet::Receipt;
use interlink_core::channel::types::upgrade::{ErrorReceipt, Upgrade};
use interlink_core::client_types::Height;
use interlink_core::connection_types::error::ConnectionError;
use interlink_core::connection_types::ConnectionEnd;
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::IbcEvent;
use interlink_core::host::types::capability::Capability;
use interlink_core::host::types::error::HostError;
use interlink_core::host::types::identifiers::{ConnectionId, Sequence};
use interlink_core::host::types::path::{
    AckPath, ChannelCapabilityPath, ChannelEndPath, ChannelUpgradePath, CommitmentPath,
    CounterpartyUpgradePath, ReceiptPath, SeqAckPath, SeqRecvPath, SeqSendPath, UpgradeErrorPath,
};
use interlink_core::host::{ExecutionContext, ValidationContext};
use interlink_core::primitives::prelude::*;
use interlink_core::primitives::{Signer, Timestamp};

use super::types::{port_channel_get, port_channel_insert, port_channel_remove, MockContext};
use super::verifier::MockProofVerifier;

impl ValidationContext for MockContext {
    type Verifier = MockProofVerifier;

    fn proof_verifier(&self) -> &Self::Verifier {
        &self.verifier
    }

    fn host_height(&self) -> Result<Height, ContextError> {
        Ok(self.latest_height())
    }

    fn host_timestamp(&self) -> Result<Timestamp, ContextError> {
        Ok(self.latest_timestamp())
    }

    fn connection_end(&self, cid: &ConnectionId) -> Result<ConnectionEnd, ContextError> {
        match self.ibc_store.lock().connections.get(cid) {
            Some(connection_end) => Ok(connection_end.clone()),
            None => Err(ConnectionError::ConnectionNotFound {
                connection_id: cid.clone(),
            }),
        }
        .map_err(ContextError::ConnectionError)
    }

    fn channel_end(&self, chan_end_path: &ChannelEndPath) -> Result<ChannelEnd, ContextError> {
        let port_id = &chan_end_path.0;
        let channel_id = &chan_end_path.1;

        match port_channel_get(&self.ibc_store.lock().channels, port_id, channel_id) {
            Some(channel_end) => Ok(channel_end.clone()),
            None => Err(ChannelError::ChannelNotFound {
                port_id: port_id.clone(),
                channel_id: channel_id.clone(),
            }),
        }
        .map_err(ContextError::ChannelError)
    }

    fn get_next_sequence_send(
        &self,
        seq_send_path: &SeqSendPath,
    ) -> Result<Sequence, ContextError> {
        port_channel_get(
            &self.ibc_store.lock().next_sequence_send,
            &seq_send_path.0,
            &seq_send_path.1,
        )
        .copied()
        .ok_or_else(|| HostError::missing_data(format!("next send sequence at {seq_send_path}")))
        .map_err(ContextError::HostError)
    }

    fn get_next_sequence_recv(
        &self,
        seq_recv_path: &SeqRecvPath,
    ) -> Result<Sequence, ContextError> {
        port_channel_get(
            &self.ibc_store.lock().next_sequence_recv,
            &seq_recv_path.0,
            &seq_recv_path.1,
        )
        .copied()
        .ok_or_else(|| HostError::missing_data(format!("next recv sequence at {seq_recv_path}")))
        .map_err(ContextError::HostError)
    }

    fn get_next_sequence_ack(&self, seq_ack_path: &SeqAckPath) -> Result<Sequence, ContextError> {
        port_channel_get(
            &self.ibc_store.lock().next_sequence_ack,
            &seq_ack_path.0,
            &seq_ack_path.1,
        )
        .copied()
        .ok_or_else(|| HostError::missing_data(format!("next ack sequence at {seq_ack_path}")))
        .map_err(ContextError::HostError)
    }

    fn get_packet_commitment(
        &self,
        commitment_path: &CommitmentPath,
    ) -> Result<PacketCommitment, ContextError> {
        let seq = &commitment_path.sequence;

        match port_channel_get(
            &self.ibc_store.lock().packet_commitment,
            &commitment_path.port_id,
            &commitment_path.channel_id,
        )
        .and_then(|map| map.get(seq))
        {
            Some(commitment) => Ok(commitment.clone()),
            None => Err(PacketError::PacketCommitmentNotFound { sequence: *seq }),
        }
        .map_err(ContextError::PacketError)
    }

    fn packet_commitment_sequences(
        &self,
        channel_end_path: &ChannelEndPath,
    ) -> Result<Vec<Sequence>, ContextError> {
        Ok(port_channel_get(
            &self.ibc_store.lock().packet_commitment,
            &channel_end_path.0,
            &channel_end_path.1,
        )
        .map(|map| map.keys().copied().collect())
        .unwrap_or_default())
    }

    fn get_packet_receipt(&self, receipt_path: &ReceiptPath) -> Result<Receipt, ContextError> {
        Ok(self.packet_receipt(
            &receipt_path.port_id,
            &receipt_path.channel_id,
            receipt_path.sequence,
        ))
    }

    fn get_packet_acknowledgement(
        &self,
        ack_path: &AckPath,
    ) -> Result<AcknowledgementCommitment, ContextError> {
        match port_channel_get(
            &self.ibc_store.lock().packet_acknowledgement,
            &ack_path.port_id,
            &ack_path.channel_id,
        )
        .and_then(|map| map.get(&ack_path.sequence))
        {
            Some(ack) => Ok(ack.clone()),
            None => Err(HostError::missing_data(format!(
                "acknowledgement at {ack_path}"
            ))),
        }
        .map_err(ContextError::HostError)
    }

    fn channel_counter(&self) -> Result<u64, ContextError> {
        Ok(self.ibc_store.lock().channel_ids_counter)
    }

    fn channel_upgrade(
        &self,
        upgrade_path: &ChannelUpgradePath,
    ) -> Result<Option<Upgrade>, ContextError> {
        Ok(port_channel_get(
            &self.ibc_store.lock().channel_upgrades,
            &upgrade_path.0,
            &upgrade_path.1,
        )
        .cloned())
    }

    fn counterparty_upgrade(
        &self,
        upgrade_path: &CounterpartyUpgradePath,
    ) -> Result<Option<Upgrade>, ContextError> {
        Ok(port_channel_get(
            &self.ibc_store.lock().counterparty_upgrades,
            &upgrade_path.0,
            &upgrade_path.1,
        )
        .cloned())
    }

    fn upgrade_error_receipt(
        &self,
        error_path: &UpgradeErrorPath,
    ) -> Result<Option<ErrorReceipt>, ContextError> {
        Ok(port_channel_get(
            &self.ibc_store.lock().upgrade_errors,
            &error_path.0,
            &error_path.1,
        )
        .cloned())
    }

    fn get_capability(&self, capability_path: &ChannelCapabilityPath) -> Option<Capability> {
        port_channel_get(
            &self.ibc_store.lock().capabilities,
            &capability_path.0,
            &capability_path.1,
        )
        .cloned()
    }

    fn authenticate_capability(
        &self,
        capability: &Capability,
        capability_path: &ChannelCapabilityPath,
    ) -> bool {
        self.get_capability(capability_path).as_ref() == Some(capability)
    }

    fn validate_message_signer(&self, signer: &Signer) -> Result<(), ContextError> {
        if signer.is_empty() {
            return Err(HostError::InvalidSigner {
                description: "empty signer".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl ExecutionContext for MockContext {
    fn store_packet_commitment(
        &mut self,
        commitment_path: &CommitmentPath,
        commitment: PacketCommitment,
    ) -> Result<(), ContextError> {
        self.ibc_store
            .lock()
            .packet_commitment
            .entry(commitment_path.port_id.clone())
            .or_default()
            .entry(commitment_path.channel_id.clone())
            .or_default()
            .insert(commitment_path.sequence, commitment);
        Ok(())
    }

    fn delete_packet_commitment(
        &mut self,
        commitment_path: &CommitmentPath,
    ) -> Result<(), ContextError> {
        self.ibc_store
            .lock()
            .packet_commitment
            .get_mut(&commitment_path.port_id)
            .and_then(|map| map.get_mut(&commitment_path.channel_id))
            .and_then(|map| map.remove(&commitment_path.sequence));
        Ok(())
    }

    fn store_packet_receipt(
        &mut self,
        path: &ReceiptPath,
        receipt: Receipt,
    ) -> Result<(), ContextError> {
        self.ibc_store
            .lock()
            .packet_receipt
            .entry(path.port_id.clone())
            .or_default()
            .entry(path.channel_id.clone())
            .or_default()
            .insert(path.sequence, receipt);
        Ok(())
    }

    fn store_packet_acknowledgement(
        &mut self,
        ack_path: &AckPath,
        ack_commitment: AcknowledgementCommitment,
    ) -> Result<(), ContextError> {
        self.ibc_store
            .lock()
            .packet_acknowledgement
            .entry(ack_path.port_id.clone())
            .or_default()
            .entry(ack_path.channel_id.clone())
            .or_default()
            .insert(ack_path.sequence, ack_commitment);
        Ok(())
    }

    fn store_channel(
        &mut self,
        channel_end_path: &ChannelEndPath,
        channel_end: ChannelEnd,
    ) -> Result<(), ContextError> {
        port_channel_insert(
            &mut self.ibc_store.lock().channels,
            &channel_end_path.0,
            &channel_end_path.1,
            channel_end,
        );
        Ok(())
    }

    fn store_next_sequence_send(
        &mut self,
        seq_send_path: &SeqSendPath,
        seq: Sequence,
    ) -> Result<(), ContextError> {
        port_channel_insert(
            &mut self.ibc_store.lock().next_sequence_send,
            &seq_send_path.0,
            &seq_send_path.1,
            seq,
        );
        Ok(())
    }

    fn store_next_sequence_recv(
        &mut self,
        seq_recv_path: &SeqRecvPath,
        seq: Sequence,
    ) -> Result<(), ContextError> {
        port_channel_insert(
            &mut self.ibc_store.lock().next_sequence_recv,
            &seq_recv_path.0,
            &seq_recv_path.1,
            seq,
        );
        Ok(())
    }

    fn store_next_sequence_ack(
        &mut self,
        seq_ack_path: &SeqAckPath,
        seq: Sequence,
    ) -> Result<(), ContextError> {
        port_channel_insert(
            &mut self.ibc_store.lock().next_sequence_ack,
            &seq_ack_path.0,
            &seq_ack_path.1,
            seq,
        );
        Ok(())
    }

    fn increase_channel_counter(&mut self) -> Result<(), ContextError> {
        self.ibc_store.lock().channel_ids_counter += 1;
        Ok(())
    }

    fn store_channel_upgrade(
        &mut self,
        upgrade_path: &ChannelUpgradePath,
        upgrade: Upgrade,
    ) -> Result<(), ContextError> {
        port_channel_insert(
            &mut self.ibc_store.lock().channel_upgrades,
            &upgrade_path.0,
            &upgrade_path.1,
            upgrade,
        );
        Ok(())
    }

    fn delete_channel_upgrade(
        &mut self,
        upgrade_path: &ChannelUpgradePath,
    ) -> Result<(), ContextError> {
        port_channel_remove(
            &mut self.ibc_store.lock().channel_upgrades,
            &upgrade_path.0,
            &upgrade_path.1,
        );
        Ok(())
    }

    fn store_counterparty_upgrade(
        &mut self,
        upgrade_path: &CounterpartyUpgradePath,
        upgrade: Upgrade,
    ) -> Result<(), ContextError> {
        port_channel_insert(
            &mut self.ibc_store.lock().counterparty_upgrades,
            &upgrade_path.0,
            &upgrade_path.1,
            upgrade,
        );
        Ok(())
    }

    fn delete_counterparty_upgrade(
        &mut self,
        upgrade_path: &CounterpartyUpgradePath,
    ) -> Result<(), ContextError> {
        port_channel_remove(
            &mut self.ibc_store.lock().counterparty_upgrades,
            &upgrade_path.0,
            &upgrade_path.1,
        );
        Ok(())
    }

    fn store_upgrade_error_receipt(
        &mut self,
        error_path: &UpgradeErrorPath,
        error_receipt: ErrorReceipt,
    ) -> Result<(), ContextError> {
        port_channel_insert(
            &mut self.ibc_store.lock().upgrade_errors,
            &error_path.0,
            &error_path.1,
            error_receipt,
        );
        Ok(())
    }

    fn claim_capability(
        &mut self,
        capability_path: &ChannelCapabilityPath,
    ) -> Result<Capability, ContextError> {
        let mut store = self.ibc_store.lock();

        if port_channel_get(&store.capabilities, &capability_path.0, &capability_path.1).is_some() {
            return Err(HostError::CapabilityAlreadyClaimed {
                path: capability_path.to_string(),
            }
            .into());
        }

        store.capability_counter += 1;
        let capability = Capability::new(store.capability_counter);

        port_channel_insert(
            &mut store.capabilities,
            &capability_path.0,
            &capability_path.1,
            capability.clone(),
        );

        Ok(capability)
    }

    fn release_capability(
        &mut self,
        capability_path: &ChannelCapabilityPath,
        capability: Capability,
    ) -> Result<(), ContextError> {
        let mut store = self.ibc_store.lock();

        match port_channel_get(&store.capabilities, &capability_path.0, &capability_path.1) {
            None => {
                return Err(HostError::CapabilityNotFound {
                    path: capability_path.to_string(),
                }
                .into())
            }
            Some(claimed) if *claimed != capability => {
                return Err(HostError::CapabilityNotAuthenticated {
                    path: capability_path.to_string(),
                }
                .into())
            }
            Some(_) => {}
        }

        port_channel_remove(
            &mut store.capabilities,
            &capability_path.0,
            &capability_path.1,
        );

        Ok(())
    }

    fn emit_ibc_event(&mut self, event: IbcEvent) -> Result<(), ContextError> {
        self.ibc_store.lock().events.push(event);
        Ok(())
    }

    fn log_message(&mut self, message: String) -> Result<(), ContextError> {
        tracing::debug!(height = %self.host_height, "{message}");
        self.ibc_store.lock().logs.push(message);
        Ok(())
    }
}
