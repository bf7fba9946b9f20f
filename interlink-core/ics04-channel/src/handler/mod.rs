//! Handlers of the channel, packet and upgrade messages.

use interlink_core_handler_types::error::ContextError;
use interlink_core_host::types::error::HostError;
use interlink_core_host::types::identifiers::{ChannelId, PortId};
use interlink_core_host::types::path::ChannelCapabilityPath;
use interlink_core_host::ValidationContext;
use interlink_primitives::prelude::*;

mod acknowledgement;
mod chan_close_confirm;
mod chan_close_init;
mod chan_open_ack;
mod chan_open_confirm;
mod chan_open_init;
mod chan_open_try;
mod chan_upgrade_ack;
mod chan_upgrade_cancel;
mod chan_upgrade_confirm;
mod chan_upgrade_init;
mod chan_upgrade_open;
mod chan_upgrade_timeout;
mod chan_upgrade_try;
mod recv_packet;
mod send_packet;
mod timeout;
mod timeout_on_close;

pub use acknowledgement::*;
pub use chan_close_confirm::*;
pub use chan_close_init::*;
pub use chan_open_ack::*;
pub use chan_open_confirm::*;
pub use chan_open_init::*;
pub use chan_open_try::*;
pub use chan_upgrade_ack::*;
pub use chan_upgrade_cancel::*;
pub use chan_upgrade_confirm::*;
pub use chan_upgrade_init::*;
pub use chan_upgrade_open::*;
pub use chan_upgrade_timeout::*;
pub use chan_upgrade_try::*;
pub use recv_packet::*;
pub use send_packet::*;
pub use timeout::*;

/// Checks that the channel `(port_id, channel_id)` still holds the
/// capability it claimed when it was created.
pub(crate) fn verify_channel_capability<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    let capability_path = ChannelCapabilityPath::new(port_id, channel_id);

    let capability = ctx
        .get_capability(&capability_path)
        .ok_or(HostError::CapabilityNotFound {
            path: capability_path.to_string(),
        })?;

    if !ctx.authenticate_capability(&capability, &capability_path) {
        return Err(HostError::CapabilityNotAuthenticated {
            path: capability_path.to_string(),
        }
        .into());
    }

    Ok(())
}

/// Checks that no channel holds the capability of `(port_id, channel_id)`.
pub(crate) fn verify_capability_unclaimed<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    let capability_path = ChannelCapabilityPath::new(port_id, channel_id);

    if ctx.get_capability(&capability_path).is_some() {
        return Err(HostError::CapabilityAlreadyClaimed {
            path: capability_path.to_string(),
        }
        .into());
    }

    Ok(())
}
