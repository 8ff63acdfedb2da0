use std::sync::Arc;

use tracing::info;

use shamba_client::{CommandError, DeviceBackend};
use shamba_core::{Capabilities, Device, DeviceId, DeviceState, command};

/// Thin pass-through to the device backend's command endpoint.
///
/// Deliberately capability-agnostic: authorization and online checks
/// belong to the call sites, which all go through [`command_allowed`]
/// first. On success nothing local changes: device snapshots are only
/// ever updated by the next poll cycle, never optimistically.
#[derive(Clone)]
pub struct CommandGateway {
    devices: Arc<dyn DeviceBackend>,
}

impl CommandGateway {
    pub fn new(devices: Arc<dyn DeviceBackend>) -> Self {
        Self { devices }
    }

    pub async fn dispatch(
        &self,
        token: &str,
        device: &DeviceId,
        tag: &str,
    ) -> Result<(), CommandError> {
        self.devices.send_command(token, device, tag).await?;
        info!(device_id = %device, command = tag, "Command acknowledged");
        Ok(())
    }
}

/// Call-site precondition for every dispatch: the device must be
/// online, and the capability set must permit the tag. Actuator
/// toggles are open to any recognized role; `SYSTEM_REBOOT` needs
/// technician access.
pub fn command_allowed(caps: Capabilities, device: &Device, tag: &str) -> bool {
    if device.state != DeviceState::Online {
        return false;
    }
    match tag {
        command::SYSTEM_REBOOT => caps.is_tech,
        _ => caps.is_admin || caps.is_tech || caps.is_farmer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shamba_core::RoleTag;

    fn device(state: DeviceState) -> Device {
        Device {
            id: DeviceId::new("dev-1"),
            name: "Pump house".into(),
            state,
            last_seen_at: None,
            battery_level: None,
            zone_id: None,
        }
    }

    #[test]
    fn offline_devices_accept_nothing() {
        let offline = device(DeviceState::Offline);
        for role in [RoleTag::Admin, RoleTag::Tech, RoleTag::Farmer] {
            assert!(!command_allowed(role.capabilities(), &offline, command::PUMP_ON));
            assert!(!command_allowed(role.capabilities(), &offline, command::SYSTEM_REBOOT));
        }
    }

    #[test]
    fn reboot_needs_technician_access() {
        let online = device(DeviceState::Online);
        assert!(command_allowed(RoleTag::Admin.capabilities(), &online, command::SYSTEM_REBOOT));
        assert!(command_allowed(RoleTag::Tech.capabilities(), &online, command::SYSTEM_REBOOT));
        assert!(!command_allowed(RoleTag::Farmer.capabilities(), &online, command::SYSTEM_REBOOT));
    }

    #[test]
    fn toggles_are_open_to_recognized_roles_only() {
        let online = device(DeviceState::Online);
        assert!(command_allowed(RoleTag::Farmer.capabilities(), &online, command::MIST_ON));
        assert!(command_allowed(RoleTag::Tech.capabilities(), &online, command::LIGHT_OFF));
        assert!(!command_allowed(RoleTag::Unknown.capabilities(), &online, command::PUMP_ON));
    }
}
