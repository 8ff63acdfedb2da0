use std::sync::Arc;
use std::time::Duration;

use shamba_client::{DeviceBackend, ZoneBackend};
use shamba_core::{DeviceState, Session, Zone};

use crate::config::{PanelConfig, PollConfig};
use crate::poller::Poller;

use super::DevicePanel;

/// Per-zone rollup for the admin overview.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneOverview {
    pub zone: Zone,
    pub device_count: usize,
    pub online_count: usize,
}

/// The admin variant: the shared device board plus a zone poller for
/// the fleet-wide overview.
pub struct AdminPanel {
    board: DevicePanel,
    zone_backend: Arc<dyn ZoneBackend>,
    zone_interval: Duration,
    zones: Poller<(), Vec<Zone>>,
}

impl AdminPanel {
    pub fn new(
        session: Session,
        devices: Arc<dyn DeviceBackend>,
        zones: Arc<dyn ZoneBackend>,
        panels: &PanelConfig,
    ) -> Self {
        let config: PollConfig = panels.admin;
        Self {
            board: DevicePanel::new(session, devices, config),
            zone_backend: zones,
            zone_interval: Duration::from_secs(panels.zone_interval_secs),
            zones: Poller::new(),
        }
    }

    pub fn open(&mut self) {
        self.board.open();

        let backend = Arc::clone(&self.zone_backend);
        let token = self.board.session().token.clone();
        self.zones.start((), self.zone_interval, move |()| {
            let backend = Arc::clone(&backend);
            let token = token.clone();
            async move { backend.list_all(token.as_str()).await }
        });
    }

    pub fn board(&self) -> &DevicePanel {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut DevicePanel {
        &mut self.board
    }

    /// Zones with device totals folded in from the fleet snapshot.
    pub fn zone_overview(&self) -> Vec<ZoneOverview> {
        let fleet = self.board.fleet();
        self.zones
            .latest()
            .unwrap_or_default()
            .into_iter()
            .map(|zone| {
                let members = fleet.iter().filter(|d| d.zone_id.as_ref() == Some(&zone.id));
                let device_count = members.clone().count();
                let online_count = members
                    .filter(|d| d.state == DeviceState::Online)
                    .count();
                ZoneOverview {
                    zone,
                    device_count,
                    online_count,
                }
            })
            .collect()
    }

    pub fn close(&mut self) {
        self.zones.stop();
        self.board.close();
    }
}
