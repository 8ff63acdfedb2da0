mod admin;

pub use admin::{AdminPanel, ZoneOverview};

use std::sync::Arc;
use std::time::Duration;

use shamba_client::{CommandError, DeviceBackend};
use shamba_core::{ChartData, Device, DeviceId, Sample, Session};

use crate::config::PollConfig;
use crate::gateway::{CommandGateway, command_allowed};
use crate::poller::Poller;

/// The polling board every dashboard variant is built on: a fleet
/// poller for the device list and a selection-scoped telemetry poller
/// for whichever device the operator is looking at.
///
/// The panel holds a read-only [`Session`] snapshot; capabilities are
/// derived from it at each dispatch, never cached.
pub struct DevicePanel {
    session: Session,
    devices: Arc<dyn DeviceBackend>,
    gateway: CommandGateway,
    config: PollConfig,
    fleet: Poller<(), Vec<Device>>,
    telemetry: Poller<DeviceId, Vec<Sample>>,
}

impl DevicePanel {
    pub fn new(session: Session, devices: Arc<dyn DeviceBackend>, config: PollConfig) -> Self {
        let gateway = CommandGateway::new(Arc::clone(&devices));
        Self {
            session,
            devices,
            gateway,
            config,
            fleet: Poller::new(),
            telemetry: Poller::new(),
        }
    }

    /// Start the fleet refresh loop. Idempotent in effect: re-opening
    /// replaces the previous cycle.
    pub fn open(&mut self) {
        let backend = Arc::clone(&self.devices);
        let token = self.session.token.clone();
        self.fleet.start(
            (),
            Duration::from_secs(self.config.fleet_interval_secs),
            move |()| {
                let backend = Arc::clone(&backend);
                let token = token.clone();
                async move { backend.list_all(token.as_str()).await }
            },
        );
    }

    /// Focus a device. The telemetry cycle bound to any previous
    /// selection is disarmed before the new one starts, so a result
    /// for the old device can never land on the new one's view.
    pub fn select(&mut self, device: DeviceId) {
        let backend = Arc::clone(&self.devices);
        let token = self.session.token.clone();
        let limit = self.config.history_limit;
        self.telemetry.start(
            device,
            Duration::from_secs(self.config.telemetry_interval_secs),
            move |id: DeviceId| {
                let backend = Arc::clone(&backend);
                let token = token.clone();
                async move { backend.history(token.as_str(), &id, limit).await }
            },
        );
    }

    pub fn selected(&self) -> Option<DeviceId> {
        self.telemetry.selection()
    }

    /// Last known device list; empty until the first fleet fetch lands.
    pub fn fleet(&self) -> Vec<Device> {
        self.fleet.latest().unwrap_or_default()
    }

    pub fn device(&self, id: &DeviceId) -> Option<Device> {
        self.fleet().into_iter().find(|d| &d.id == id)
    }

    /// Chart-ready telemetry for the selected device. Until a batch
    /// has landed (or when the backend returned none) this is the
    /// explicit no-data state, never an empty chart.
    pub fn chart(&self) -> ChartData {
        match self.telemetry.latest() {
            Some(samples) => ChartData::reconcile(&samples),
            None => ChartData::NoData,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Dispatch a command to a device, checking the preconditions this
    /// call site owes the gateway: the device must be known and online,
    /// and the operator's capabilities must permit the tag. Refusals
    /// are structural; the backend is never contacted for them.
    pub async fn send(&self, device_id: &DeviceId, tag: &str) -> Result<(), CommandError> {
        let device = self.device(device_id).ok_or_else(|| {
            CommandError::Rejected(format!("unknown device {device_id}").into())
        })?;

        let caps = self.session.role.capabilities();
        if !command_allowed(caps, &device, tag) {
            return Err(CommandError::Rejected(
                format!("command {tag} is not available for {}", device.name).into(),
            ));
        }

        self.gateway
            .dispatch(self.session.token.as_str(), device_id, tag)
            .await
    }

    /// Disarm every poller. Also happens on drop, so teardown releases
    /// the timers on every exit path.
    pub fn close(&mut self) {
        self.fleet.stop();
        self.telemetry.stop();
    }
}
