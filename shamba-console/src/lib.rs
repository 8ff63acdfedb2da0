pub mod config;
pub mod gateway;
pub mod panel;
pub mod poller;
pub mod router;
pub mod session;

pub use config::{BackendConfig, Config, DemoConfig, PanelConfig, PollConfig, SessionConfig};
pub use gateway::{CommandGateway, command_allowed};
pub use panel::{AdminPanel, DevicePanel, ZoneOverview};
pub use poller::Poller;
pub use router::{ViewKind, route};
pub use session::vault::{FileVault, MemoryVault, PersistedSession, SessionVault, VaultError};
pub use session::{SessionPhase, SessionStore};
