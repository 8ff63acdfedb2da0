use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub panels: PanelConfig,
    pub demo: DemoConfig,
}

/// Which implementation of the remote API to talk to.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    Mock {
        /// Number of simulated devices
        device_count: usize,
        /// Samples of pre-generated history per device
        history_len: usize,
    },
    Http {
        /// Base URL of the REST API
        base_url: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// Where the persisted session slots live between runs
    pub vault_path: PathBuf,
}

/// Refresh cadence and history depth for one dashboard variant.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PollConfig {
    /// Interval in seconds between device-list refreshes
    pub fleet_interval_secs: u64,
    /// Interval in seconds between telemetry refreshes for the
    /// selected device
    pub telemetry_interval_secs: u64,
    /// Samples requested per telemetry refresh
    pub history_limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct PanelConfig {
    /// Interval in seconds between zone-list refreshes (admin only)
    pub zone_interval_secs: u64,
    pub admin: PollConfig,
    pub tech: PollConfig,
    pub farmer: PollConfig,
}

/// Credentials the binary uses when it starts unauthenticated.
#[derive(Debug, Deserialize)]
pub struct DemoConfig {
    pub username: String,
    pub password: String,
}

impl Config {
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Mock {
                device_count: 6,
                history_len: 48,
            },
            session: SessionConfig {
                vault_path: "shamba-session.toml".into(),
            },
            panels: PanelConfig {
                zone_interval_secs: 60,
                admin: PollConfig {
                    fleet_interval_secs: 30,
                    telemetry_interval_secs: 15,
                    history_limit: 48,
                },
                tech: PollConfig {
                    fleet_interval_secs: 20,
                    telemetry_interval_secs: 5,
                    history_limit: 120,
                },
                farmer: PollConfig {
                    fleet_interval_secs: 60,
                    telemetry_interval_secs: 60,
                    history_limit: 24,
                },
            },
            demo: DemoConfig {
                username: "farmer".to_string(),
                password: "farmer".to_string(),
            },
        }
    }
}
