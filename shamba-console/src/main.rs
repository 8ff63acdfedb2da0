use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use shamba_client::{AuthBackend, DeviceBackend, HttpBackend, MockBackend, ZoneBackend};
use shamba_console::{
    AdminPanel, BackendConfig, Config, DevicePanel, FileVault, PollConfig, SessionPhase,
    SessionStore, ViewKind, route,
};
use shamba_core::{DeviceState, Session};

#[derive(Parser)]
#[command(name = "shamba-console")]
#[command(about = "Shamba operator console")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "shamba-console.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "shamba_console=info,shamba_client=info".to_owned());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };

    let (auth, devices, zones): (
        Arc<dyn AuthBackend>,
        Arc<dyn DeviceBackend>,
        Arc<dyn ZoneBackend>,
    ) = match &config.backend {
        BackendConfig::Mock {
            device_count,
            history_len,
        } => {
            info!(device_count, history_len, "Using mock backend");
            let mock = Arc::new(MockBackend::demo_world(*device_count, *history_len));
            (mock.clone(), mock.clone(), mock)
        }
        BackendConfig::Http { base_url } => {
            info!(%base_url, "Using HTTP backend");
            let http = Arc::new(HttpBackend::new(base_url.as_str()));
            (http.clone(), http.clone(), http)
        }
    };

    let vault = Arc::new(FileVault::new(&config.session.vault_path));
    let store = SessionStore::new(auth, vault);

    // Restore has to settle before anything role-gated runs.
    store.restore().await;

    let session = match store.snapshot().await {
        SessionPhase::Authenticated(session) => session,
        _ => {
            info!(username = %config.demo.username, "No stored session, logging in");
            store
                .login(&config.demo.username, &config.demo.password)
                .await
                .map_err(|err| color_eyre::eyre::eyre!("login failed: {err}"))?
        }
    };

    match route(session.role, &session.raw_role) {
        ViewKind::Admin => run_admin(session, devices, zones, &config).await,
        ViewKind::Tech => run_board(session, devices, config.panels.tech).await,
        ViewKind::Farmer => run_board(session, devices, config.panels.farmer).await,
        ViewKind::Diagnostic { raw, normalized } => {
            error!(
                raw = %raw,
                normalized = normalized.as_str(),
                "Unrecognized role, refusing to pick a dashboard"
            );
            Ok(())
        }
    }
}

async fn run_admin(
    session: Session,
    devices: Arc<dyn DeviceBackend>,
    zones: Arc<dyn ZoneBackend>,
    config: &Config,
) -> color_eyre::Result<()> {
    info!(name = %session.display_name, "Opening admin dashboard");
    let mut panel = AdminPanel::new(session, devices, zones, &config.panels);
    panel.open();

    let mut status = tokio::time::interval(Duration::from_secs(10));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            _ = status.tick() => {
                if panel.board().selected().is_none() {
                    if let Some(first) = panel.board().fleet().first() {
                        panel.board_mut().select(first.id.clone());
                    }
                }
                let fleet = panel.board().fleet();
                let online = fleet.iter().filter(|d| d.state == DeviceState::Online).count();
                info!(
                    devices = fleet.len(),
                    online,
                    zones = panel.zone_overview().len(),
                    chart_points = panel.board().chart().len(),
                    "Dashboard status"
                );
            }
        }
    }

    panel.close();
    info!("Console shut down");
    Ok(())
}

async fn run_board(
    session: Session,
    devices: Arc<dyn DeviceBackend>,
    config: PollConfig,
) -> color_eyre::Result<()> {
    info!(role = session.role.as_str(), name = %session.display_name, "Opening dashboard");
    let mut panel = DevicePanel::new(session, devices, config);
    panel.open();

    let mut status = tokio::time::interval(Duration::from_secs(10));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            _ = status.tick() => {
                if panel.selected().is_none() {
                    if let Some(first) = panel.fleet().first() {
                        panel.select(first.id.clone());
                    }
                }
                let fleet = panel.fleet();
                let online = fleet.iter().filter(|d| d.state == DeviceState::Online).count();
                info!(
                    devices = fleet.len(),
                    online,
                    chart_points = panel.chart().len(),
                    "Dashboard status"
                );
            }
        }
    }

    panel.close();
    info!("Console shut down");
    Ok(())
}
