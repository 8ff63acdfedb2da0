use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

/// The three persisted session slots. Written and cleared only as a
/// group; there is never a vault state with, say, a token but no role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub access_token: String,
    /// Role string as received from the backend; normalization happens
    /// on restore so it lives in exactly one place.
    pub role: String,
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed session file: {0}")]
    Malformed(#[from] toml::de::Error),
    #[error("could not serialize session: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Persistence contract for the session slots. The session store is
/// the only component that talks to a vault.
#[async_trait]
pub trait SessionVault: Send + Sync + 'static {
    /// Read the persisted slots, if any. A vault that was never written
    /// (or was cleared) yields `None`, not an error.
    async fn load(&self) -> Result<Option<PersistedSession>, VaultError>;

    /// Replace the persisted slots as a group.
    async fn save(&self, session: &PersistedSession) -> Result<(), VaultError>;

    /// Erase the persisted slots. Clearing an empty vault is a no-op.
    async fn clear(&self) -> Result<(), VaultError>;
}

/// In-memory vault. Reference implementation of the contract and the
/// default for tests.
#[derive(Clone, Default)]
pub struct MemoryVault {
    slot: Arc<Mutex<Option<PersistedSession>>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the vault, as if a previous run had logged in.
    pub fn seeded(session: PersistedSession) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(session))),
        }
    }
}

#[async_trait]
impl SessionVault for MemoryVault {
    async fn load(&self) -> Result<Option<PersistedSession>, VaultError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), VaultError> {
        *self.slot.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), VaultError> {
        *self.slot.lock().await = None;
        Ok(())
    }
}

/// File-backed vault: one TOML file holding the three slots.
///
/// Saves go through a temp file followed by a rename, so the group is
/// replaced atomically and a crash mid-write cannot leave a torn
/// session behind.
pub struct FileVault {
    path: PathBuf,
}

impl FileVault {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionVault for FileVault {
    async fn load(&self) -> Result<Option<PersistedSession>, VaultError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(toml::from_str(&content)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), VaultError> {
        let content = toml::to_string_pretty(session)?;
        let staging = self.path.with_extension("tmp");
        tokio::fs::write(&staging, content).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), VaultError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
