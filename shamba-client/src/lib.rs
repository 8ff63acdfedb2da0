use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use shamba_core::{Device, DeviceId, Sample, Zone};

pub mod error;
pub mod http;
pub mod mock;

pub use error::{AuthError, CommandError, FetchError};
pub use http::HttpBackend;
pub use mock::{MockBackend, MockUser};

/// Successful login payload as delivered by the auth endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub access_token: Box<str>,
    /// Raw role string; normalization is the session store's job.
    pub role: Box<str>,
    pub username: Box<str>,
}

/// Profile fields an operator may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: Box<str>,
    pub email: Box<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Box<str>>,
}

/// Acknowledged profile state after an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOutcome {
    pub full_name: Box<str>,
    pub email: Box<str>,
}

/// Authentication side of the remote API.
#[async_trait]
pub trait AuthBackend: Send + Sync + 'static {
    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError>;

    async fn update_profile(
        &self,
        token: &str,
        update: ProfileUpdate,
    ) -> Result<ProfileOutcome, AuthError>;
}

/// Device side of the remote API: fleet listing, telemetry history and
/// command dispatch.
#[async_trait]
pub trait DeviceBackend: Send + Sync + 'static {
    /// Fetch the full device fleet.
    async fn list_all(&self, token: &str) -> Result<Vec<Device>, FetchError>;

    /// Fetch up to `limit` samples for one device, newest first (the
    /// order the API contract delivers them in).
    async fn history(
        &self,
        token: &str,
        device: &DeviceId,
        limit: usize,
    ) -> Result<Vec<Sample>, FetchError>;

    /// Dispatch a named command to a device and await the
    /// acknowledgement. The tag is opaque here; gating happens at the
    /// call site.
    async fn send_command(
        &self,
        token: &str,
        device: &DeviceId,
        tag: &str,
    ) -> Result<(), CommandError>;
}

/// Zone listing, used for display aggregation only.
#[async_trait]
pub trait ZoneBackend: Send + Sync + 'static {
    async fn list_all(&self, token: &str) -> Result<Vec<Zone>, FetchError>;
}
