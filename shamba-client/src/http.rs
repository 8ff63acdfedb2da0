use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde_json::json;

use shamba_core::{Device, DeviceId, Sample, Zone};

use crate::{
    AuthBackend, AuthError, CommandError, DeviceBackend, FetchError, LoginOutcome, ProfileOutcome,
    ProfileUpdate, ZoneBackend,
};

/// JSON/HTTP implementation of the backend contracts.
///
/// One `reqwest::Client` is shared across all calls; the bearer token
/// travels with every authenticated request instead of living on the
/// client, so a session change never leaves a stale token behind.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Box<str>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<Box<str>>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Extract the operator-facing failure message from a non-2xx response.
/// The backend speaks in plain text; we pass it through verbatim and
/// only synthesize a message when the body is empty.
async fn failure_message(response: Response) -> Box<str> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        format!("request failed with status {status}").into()
    } else {
        body.into()
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if !response.status().is_success() {
            return Err(AuthError::Rejected(failure_message(response).await));
        }

        Ok(response.json().await?)
    }

    async fn update_profile(
        &self,
        token: &str,
        update: ProfileUpdate,
    ) -> Result<ProfileOutcome, AuthError> {
        let response = self
            .http
            .put(self.url("/api/auth/profile"))
            .bearer_auth(token)
            .json(&update)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Rejected(failure_message(response).await));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DeviceBackend for HttpBackend {
    async fn list_all(&self, token: &str) -> Result<Vec<Device>, FetchError> {
        let response = self
            .http
            .get(self.url("/api/devices"))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Rejected(failure_message(response).await));
        }

        Ok(response.json().await?)
    }

    async fn history(
        &self,
        token: &str,
        device: &DeviceId,
        limit: usize,
    ) -> Result<Vec<Sample>, FetchError> {
        let response = self
            .http
            .get(self.url(&format!("/api/devices/{device}/history")))
            .query(&[("limit", limit)])
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Rejected(failure_message(response).await));
        }

        Ok(response.json().await?)
    }

    async fn send_command(
        &self,
        token: &str,
        device: &DeviceId,
        tag: &str,
    ) -> Result<(), CommandError> {
        let response = self
            .http
            .post(self.url(&format!("/api/devices/{device}/commands")))
            .bearer_auth(token)
            .json(&json!({ "command": tag }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CommandError::Rejected(failure_message(response).await));
        }

        Ok(())
    }
}

#[async_trait]
impl ZoneBackend for HttpBackend {
    async fn list_all(&self, token: &str) -> Result<Vec<Zone>, FetchError> {
        let response = self
            .http
            .get(self.url("/api/zones"))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Rejected(failure_message(response).await));
        }

        Ok(response.json().await?)
    }
}
