pub mod vault;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use shamba_client::{AuthBackend, AuthError, ProfileUpdate};
use shamba_core::{AccessToken, Capabilities, RoleTag, Session};

use vault::{PersistedSession, SessionVault};

/// Where the console is in the authentication lifecycle.
///
/// `Restoring` is distinct from `Unauthenticated` so role-gated
/// consumers can hold off instead of bouncing a still-valid operator
/// to a login screen while the vault read is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    /// Startup restore has not settled yet.
    Restoring,
    /// No session: restore found nothing, or the operator logged out.
    Unauthenticated,
    Authenticated(Session),
}

/// Single writer of session state.
///
/// Clones share the same underlying state (the guarded-singleton shape
/// used for shared runtime state elsewhere in this workspace); readers
/// get immutable snapshots and every mutation goes through the methods
/// here. No other component touches the vault.
#[derive(Clone)]
pub struct SessionStore {
    auth: Arc<dyn AuthBackend>,
    vault: Arc<dyn SessionVault>,
    phase: Arc<Mutex<SessionPhase>>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthBackend>, vault: Arc<dyn SessionVault>) -> Self {
        Self {
            auth,
            vault,
            phase: Arc::new(Mutex::new(SessionPhase::Restoring)),
        }
    }

    /// Settle the startup phase from the vault, without any network
    /// traffic. Always leaves the phase out of `Restoring`; an
    /// unreadable vault is logged and treated as no session.
    pub async fn restore(&self) {
        let restored = match self.vault.load().await {
            Ok(Some(persisted)) => {
                let role = RoleTag::parse(&persisted.role);
                info!(role = role.as_str(), "Session restored from vault");
                SessionPhase::Authenticated(Session {
                    token: AccessToken::new(persisted.access_token),
                    raw_role: persisted.role.into(),
                    role,
                    display_name: persisted.display_name.into(),
                })
            }
            Ok(None) => SessionPhase::Unauthenticated,
            Err(err) => {
                warn!(error = %err, "Session vault unreadable, starting unauthenticated");
                SessionPhase::Unauthenticated
            }
        };

        *self.phase.lock().await = restored;
    }

    /// Authenticate against the backend. On success the session is
    /// normalized, persisted as a group and swapped in; the returned
    /// session carries the role so the caller can route immediately.
    /// On failure the current phase is left exactly as it was.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let outcome = self.auth.login(username, password).await?;

        let role = RoleTag::parse(&outcome.role);
        let session = Session {
            token: AccessToken::new(outcome.access_token),
            raw_role: outcome.role,
            role,
            display_name: outcome.username,
        };

        self.persist(&session).await;
        *self.phase.lock().await = SessionPhase::Authenticated(session.clone());
        info!(role = role.as_str(), name = %session.display_name, "Operator logged in");

        Ok(session)
    }

    /// Push profile changes to the backend and merge the acknowledged
    /// name into the session. The token is never modified here.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<(), AuthError> {
        let current = match self.snapshot().await {
            SessionPhase::Authenticated(session) => session,
            _ => return Err(AuthError::Rejected("not authenticated".into())),
        };

        let outcome = self
            .auth
            .update_profile(current.token.as_str(), update)
            .await?;

        let updated = {
            let mut guard = self.phase.lock().await;
            match &mut *guard {
                SessionPhase::Authenticated(session) => {
                    session.display_name = outcome.full_name;
                    session.clone()
                }
                // Logged out while the request was in flight; nothing
                // to merge into.
                _ => return Ok(()),
            }
        };

        self.persist(&updated).await;
        Ok(())
    }

    /// Drop the in-memory session and erase the persisted copy.
    /// Calling this without a session is a no-op.
    pub async fn logout(&self) {
        let had_session = {
            let mut guard = self.phase.lock().await;
            let had = matches!(&*guard, SessionPhase::Authenticated(_));
            *guard = SessionPhase::Unauthenticated;
            had
        };

        if let Err(err) = self.vault.clear().await {
            warn!(error = %err, "Failed to clear session vault");
        }
        if had_session {
            info!("Operator logged out");
        }
    }

    pub async fn snapshot(&self) -> SessionPhase {
        self.phase.lock().await.clone()
    }

    /// Capabilities for the current phase, derived on the fly. Anything
    /// other than an authenticated session has none.
    pub async fn capabilities(&self) -> Capabilities {
        match &*self.phase.lock().await {
            SessionPhase::Authenticated(session) => session.role.capabilities(),
            _ => RoleTag::Unknown.capabilities(),
        }
    }

    async fn persist(&self, session: &Session) {
        let persisted = PersistedSession {
            access_token: session.token.as_str().to_owned(),
            role: session.raw_role.to_string(),
            display_name: session.display_name.to_string(),
        };
        if let Err(err) = self.vault.save(&persisted).await {
            warn!(error = %err, "Failed to persist session; continuing in-memory");
        }
    }
}
