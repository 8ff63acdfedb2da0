use std::sync::Arc;

use shamba_client::{AuthError, MockBackend, MockUser, ProfileUpdate};
use shamba_console::{
    FileVault, MemoryVault, PersistedSession, SessionPhase, SessionStore, SessionVault,
};
use shamba_core::RoleTag;

async fn backend_with_farmer() -> MockBackend {
    let backend = MockBackend::new();
    backend
        .add_user(MockUser {
            username: "farmer".into(),
            password: "secret".into(),
            role: "farmer".into(),
            full_name: "Sara Tesfaye".into(),
            email: "sara@shamba.dev".into(),
        })
        .await;
    backend
}

#[tokio::test]
async fn restore_from_seeded_vault_needs_no_network() {
    // Empty backend: any auth call would fail, proving restore is local.
    let backend = Arc::new(MockBackend::new());
    let vault = Arc::new(MemoryVault::seeded(PersistedSession {
        access_token: "tok-1".to_string(),
        role: "TECHNOLOGY".to_string(),
        display_name: "Dawit".to_string(),
    }));

    let store = SessionStore::new(backend, vault);
    assert_eq!(store.snapshot().await, SessionPhase::Restoring);

    store.restore().await;

    let SessionPhase::Authenticated(session) = store.snapshot().await else {
        panic!("expected an authenticated session");
    };
    assert_eq!(session.role, RoleTag::Tech);
    assert_eq!(&*session.raw_role, "TECHNOLOGY");
    assert_eq!(session.token.as_str(), "tok-1");
    assert!(store.capabilities().await.is_tech);
}

#[tokio::test]
async fn empty_vault_settles_unauthenticated() {
    let store = SessionStore::new(Arc::new(MockBackend::new()), Arc::new(MemoryVault::new()));
    assert_eq!(store.snapshot().await, SessionPhase::Restoring);

    store.restore().await;

    // Settled: consumers can now tell "no session" from "still loading".
    assert_eq!(store.snapshot().await, SessionPhase::Unauthenticated);
    let caps = store.capabilities().await;
    assert!(!caps.is_admin && !caps.is_tech && !caps.is_farmer);
}

#[tokio::test]
async fn login_persists_the_slot_group() {
    let backend = Arc::new(backend_with_farmer().await);
    let vault = Arc::new(MemoryVault::new());
    let store = SessionStore::new(backend, Arc::clone(&vault) as Arc<dyn SessionVault>);
    store.restore().await;

    let session = store.login("farmer", "secret").await.unwrap();
    assert_eq!(session.role, RoleTag::Farmer);

    let persisted = vault.load().await.unwrap().expect("vault written");
    assert!(!persisted.access_token.is_empty());
    assert_eq!(persisted.role, "farmer");
    assert_eq!(persisted.display_name, "farmer");
}

#[tokio::test]
async fn failed_login_leaves_the_session_untouched() {
    let backend = Arc::new(backend_with_farmer().await);
    let store = SessionStore::new(backend, Arc::new(MemoryVault::new()));
    store.restore().await;

    let session = store.login("farmer", "secret").await.unwrap();

    let err = store.login("farmer", "wrong").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let SessionPhase::Authenticated(current) = store.snapshot().await else {
        panic!("session should have survived the failed login");
    };
    assert_eq!(current.token, session.token);
}

#[tokio::test]
async fn logout_is_idempotent_and_clears_the_vault() {
    let backend = Arc::new(backend_with_farmer().await);
    let vault = Arc::new(MemoryVault::new());
    let store = SessionStore::new(backend, Arc::clone(&vault) as Arc<dyn SessionVault>);
    store.restore().await;

    store.login("farmer", "secret").await.unwrap();
    assert!(vault.load().await.unwrap().is_some());

    store.logout().await;
    assert_eq!(store.snapshot().await, SessionPhase::Unauthenticated);
    assert!(vault.load().await.unwrap().is_none());

    // Logging out without a session is a no-op.
    store.logout().await;
    assert_eq!(store.snapshot().await, SessionPhase::Unauthenticated);
}

#[tokio::test]
async fn update_profile_merges_the_name_and_keeps_the_token() {
    let backend = Arc::new(backend_with_farmer().await);
    let vault = Arc::new(MemoryVault::new());
    let store = SessionStore::new(backend, Arc::clone(&vault) as Arc<dyn SessionVault>);
    store.restore().await;

    let before = store.login("farmer", "secret").await.unwrap();

    store
        .update_profile(ProfileUpdate {
            full_name: "Sara T. Bekele".into(),
            email: "sara@shamba.dev".into(),
            password: None,
        })
        .await
        .unwrap();

    let SessionPhase::Authenticated(after) = store.snapshot().await else {
        panic!("expected an authenticated session");
    };
    assert_eq!(&*after.display_name, "Sara T. Bekele");
    assert_eq!(after.token, before.token);

    let persisted = vault.load().await.unwrap().expect("vault rewritten");
    assert_eq!(persisted.display_name, "Sara T. Bekele");
}

#[tokio::test]
async fn update_profile_without_a_session_is_refused() {
    let store = SessionStore::new(Arc::new(MockBackend::new()), Arc::new(MemoryVault::new()));
    store.restore().await;

    let err = store
        .update_profile(ProfileUpdate {
            full_name: "Nobody".into(),
            email: "nobody@shamba.dev".into(),
            password: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Rejected(_)));
}

#[tokio::test]
async fn file_vault_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let vault = FileVault::new(dir.path().join("session.toml"));

    assert!(vault.load().await.unwrap().is_none());

    let session = PersistedSession {
        access_token: "tok-9".to_string(),
        role: "ADMIN".to_string(),
        display_name: "Abeba".to_string(),
    };
    vault.save(&session).await.unwrap();
    assert_eq!(vault.load().await.unwrap(), Some(session));

    vault.clear().await.unwrap();
    assert!(vault.load().await.unwrap().is_none());

    // Clearing an already-empty vault stays a no-op.
    vault.clear().await.unwrap();
}
