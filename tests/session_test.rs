use campaign_client::{
    config::Config, models::session::Session, services::session_service::SessionStore, AppContext,
};
use chrono::Utc;
use pretty_assertions::assert_eq;

fn signed_in() -> Session {
    Session {
        token: Some("tok-abc".to_string()),
        organization_id: Some("org-1".to_string()),
        user_email: Some("front-desk@clinic.example".to_string()),
        signed_in_at: Some(Utc::now()),
    }
}

#[tokio::test]
async fn missing_session_file_means_signed_out() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));

    let session = store.load().await.unwrap();

    assert_eq!(session, Session::default());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn save_load_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    let session = signed_in();

    store.save(&session).await.unwrap();
    assert_eq!(store.load().await.unwrap(), session);

    store.clear().await.unwrap();
    assert!(!store.path().exists());
    // Clearing twice is fine.
    store.clear().await.unwrap();
}

#[tokio::test]
async fn corrupt_session_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    tokio::fs::write(&path, "{not json").await.unwrap();

    assert!(SessionStore::new(&path).load().await.is_err());
}

#[tokio::test]
async fn app_context_persists_an_authenticated_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let mut config = Config::with_base_url("http://localhost:9/api");
    config.session_file = path.to_string_lossy().into_owned();

    let context = AppContext::load(config.clone()).await.unwrap();
    assert!(!context.session.is_authenticated());
    context.shutdown().await.unwrap();
    assert!(!path.exists());

    let context = AppContext::new(config.clone(), signed_in()).unwrap();
    context.shutdown().await.unwrap();

    let reloaded = AppContext::load(config).await.unwrap();
    assert_eq!(reloaded.session.organization_id.as_deref(), Some("org-1"));
}

#[cfg(unix)]
#[tokio::test]
async fn session_file_is_private_to_the_owner() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    tokio::fs::write(&path, "{}").await.unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    SessionStore::new(&path).save(&signed_in()).await.unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
