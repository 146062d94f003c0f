mod common;

use anyhow::Result;
use workbench_client::auth::{FileTokenStore, MemoryTokenStore, SessionManager, TokenStore};
use workbench_client::{CancelToken, ClientError, PermissionLevel, Resource};

#[tokio::test]
async fn login_fetches_role_permissions_with_fresh_bearer() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let mut api = backend.api()?;
    let sessions = SessionManager::new(MemoryTokenStore::new());

    let session = sessions
        .login(common::tokens_for("ada", "Admin"), &api, &CancelToken::new())
        .await?;

    assert_eq!(session.username(), "ada");
    assert_eq!(session.role(), "Admin");
    assert_eq!(backend.state.hits("GET /roles/Admin"), 1);
    assert_eq!(backend.state.last_authorization().as_deref(), Some("Bearer access-ada"));

    let resolver = session.resolver();
    assert!(resolver.can_full_access(Resource::Workspaces));
    assert!(resolver.can_delete(Resource::Workspaces));
    assert!(resolver.can_manage(Resource::Datasources));
    assert!(!resolver.can_delete(Resource::Datasources));
    assert!(resolver.can(Resource::Users, PermissionLevel::View));
    assert!(!resolver.can_perform_api_operation("/users/u1/role", "PUT"));

    api.begin_session(session);
    let page = api.list_workspaces(workbench_client::api::PageRequest::first(10), &CancelToken::new()).await?;
    assert_eq!(page.items.len(), 3);
    assert_eq!(backend.state.last_authorization().as_deref(), Some("Bearer access-ada"));
    Ok(())
}

#[tokio::test]
async fn default_role_and_unrecognised_permissions() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = backend.api()?;
    let sessions = SessionManager::new(MemoryTokenStore::new());

    let viewer = sessions
        .login(common::tokens_for("bo", "Default"), &api, &CancelToken::new())
        .await?;
    assert!(viewer.resolver().can_view(Resource::Workspaces));
    assert!(!viewer.resolver().can_manage(Resource::Workspaces));
    assert!(!viewer.resolver().can_perform_api_operation("/workspaces", "POST"));

    let auditor = sessions
        .login(common::tokens_for("cy", "Auditor"), &api, &CancelToken::new())
        .await?;
    // An explicit delete entry grants delete and nothing more
    assert!(auditor.resolver().can_delete(Resource::Workspaces));
    assert!(!auditor.resolver().can_manage(Resource::Workspaces));
    // The misspelt entry is dropped rather than guessed at
    assert_eq!(auditor.permissions().rejected(), &["costs.veiw".to_string()]);
    assert!(!auditor.resolver().can_view(Resource::Costs));
    Ok(())
}

#[tokio::test]
async fn session_survives_restart_and_clears_on_logout() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = backend.api()?;
    let dir = std::env::temp_dir().join(format!("workbench_it_{}", uuid::Uuid::new_v4().simple()));
    std::fs::create_dir_all(&dir)?;

    let first = SessionManager::new(FileTokenStore::in_dir(&dir));
    let session = first
        .login(common::tokens_for("ada", "Admin"), &api, &CancelToken::new())
        .await?;
    assert!(dir.join("session.json").exists());

    // A second process restores without asking the API again
    let second = SessionManager::new(FileTokenStore::in_dir(&dir));
    let restored = second.restore()?.expect("stored session");
    assert_eq!(restored.username(), "ada");
    assert_eq!(restored.permissions(), session.permissions());
    assert_eq!(backend.state.hits("GET /roles/Admin"), 1);

    second.logout()?;
    assert!(second.store().load()?.is_none());
    assert!(first.restore()?.is_none());

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[tokio::test]
async fn unknown_role_fails_login_and_stores_nothing() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = backend.api()?;
    let sessions = SessionManager::new(MemoryTokenStore::new());

    let result = sessions
        .login(common::tokens_for("eve", "Ghost"), &api, &CancelToken::new())
        .await;

    match result {
        Err(ClientError::NotFound(message)) => assert_eq!(message, "Role not found"),
        other => panic!("expected NotFound, got {:?}", other.map(|s| s.username().to_string())),
    }
    assert!(sessions.restore()?.is_none());
    Ok(())
}

#[tokio::test]
async fn corrupt_session_file_is_discarded() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = backend.api()?;
    let dir = std::env::temp_dir().join(format!("workbench_it_{}", uuid::Uuid::new_v4().simple()));
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("session.json"), "{truncated")?;

    let sessions = SessionManager::new(FileTokenStore::in_dir(&dir));
    assert!(sessions.restore()?.is_none());
    assert!(!dir.join("session.json").exists());

    // Login works again without manual cleanup
    let session = sessions
        .login(common::tokens_for("ada", "Admin"), &api, &CancelToken::new())
        .await?;
    assert_eq!(sessions.restore()?.map(|s| s.username().to_string()), Some(session.username().to_string()));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
