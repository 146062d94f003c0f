mod common;

use std::time::Duration;

use anyhow::Result;
use workbench_client::api::models::{CreateWorkspace, UpdateWorkspace};
use workbench_client::api::PageRequest;
use workbench_client::auth::{MemoryTokenStore, SessionManager};
use workbench_client::{CancelToken, ClientError, WorkbenchApi};

async fn admin_api(backend: &common::MockBackend) -> Result<WorkbenchApi> {
    let mut api = backend.api()?;
    let session = SessionManager::new(MemoryTokenStore::new())
        .login(common::tokens_for("ada", "Admin"), &api, &CancelToken::new())
        .await?;
    api.begin_session(session);
    Ok(api)
}

#[tokio::test]
async fn repeated_queries_are_served_from_cache() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = admin_api(&backend).await?;
    let cancel = CancelToken::new();

    let first = api.list_workspaces(PageRequest::first(10), &cancel).await?;
    let second = api.list_workspaces(PageRequest::first(10), &cancel).await?;
    assert_eq!(first, second);
    assert_eq!(backend.state.hits("GET /workspaces"), 1);

    // Different arguments are a different entry
    api.list_workspaces(PageRequest::new(2, 1), &cancel).await?;
    assert_eq!(backend.state.hits("GET /workspaces"), 2);
    Ok(())
}

#[tokio::test]
async fn update_invalidates_detail_and_list() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = admin_api(&backend).await?;
    let cancel = CancelToken::new();

    api.get_workspace("w1", &cancel).await?;
    api.get_workspace("w2", &cancel).await?;
    api.list_workspaces(PageRequest::first(10), &cancel).await?;

    let input = UpdateWorkspace {
        workspace_name: Some("Analytics EU".to_string()),
        description: None,
    };
    let updated = api.update_workspace("w1", &input, &cancel).await?;
    assert_eq!(updated.workspace_name, "Analytics EU");

    let w1 = api.get_workspace("w1", &cancel).await?;
    assert_eq!(w1.workspace_name, "Analytics EU");
    assert_eq!(backend.state.hits("GET /workspaces/w1"), 2);

    // Untouched detail stays cached
    api.get_workspace("w2", &cancel).await?;
    assert_eq!(backend.state.hits("GET /workspaces/w2"), 1);

    let list = api.list_workspaces(PageRequest::first(10), &cancel).await?;
    assert_eq!(backend.state.hits("GET /workspaces"), 2);
    assert!(list.items.iter().any(|w| w.workspace_name == "Analytics EU"));
    Ok(())
}

#[tokio::test]
async fn failed_mutation_leaves_cache_alone() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = admin_api(&backend).await?;
    let cancel = CancelToken::new();

    api.get_workspace("w1", &cancel).await?;
    let input = UpdateWorkspace {
        workspace_name: Some("taken".to_string()),
        description: None,
    };

    match api.update_workspace("w1", &input, &cancel).await {
        Err(ClientError::Http { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Workspace name already taken");
        }
        other => panic!("expected conflict, got {:?}", other),
    }

    api.get_workspace("w1", &cancel).await?;
    assert_eq!(backend.state.hits("GET /workspaces/w1"), 1);
    Ok(())
}

#[tokio::test]
async fn validation_errors_send_nothing() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = admin_api(&backend).await?;

    let input = CreateWorkspace {
        workspace_name: "   ".to_string(),
        description: None,
    };
    let err = api.create_workspace(&input, &CancelToken::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation { ref field, .. } if field == "workspace name"));
    assert_eq!(backend.state.hits("POST /workspaces"), 0);
    Ok(())
}

#[tokio::test]
async fn create_and_delete_refresh_the_list() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = admin_api(&backend).await?;
    let cancel = CancelToken::new();

    let before = api.list_workspaces(PageRequest::first(10), &cancel).await?;
    assert_eq!(before.items.len(), 3);

    let created = api
        .create_workspace(
            &CreateWorkspace {
                workspace_name: "Sandbox".to_string(),
                description: Some("scratch space".to_string()),
            },
            &cancel,
        )
        .await?;
    assert_eq!(created.workspace_status.as_deref(), Some("Draft"));

    let after_create = api.list_workspaces(PageRequest::first(10), &cancel).await?;
    assert_eq!(after_create.items.len(), 4);

    // 204 with no body
    api.delete_workspace("w2", &cancel).await?;
    let after_delete = api.list_workspaces(PageRequest::first(10), &cancel).await?;
    assert_eq!(after_delete.items.len(), 3);
    assert!(after_delete.items.iter().all(|w| w.workspace_id != "w2"));
    assert_eq!(backend.state.hits("GET /workspaces"), 3);
    Ok(())
}

#[tokio::test]
async fn pages_are_requested_by_limit_and_offset() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = admin_api(&backend).await?;

    let request = PageRequest::new(2, 1);
    let page = api.list_workspaces(request, &CancelToken::new()).await?;
    assert_eq!(backend.state.last_query("limit").as_deref(), Some("1"));
    assert_eq!(backend.state.last_query("offset").as_deref(), Some("2"));
    assert_eq!(page.items[0].workspace_id, "w2");

    let window = page.window(request);
    assert_eq!(window.total_pages, 3);
    assert!(window.has_previous);
    assert!(window.has_next);
    assert_eq!(window.pages, vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn cancelled_query_is_not_cached() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = admin_api(&backend).await?;
    let cancel = CancelToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let result = api.get_workspace("slow", &cancel).await;
    assert!(matches!(result, Err(ClientError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(api.cache().is_empty());

    // A fired token short-circuits before any request goes out
    let hits = backend.state.hits("GET /workspaces/w1");
    assert!(matches!(api.get_workspace("w1", &cancel).await, Err(ClientError::Cancelled)));
    assert_eq!(backend.state.hits("GET /workspaces/w1"), hits);
    Ok(())
}

#[tokio::test]
async fn deleting_a_workspace_drops_its_costs() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = admin_api(&backend).await?;
    let cancel = CancelToken::new();

    api.cost_summary("w1", &cancel).await?;
    api.cost_summary("w1", &cancel).await?;
    assert_eq!(backend.state.hits("GET /workspaces/w1/costs"), 1);

    api.delete_workspace("w1", &cancel).await?;
    api.cost_summary("w1", &cancel).await?;
    assert_eq!(backend.state.hits("GET /workspaces/w1/costs"), 2);
    Ok(())
}
