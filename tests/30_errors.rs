mod common;

use anyhow::Result;
use rust_decimal::Decimal;
use workbench_client::api::PageRequest;
use workbench_client::auth::{MemoryTokenStore, SessionManager};
use workbench_client::{CancelToken, ClientError};

#[tokio::test]
async fn requests_without_a_session_are_unauthenticated() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let api = backend.api()?;

    let err = api
        .list_workspaces(PageRequest::first(10), &CancelToken::new())
        .await
        .unwrap_err();
    match err {
        ClientError::Unauthenticated(message) => assert_eq!(message, "Missing bearer token"),
        other => panic!("expected Unauthenticated, got {:?}", other),
    }
    assert_eq!(backend.state.last_authorization(), None);
    Ok(())
}

#[tokio::test]
async fn plain_text_errors_keep_their_body() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let mut api = backend.api()?;
    let session = SessionManager::new(MemoryTokenStore::new())
        .login(common::tokens_for("ada", "Admin"), &api, &CancelToken::new())
        .await?;
    api.begin_session(session);

    let err = api
        .list_datasources(PageRequest::first(10), &CancelToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.error_code(), "HTTP_ERROR");
    assert_eq!(err.to_string(), "upstream exploded (HTTP 500)");

    let missing = api.get_workspace("nope", &CancelToken::new()).await.unwrap_err();
    assert!(matches!(missing, ClientError::NotFound(ref m) if m == "Workspace not found"));
    Ok(())
}

#[tokio::test]
async fn cost_summary_decodes_decimal_amounts() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let mut api = backend.api()?;
    let session = SessionManager::new(MemoryTokenStore::new())
        .login(common::tokens_for("bo", "Default"), &api, &CancelToken::new())
        .await?;
    api.begin_session(session);

    let summary = api.cost_summary("w1", &CancelToken::new()).await?;
    assert_eq!(summary.total_cost, Decimal::new(12840, 2));
    let top: Vec<&str> = summary.top_services().iter().map(|s| s.service.as_str()).collect();
    assert_eq!(top, vec!["Redshift", "Glue", "S3"]);

    api.end_session();
    assert!(api.cache().is_empty());
    assert!(api.session().is_none());
    Ok(())
}
