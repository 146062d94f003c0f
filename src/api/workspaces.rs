use serde_json::{json, Value};

use super::models::{CreateWorkspace, GrantAccess, UpdateWorkspace, Workspace, WorkspaceUser};
use super::pagination::{PageRequest, Paged};
use super::{encode_segment, WorkbenchApi};
use crate::cache::{CacheKey, Tag, TagKind};
use crate::error::ClientResult;
use crate::http::{ApiRequest, CancelToken};

pub fn workspace_path(id: &str) -> String {
    format!("/workspaces/{}", encode_segment(id))
}

// Everything scoped under the workspace goes with it
fn workspace_delete_invalidations(id: &str) -> Vec<Tag> {
    vec![
        Tag::id(TagKind::Workspace, id),
        Tag::list(TagKind::Workspace),
        Tag::kind(TagKind::Solution),
        Tag::kind(TagKind::WorkspaceUser),
        Tag::kind(TagKind::Cost),
    ]
}

impl WorkbenchApi {
    pub async fn list_workspaces(&self, page: PageRequest, cancel: &CancelToken) -> ClientResult<Paged<Workspace>> {
        let key = CacheKey::new("listWorkspaces", &json!(page));
        self.query(
            key,
            ApiRequest::get("/workspaces").page(page),
            |paged: &Paged<Workspace>| {
                Tag::list_with_ids(TagKind::Workspace, paged.items.iter().map(|w| w.workspace_id.as_str()))
            },
            cancel,
        )
        .await
    }

    pub async fn get_workspace(&self, id: &str, cancel: &CancelToken) -> ClientResult<Workspace> {
        let key = CacheKey::new("getWorkspace", &json!({ "id": id }));
        self.query(
            key,
            ApiRequest::get(workspace_path(id)),
            |_: &Workspace| vec![Tag::id(TagKind::Workspace, id)],
            cancel,
        )
        .await
    }

    /// Fetch a workspace, bypassing any cached copy
    pub async fn refetch_workspace(&self, id: &str, cancel: &CancelToken) -> ClientResult<Workspace> {
        let key = CacheKey::new("getWorkspace", &json!({ "id": id }));
        self.refetch(
            key,
            ApiRequest::get(workspace_path(id)),
            |_: &Workspace| vec![Tag::id(TagKind::Workspace, id)],
            cancel,
        )
        .await
    }

    pub async fn create_workspace(&self, input: &CreateWorkspace, cancel: &CancelToken) -> ClientResult<Workspace> {
        input.validate()?;
        self.mutate(
            ApiRequest::post("/workspaces").json(input)?,
            vec![Tag::list(TagKind::Workspace)],
            cancel,
        )
        .await
    }

    pub async fn update_workspace(
        &self,
        id: &str,
        input: &UpdateWorkspace,
        cancel: &CancelToken,
    ) -> ClientResult<Workspace> {
        input.validate()?;
        self.mutate(
            ApiRequest::put(workspace_path(id)).json(input)?,
            vec![Tag::id(TagKind::Workspace, id), Tag::list(TagKind::Workspace)],
            cancel,
        )
        .await
    }

    pub async fn delete_workspace(&self, id: &str, cancel: &CancelToken) -> ClientResult<()> {
        self.mutate::<Value>(
            ApiRequest::delete(workspace_path(id)),
            workspace_delete_invalidations(id),
            cancel,
        )
        .await
        .map(|_| ())
    }

    pub async fn list_workspace_users(&self, id: &str, cancel: &CancelToken) -> ClientResult<Vec<WorkspaceUser>> {
        let key = CacheKey::new("listWorkspaceUsers", &json!({ "id": id }));
        self.query(
            key,
            ApiRequest::get(format!("{}/users", workspace_path(id))),
            |_: &Vec<WorkspaceUser>| vec![Tag::id(TagKind::WorkspaceUser, id)],
            cancel,
        )
        .await
    }

    pub async fn grant_workspace_access(
        &self,
        id: &str,
        grant: &GrantAccess,
        cancel: &CancelToken,
    ) -> ClientResult<WorkspaceUser> {
        grant.validate()?;
        self.mutate(
            ApiRequest::post(format!("{}/users", workspace_path(id))).json(grant)?,
            vec![Tag::id(TagKind::WorkspaceUser, id)],
            cancel,
        )
        .await
    }

    pub async fn revoke_workspace_access(&self, id: &str, user_id: &str, cancel: &CancelToken) -> ClientResult<()> {
        self.mutate::<Value>(
            ApiRequest::delete(format!("{}/users/{}", workspace_path(id), encode_segment(user_id))),
            vec![Tag::id(TagKind::WorkspaceUser, id)],
            cancel,
        )
        .await
        .map(|_| ())
    }
}
