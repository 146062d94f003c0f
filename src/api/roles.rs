use serde_json::{json, Value};

use super::models::{Role, RoleDefinition};
use super::{encode_segment, WorkbenchApi};
use crate::cache::{CacheKey, Tag, TagKind};
use crate::error::ClientResult;
use crate::http::{ApiRequest, CancelToken};

pub fn role_path(name: &str) -> String {
    format!("/roles/{}", encode_segment(name))
}

// Users display their role, so role changes drop cached user lists too
fn role_invalidations(name: Option<&str>) -> Vec<Tag> {
    let mut tags = vec![Tag::list(TagKind::Role), Tag::list(TagKind::User)];
    if let Some(name) = name {
        tags.push(Tag::id(TagKind::Role, name));
    }
    tags
}

impl WorkbenchApi {
    pub async fn list_roles(&self, cancel: &CancelToken) -> ClientResult<Vec<Role>> {
        let key = CacheKey::new("listRoles", &json!({}));
        self.query(
            key,
            ApiRequest::get("/roles"),
            |roles: &Vec<Role>| Tag::list_with_ids(TagKind::Role, roles.iter().map(|r| r.name.as_str())),
            cancel,
        )
        .await
    }

    pub async fn get_role(&self, name: &str, cancel: &CancelToken) -> ClientResult<Role> {
        let key = CacheKey::new("getRole", &json!({ "name": name }));
        self.query(
            key,
            ApiRequest::get(role_path(name)),
            |_: &Role| vec![Tag::id(TagKind::Role, name)],
            cancel,
        )
        .await
    }

    pub async fn create_role(&self, role: &RoleDefinition, cancel: &CancelToken) -> ClientResult<Role> {
        role.validate()?;
        self.mutate(ApiRequest::post("/roles").json(role)?, role_invalidations(None), cancel)
            .await
    }

    pub async fn update_role(&self, role: &RoleDefinition, cancel: &CancelToken) -> ClientResult<Role> {
        role.validate()?;
        self.mutate(
            ApiRequest::put(role_path(&role.name)).json(role)?,
            role_invalidations(Some(&role.name)),
            cancel,
        )
        .await
    }

    pub async fn delete_role(&self, name: &str, cancel: &CancelToken) -> ClientResult<()> {
        self.mutate::<Value>(ApiRequest::delete(role_path(name)), role_invalidations(Some(name)), cancel)
            .await
            .map(|_| ())
    }
}
