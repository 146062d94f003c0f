use serde_json::json;

use super::models::{AssignRole, User};
use super::pagination::{PageRequest, Paged};
use super::{encode_segment, WorkbenchApi};
use crate::cache::{CacheKey, Tag, TagKind};
use crate::error::ClientResult;
use crate::http::{ApiRequest, CancelToken};

pub fn user_path(id: &str) -> String {
    format!("/users/{}", encode_segment(id))
}

fn role_assignment_invalidations(user_id: &str) -> Vec<Tag> {
    vec![Tag::id(TagKind::User, user_id), Tag::list(TagKind::User)]
}

impl WorkbenchApi {
    pub async fn list_users(&self, page: PageRequest, cancel: &CancelToken) -> ClientResult<Paged<User>> {
        let key = CacheKey::new("listUsers", &json!(page));
        self.query(
            key,
            ApiRequest::get("/users").page(page),
            |paged: &Paged<User>| Tag::list_with_ids(TagKind::User, paged.items.iter().map(|u| u.user_id.as_str())),
            cancel,
        )
        .await
    }

    pub async fn get_user(&self, id: &str, cancel: &CancelToken) -> ClientResult<User> {
        let key = CacheKey::new("getUser", &json!({ "id": id }));
        self.query(
            key,
            ApiRequest::get(user_path(id)),
            |_: &User| vec![Tag::id(TagKind::User, id)],
            cancel,
        )
        .await
    }

    pub async fn assign_role(&self, user_id: &str, role: &str, cancel: &CancelToken) -> ClientResult<User> {
        let body = AssignRole { role: role.to_string() };
        body.validate()?;
        self.mutate(
            ApiRequest::put(format!("{}/role", user_path(user_id))).json(&body)?,
            role_assignment_invalidations(user_id),
            cancel,
        )
        .await
    }
}
