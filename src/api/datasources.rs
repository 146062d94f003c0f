use serde_json::{json, Value};

use super::models::{AttachDatasource, CreateDatasource, Datasource, Solution, UpdateDatasource};
use super::pagination::{PageRequest, Paged};
use super::solutions::solution_path;
use super::{encode_segment, WorkbenchApi};
use crate::cache::{CacheKey, Tag, TagKind};
use crate::error::{require_non_empty, ClientResult};
use crate::http::{ApiRequest, CancelToken};

pub fn datasource_path(id: &str) -> String {
    format!("/datasources/{}", encode_segment(id))
}

fn attachment_invalidations(solution_id: &str) -> Vec<Tag> {
    vec![Tag::id(TagKind::Solution, solution_id), Tag::list(TagKind::Datasource)]
}

impl WorkbenchApi {
    pub async fn list_datasources(&self, page: PageRequest, cancel: &CancelToken) -> ClientResult<Paged<Datasource>> {
        let key = CacheKey::new("listDatasources", &json!(page));
        self.query(
            key,
            ApiRequest::get("/datasources").page(page),
            |paged: &Paged<Datasource>| {
                Tag::list_with_ids(TagKind::Datasource, paged.items.iter().map(|d| d.datasource_id.as_str()))
            },
            cancel,
        )
        .await
    }

    pub async fn get_datasource(&self, id: &str, cancel: &CancelToken) -> ClientResult<Datasource> {
        let key = CacheKey::new("getDatasource", &json!({ "id": id }));
        self.query(
            key,
            ApiRequest::get(datasource_path(id)),
            |_: &Datasource| vec![Tag::id(TagKind::Datasource, id)],
            cancel,
        )
        .await
    }

    pub async fn create_datasource(&self, input: &CreateDatasource, cancel: &CancelToken) -> ClientResult<Datasource> {
        input.validate()?;
        self.mutate(
            ApiRequest::post("/datasources").json(input)?,
            vec![Tag::list(TagKind::Datasource)],
            cancel,
        )
        .await
    }

    pub async fn update_datasource(
        &self,
        id: &str,
        input: &UpdateDatasource,
        cancel: &CancelToken,
    ) -> ClientResult<Datasource> {
        input.validate()?;
        self.mutate(
            ApiRequest::put(datasource_path(id)).json(input)?,
            vec![Tag::id(TagKind::Datasource, id), Tag::list(TagKind::Datasource)],
            cancel,
        )
        .await
    }

    pub async fn delete_datasource(&self, id: &str, cancel: &CancelToken) -> ClientResult<()> {
        self.mutate::<Value>(
            ApiRequest::delete(datasource_path(id)),
            vec![
                Tag::id(TagKind::Datasource, id),
                Tag::list(TagKind::Datasource),
                // Solutions list their attached datasources
                Tag::kind(TagKind::Solution),
            ],
            cancel,
        )
        .await
        .map(|_| ())
    }

    /// Attach an existing datasource to a solution
    pub async fn attach_datasource(
        &self,
        workspace_id: &str,
        solution_id: &str,
        datasource_id: &str,
        cancel: &CancelToken,
    ) -> ClientResult<Solution> {
        require_non_empty("datasource id", datasource_id)?;
        let body = AttachDatasource {
            datasource_id: datasource_id.to_string(),
        };
        self.mutate(
            ApiRequest::post(format!("{}/datasources", solution_path(workspace_id, solution_id))).json(&body)?,
            attachment_invalidations(solution_id),
            cancel,
        )
        .await
    }

    pub async fn detach_datasource(
        &self,
        workspace_id: &str,
        solution_id: &str,
        datasource_id: &str,
        cancel: &CancelToken,
    ) -> ClientResult<()> {
        self.mutate::<Value>(
            ApiRequest::delete(format!(
                "{}/datasources/{}",
                solution_path(workspace_id, solution_id),
                encode_segment(datasource_id)
            )),
            attachment_invalidations(solution_id),
            cancel,
        )
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QueryCache;

    #[test]
    fn test_attachment_refreshes_solution_and_datasource_list() {
        let cache = QueryCache::new(true);
        let solution = CacheKey::new("getSolution", &json!({ "id": "s1" }));
        let other = CacheKey::new("getSolution", &json!({ "id": "s2" }));
        let list = CacheKey::new("listDatasources", &json!({ "page": 1 }));
        let detail = CacheKey::new("getDatasource", &json!({ "id": "d1" }));
        cache.store(cache.begin(), solution.clone(), vec![Tag::id(TagKind::Solution, "s1")], json!({}));
        cache.store(cache.begin(), other.clone(), vec![Tag::id(TagKind::Solution, "s2")], json!({}));
        cache.store(cache.begin(), list.clone(), Tag::list_with_ids(TagKind::Datasource, ["d1"]), json!([]));
        cache.store(cache.begin(), detail.clone(), vec![Tag::id(TagKind::Datasource, "d1")], json!({}));

        assert_eq!(cache.invalidate(&attachment_invalidations("s1")), 2);
        assert!(!cache.contains(&solution));
        assert!(!cache.contains(&list));
        assert!(cache.contains(&other));
        assert!(cache.contains(&detail));
    }
}
