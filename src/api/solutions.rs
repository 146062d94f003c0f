use serde_json::{json, Value};

use super::models::{CreateSolution, Solution, UpdateSolution};
use super::pagination::{PageRequest, Paged};
use super::workspaces::workspace_path;
use super::{encode_segment, WorkbenchApi};
use crate::cache::{CacheKey, Tag, TagKind};
use crate::error::ClientResult;
use crate::http::{ApiRequest, CancelToken};

pub fn solution_path(workspace_id: &str, solution_id: &str) -> String {
    format!("{}/solutions/{}", workspace_path(workspace_id), encode_segment(solution_id))
}

// Solution changes also invalidate the parent workspace, whose detail view
// carries solution counts and status.
fn solution_invalidations(workspace_id: &str, solution_id: Option<&str>) -> Vec<Tag> {
    let mut tags = vec![Tag::list(TagKind::Solution), Tag::id(TagKind::Workspace, workspace_id)];
    if let Some(id) = solution_id {
        tags.push(Tag::id(TagKind::Solution, id));
    }
    tags
}

impl WorkbenchApi {
    pub async fn list_solutions(
        &self,
        workspace_id: &str,
        page: PageRequest,
        cancel: &CancelToken,
    ) -> ClientResult<Paged<Solution>> {
        let key = CacheKey::new("listSolutions", &json!({ "workspace": workspace_id, "page": page }));
        self.query(
            key,
            ApiRequest::get(format!("{}/solutions", workspace_path(workspace_id))).page(page),
            |paged: &Paged<Solution>| {
                Tag::list_with_ids(TagKind::Solution, paged.items.iter().map(|s| s.solution_id.as_str()))
            },
            cancel,
        )
        .await
    }

    pub async fn get_solution(
        &self,
        workspace_id: &str,
        solution_id: &str,
        cancel: &CancelToken,
    ) -> ClientResult<Solution> {
        let key = CacheKey::new("getSolution", &json!({ "workspace": workspace_id, "id": solution_id }));
        self.query(
            key,
            ApiRequest::get(solution_path(workspace_id, solution_id)),
            |_: &Solution| vec![Tag::id(TagKind::Solution, solution_id)],
            cancel,
        )
        .await
    }

    pub async fn create_solution(
        &self,
        workspace_id: &str,
        input: &CreateSolution,
        cancel: &CancelToken,
    ) -> ClientResult<Solution> {
        input.validate()?;
        self.mutate(
            ApiRequest::post(format!("{}/solutions", workspace_path(workspace_id))).json(input)?,
            solution_invalidations(workspace_id, None),
            cancel,
        )
        .await
    }

    pub async fn update_solution(
        &self,
        workspace_id: &str,
        solution_id: &str,
        input: &UpdateSolution,
        cancel: &CancelToken,
    ) -> ClientResult<Solution> {
        input.validate()?;
        self.mutate(
            ApiRequest::put(solution_path(workspace_id, solution_id)).json(input)?,
            solution_invalidations(workspace_id, Some(solution_id)),
            cancel,
        )
        .await
    }

    pub async fn delete_solution(&self, workspace_id: &str, solution_id: &str, cancel: &CancelToken) -> ClientResult<()> {
        let mut tags = solution_invalidations(workspace_id, Some(solution_id));
        tags.push(Tag::kind(TagKind::Execution));
        self.mutate::<Value>(ApiRequest::delete(solution_path(workspace_id, solution_id)), tags, cancel)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_path_encodes_ids() {
        assert_eq!(solution_path("w 1", "s/2"), "/workspaces/w%201/solutions/s%2F2");
    }

    #[test]
    fn test_update_invalidates_parent_workspace() {
        let tags = solution_invalidations("w1", Some("s1"));
        assert!(tags.contains(&Tag::id(TagKind::Workspace, "w1")));
        assert!(tags.contains(&Tag::id(TagKind::Solution, "s1")));
        assert!(tags.contains(&Tag::list(TagKind::Solution)));
    }
}
