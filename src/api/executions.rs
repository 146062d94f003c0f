use serde_json::json;

use super::models::Execution;
use super::solutions::solution_path;
use super::{encode_segment, WorkbenchApi};
use crate::cache::{CacheKey, Tag, TagKind};
use crate::error::ClientResult;
use crate::http::{ApiRequest, CancelToken};

impl WorkbenchApi {
    pub async fn list_executions(
        &self,
        workspace_id: &str,
        solution_id: &str,
        cancel: &CancelToken,
    ) -> ClientResult<Vec<Execution>> {
        let key = CacheKey::new(
            "listExecutions",
            &json!({ "workspace": workspace_id, "solution": solution_id }),
        );
        self.query(
            key,
            ApiRequest::get(format!("{}/executions", solution_path(workspace_id, solution_id))),
            |runs: &Vec<Execution>| {
                Tag::list_with_ids(TagKind::Execution, runs.iter().map(|e| e.execution_id.as_str()))
            },
            cancel,
        )
        .await
    }

    pub async fn get_execution(
        &self,
        workspace_id: &str,
        solution_id: &str,
        execution_id: &str,
        cancel: &CancelToken,
    ) -> ClientResult<Execution> {
        let key = CacheKey::new(
            "getExecution",
            &json!({ "workspace": workspace_id, "solution": solution_id, "id": execution_id }),
        );
        self.query(
            key,
            ApiRequest::get(format!(
                "{}/executions/{}",
                solution_path(workspace_id, solution_id),
                encode_segment(execution_id)
            )),
            |_: &Execution| vec![Tag::id(TagKind::Execution, execution_id)],
            cancel,
        )
        .await
    }
}
