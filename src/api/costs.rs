use serde_json::json;

use super::models::CostSummary;
use super::workspaces::workspace_path;
use super::WorkbenchApi;
use crate::cache::{CacheKey, Tag, TagKind};
use crate::error::ClientResult;
use crate::http::{ApiRequest, CancelToken};

impl WorkbenchApi {
    /// Cost totals and per-service breakdown for a workspace
    pub async fn cost_summary(&self, workspace_id: &str, cancel: &CancelToken) -> ClientResult<CostSummary> {
        let key = CacheKey::new("getCostSummary", &json!({ "workspace": workspace_id }));
        self.query(
            key,
            ApiRequest::get(format!("{}/costs", workspace_path(workspace_id))),
            |_: &CostSummary| vec![Tag::id(TagKind::Cost, workspace_id)],
            cancel,
        )
        .await
    }
}
