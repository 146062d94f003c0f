use serde_json::json;

use super::models::ActivityLog;
use super::{encode_segment, WorkbenchApi};
use crate::cache::{CacheKey, Tag, TagKind};
use crate::error::{require_non_empty, ClientResult};
use crate::http::{ApiRequest, CancelToken};

impl WorkbenchApi {
    /// Activity log for one resource, e.g. `("workspace", "w1")`
    pub async fn list_activity(
        &self,
        resource_type: &str,
        resource_id: &str,
        cancel: &CancelToken,
    ) -> ClientResult<Vec<ActivityLog>> {
        require_non_empty("resource type", resource_type)?;
        require_non_empty("resource id", resource_id)?;

        let key = CacheKey::new("listActivity", &json!({ "type": resource_type, "id": resource_id }));
        let tag_id = format!("{}/{}", resource_type, resource_id);
        self.query(
            key,
            ApiRequest::get(format!(
                "/activity-logs/{}/{}",
                encode_segment(resource_type),
                encode_segment(resource_id)
            )),
            |_: &Vec<ActivityLog>| vec![Tag::id(TagKind::ActivityLog, tag_id)],
            cancel,
        )
        .await
    }
}
