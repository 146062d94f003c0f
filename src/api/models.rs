//! Records mirrored 1:1 from the API's JSON. The backend emits PascalCase
//! field names; ids also accept a bare `Id` alias.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{require_non_empty, ClientResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Workspace {
    #[serde(alias = "Id")]
    pub workspace_id: String,
    pub workspace_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub workspace_status: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified_at: Option<DateTime<Utc>>,
}

/// A user's access grant on a workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkspaceUser {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    pub access: String,
    #[serde(default)]
    pub granted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Solution {
    #[serde(alias = "Id")]
    pub solution_id: String,
    pub solution_name: String,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub solution_status: Option<String>,
    #[serde(default)]
    pub datasources: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Datasource {
    #[serde(alias = "Id")]
    pub datasource_id: String,
    pub datasource_name: String,
    pub datasource_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub datasource_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    #[serde(alias = "Role")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(alias = "Id")]
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Execution {
    #[serde(alias = "Id")]
    pub execution_id: String,
    pub execution_status: String,
    #[serde(default)]
    pub triggered_by: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActivityLog {
    #[serde(alias = "Id")]
    pub log_id: String,
    pub action: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    pub event_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceCost {
    pub service: String,
    pub cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CostSummary {
    pub total_cost: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub period_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub breakdown: Vec<ServiceCost>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl CostSummary {
    /// Breakdown entries ordered by cost, highest first
    pub fn top_services(&self) -> Vec<&ServiceCost> {
        let mut services: Vec<&ServiceCost> = self.breakdown.iter().collect();
        services.sort_by(|a, b| b.cost.cmp(&a.cost));
        services
    }
}

// Request payloads

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateWorkspace {
    pub workspace_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateWorkspace {
    pub fn validate(&self) -> ClientResult<()> {
        require_non_empty("workspace name", &self.workspace_name)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateWorkspace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateWorkspace {
    pub fn validate(&self) -> ClientResult<()> {
        match &self.workspace_name {
            Some(name) => require_non_empty("workspace name", name),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GrantAccess {
    pub user_id: String,
    pub access: String,
}

impl GrantAccess {
    pub fn validate(&self) -> ClientResult<()> {
        require_non_empty("user id", &self.user_id)?;
        require_non_empty("access", &self.access)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSolution {
    pub solution_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateSolution {
    pub fn validate(&self) -> ClientResult<()> {
        require_non_empty("solution name", &self.solution_name)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateSolution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateSolution {
    pub fn validate(&self) -> ClientResult<()> {
        match &self.solution_name {
            Some(name) => require_non_empty("solution name", name),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateDatasource {
    pub datasource_name: String,
    pub datasource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateDatasource {
    pub fn validate(&self) -> ClientResult<()> {
        require_non_empty("datasource name", &self.datasource_name)?;
        require_non_empty("datasource type", &self.datasource_type)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateDatasource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasource_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateDatasource {
    pub fn validate(&self) -> ClientResult<()> {
        match &self.datasource_name {
            Some(name) => require_non_empty("datasource name", name),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttachDatasource {
    pub datasource_id: String,
}

/// Role definition as written in a YAML or JSON file and sent to the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleDefinition {
    #[serde(alias = "name")]
    pub name: String,
    #[serde(default, alias = "description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "permissions")]
    pub permissions: Vec<String>,
}

impl RoleDefinition {
    /// Name is required and every permission must be a known
    /// `resource.level` pair.
    pub fn validate(&self) -> ClientResult<()> {
        require_non_empty("role name", &self.name)?;
        for permission in &self.permissions {
            permission
                .parse::<crate::rbac::PermissionEntry>()
                .map_err(|e| crate::error::ClientError::validation("permissions", e.to_string()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssignRole {
    pub role: String,
}

impl AssignRole {
    pub fn validate(&self) -> ClientResult<()> {
        require_non_empty("role", &self.role)
    }
}
