use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resources a role can hold permissions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Workspaces,
    Solutions,
    Datasources,
    Roles,
    Users,
    Executions,
    ActivityLogs,
    Costs,
}

impl Resource {
    /// Returns the wire name used in `resource.level` strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workspaces => "workspaces",
            Self::Solutions => "solutions",
            Self::Datasources => "datasources",
            Self::Roles => "roles",
            Self::Users => "users",
            Self::Executions => "executions",
            Self::ActivityLogs => "activity_logs",
            Self::Costs => "costs",
        }
    }

    pub fn all() -> &'static [Self] {
        const ALL: &[Resource] = &[
            Resource::Workspaces,
            Resource::Solutions,
            Resource::Datasources,
            Resource::Roles,
            Resource::Users,
            Resource::Executions,
            Resource::ActivityLogs,
            Resource::Costs,
        ];

        ALL
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = PermissionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "workspaces" => Ok(Self::Workspaces),
            "solutions" => Ok(Self::Solutions),
            "datasources" => Ok(Self::Datasources),
            "roles" => Ok(Self::Roles),
            "users" => Ok(Self::Users),
            "executions" => Ok(Self::Executions),
            "activity_logs" | "activity-logs" => Ok(Self::ActivityLogs),
            "costs" => Ok(Self::Costs),
            _ => Err(PermissionParseError::UnknownResource(value.to_string())),
        }
    }
}

/// Permission levels. `View < Manage < FullAccess`; `Delete` sits beside
/// the chain and is implied only by `FullAccess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    View,
    Manage,
    Delete,
    FullAccess,
}

impl PermissionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Manage => "manage",
            Self::Delete => "delete",
            Self::FullAccess => "fullaccess",
        }
    }

    /// Whether holding `self` is enough for an operation requiring `required`.
    pub fn satisfies(self, required: PermissionLevel) -> bool {
        use PermissionLevel::*;
        match (self, required) {
            (FullAccess, _) => true,
            (Delete, Delete) => true,
            (Manage, View | Manage) => true,
            (View, View) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = PermissionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Self::View),
            "manage" => Ok(Self::Manage),
            "delete" => Ok(Self::Delete),
            "fullaccess" | "full_access" => Ok(Self::FullAccess),
            _ => Err(PermissionParseError::UnknownLevel(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionParseError {
    #[error("malformed permission '{0}', expected 'resource.level'")]
    Malformed(String),
    #[error("unknown resource '{0}'")]
    UnknownResource(String),
    #[error("unknown permission level '{0}'")]
    UnknownLevel(String),
}

/// A validated `resource.level` grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionEntry {
    pub resource: Resource,
    pub level: PermissionLevel,
}

impl PermissionEntry {
    pub fn new(resource: Resource, level: PermissionLevel) -> Self {
        Self { resource, level }
    }
}

impl fmt::Display for PermissionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.level)
    }
}

impl FromStr for PermissionEntry {
    type Err = PermissionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (resource, level) = value
            .trim()
            .rsplit_once('.')
            .ok_or_else(|| PermissionParseError::Malformed(value.to_string()))?;
        if resource.is_empty() || level.is_empty() {
            return Err(PermissionParseError::Malformed(value.to_string()));
        }

        Ok(Self {
            resource: resource.parse()?,
            level: level.parse()?,
        })
    }
}

impl TryFrom<String> for PermissionEntry {
    type Error = PermissionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PermissionEntry> for String {
    fn from(entry: PermissionEntry) -> Self {
        entry.to_string()
    }
}

/// The validated permission list of a role, held in memory for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    entries: BTreeSet<PermissionEntry>,
    rejected: Vec<String>,
}

impl PermissionSet {
    /// Parse raw permission strings from the server. Anything that does not
    /// parse is kept aside in `rejected` and grants nothing.
    pub fn from_strings<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for value in raw {
            let value = value.as_ref();
            match value.parse::<PermissionEntry>() {
                Ok(entry) => {
                    set.entries.insert(entry);
                }
                Err(e) => {
                    tracing::warn!("ignoring permission '{}': {}", value, e);
                    set.rejected.push(value.to_string());
                }
            }
        }
        set
    }

    pub fn from_entries(entries: impl IntoIterator<Item = PermissionEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            rejected: Vec::new(),
        }
    }

    /// True if any entry for `resource` satisfies `required`.
    pub fn grants(&self, resource: Resource, required: PermissionLevel) -> bool {
        self.entries
            .iter()
            .filter(|entry| entry.resource == resource)
            .any(|entry| entry.level.satisfies(required))
    }

    pub fn entries(&self) -> impl Iterator<Item = &PermissionEntry> {
        self.entries.iter()
    }

    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical string form, used when persisting a session
    pub fn to_strings(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}
