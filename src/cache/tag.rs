use std::fmt;

use serde::Serialize;

/// Resource type a cached response belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TagKind {
    Workspace,
    WorkspaceUser,
    Solution,
    Datasource,
    Role,
    User,
    Execution,
    ActivityLog,
    Cost,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagId {
    List,
    Id(String),
}

/// Cache tag. `id: None` addresses every entry of the kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub kind: TagKind,
    pub id: Option<TagId>,
}

impl Tag {
    pub fn kind(kind: TagKind) -> Self {
        Self { kind, id: None }
    }

    pub fn list(kind: TagKind) -> Self {
        Self {
            kind,
            id: Some(TagId::List),
        }
    }

    pub fn id(kind: TagKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: Some(TagId::Id(id.into())),
        }
    }

    /// Tags a list response provides: the list tag plus one per item
    pub fn list_with_ids<'a>(kind: TagKind, ids: impl IntoIterator<Item = &'a str>) -> Vec<Tag> {
        let mut tags = vec![Tag::list(kind)];
        tags.extend(ids.into_iter().map(|id| Tag::id(kind, id)));
        tags
    }

    /// Whether invalidating `self` should drop an entry that provides `provided`
    pub fn matches(&self, provided: &Tag) -> bool {
        self.kind == provided.kind && (self.id.is_none() || self.id == provided.id)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            None => write!(f, "{:?}", self.kind),
            Some(TagId::List) => write!(f, "{:?}:LIST", self.kind),
            Some(TagId::Id(id)) => write!(f, "{:?}:{}", self.kind, id),
        }
    }
}
