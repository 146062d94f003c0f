use super::permission::{PermissionLevel, Resource};
use super::resolver::PermissionResolver;

pub const DEFAULT_DENIED_TOOLTIP: &str = "You don't have permission to perform this action";

/// What a gate checks before showing its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Raw `resource.level` string
    Permission(String),
    Action {
        resource: Resource,
        action: PermissionLevel,
    },
    Endpoint {
        path: String,
        method: String,
    },
}

impl Requirement {
    pub fn permission(value: impl Into<String>) -> Self {
        Requirement::Permission(value.into())
    }

    pub fn action(resource: Resource, action: PermissionLevel) -> Self {
        Requirement::Action { resource, action }
    }

    pub fn endpoint(path: impl Into<String>, method: impl Into<String>) -> Self {
        Requirement::Endpoint {
            path: path.into(),
            method: method.into(),
        }
    }

    pub fn is_met(&self, resolver: &PermissionResolver<'_>) -> bool {
        match self {
            Requirement::Permission(value) => resolver.has_permission(value),
            Requirement::Action { resource, action } => resolver.can(*resource, *action),
            Requirement::Endpoint { path, method } => resolver.can_perform_api_operation(path, method),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    Guard,
    Button,
    Content,
}

/// Result of passing children through a gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<T> {
    Children(T),
    Fallback(T),
    Disabled { children: T, tooltip: String },
    Nothing,
}

impl<T> Rendered<T> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Rendered::Children(_))
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, Rendered::Nothing)
    }
}

/// Declarative permission gate. Holds no state beyond its configuration;
/// the decision comes entirely from the resolver passed to `render`.
#[derive(Debug, Clone)]
pub struct PermissionGate<T> {
    kind: GateKind,
    requirement: Requirement,
    fallback: Option<T>,
    hide_if_no_access: bool,
    tooltip: Option<String>,
}

impl<T> PermissionGate<T> {
    fn new(kind: GateKind, requirement: Requirement) -> Self {
        Self {
            kind,
            requirement,
            fallback: None,
            hide_if_no_access: false,
            tooltip: None,
        }
    }

    pub fn guard(requirement: Requirement) -> Self {
        Self::new(GateKind::Guard, requirement)
    }

    pub fn button(requirement: Requirement) -> Self {
        Self::new(GateKind::Button, requirement)
    }

    pub fn content(requirement: Requirement) -> Self {
        Self::new(GateKind::Content, requirement)
    }

    pub fn fallback(mut self, fallback: T) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn hide_if_no_access(mut self, hide: bool) -> Self {
        self.hide_if_no_access = hide;
        self
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    pub fn render(self, resolver: &PermissionResolver<'_>, children: T) -> Rendered<T> {
        if self.requirement.is_met(resolver) {
            return Rendered::Children(children);
        }
        if self.hide_if_no_access {
            return Rendered::Nothing;
        }

        match self.kind {
            GateKind::Button => Rendered::Disabled {
                children,
                tooltip: self
                    .tooltip
                    .unwrap_or_else(|| DEFAULT_DENIED_TOOLTIP.to_string()),
            },
            GateKind::Guard | GateKind::Content => {
                self.fallback.map(Rendered::Fallback).unwrap_or(Rendered::Nothing)
            }
        }
    }
}
