use serde::Serialize;

use super::endpoints::find_rule;
use super::permission::{PermissionEntry, PermissionLevel, PermissionSet, Resource};

/// Capability checks over a role's permission set. Pure and infallible:
/// anything unknown resolves to "no access".
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'a> {
    permissions: &'a PermissionSet,
}

/// The four capability flags for one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub resource: Resource,
    pub view: bool,
    pub manage: bool,
    pub delete: bool,
    pub full_access: bool,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(permissions: &'a PermissionSet) -> Self {
        Self { permissions }
    }

    pub fn can(&self, resource: Resource, level: PermissionLevel) -> bool {
        self.permissions.grants(resource, level)
    }

    pub fn can_view(&self, resource: Resource) -> bool {
        self.can(resource, PermissionLevel::View)
    }

    pub fn can_manage(&self, resource: Resource) -> bool {
        self.can(resource, PermissionLevel::Manage)
    }

    pub fn can_delete(&self, resource: Resource) -> bool {
        self.can(resource, PermissionLevel::Delete)
    }

    pub fn can_full_access(&self, resource: Resource) -> bool {
        self.can(resource, PermissionLevel::FullAccess)
    }

    /// Check a raw `resource.level` string. Malformed strings deny.
    pub fn has_permission(&self, permission: &str) -> bool {
        match permission.parse::<PermissionEntry>() {
            Ok(entry) => self.can(entry.resource, entry.level),
            Err(e) => {
                tracing::debug!("denying malformed permission check '{}': {}", permission, e);
                false
            }
        }
    }

    /// Check an endpoint + HTTP method against the endpoint table.
    pub fn can_perform_api_operation(&self, endpoint: &str, method: &str) -> bool {
        match find_rule(endpoint, method) {
            Some(rule) => self.can(rule.resource, rule.level),
            None => {
                tracing::debug!("no permission rule for {} {}, denying", method, endpoint);
                false
            }
        }
    }

    pub fn capabilities(&self, resource: Resource) -> Capabilities {
        Capabilities {
            resource,
            view: self.can_view(resource),
            manage: self.can_manage(resource),
            delete: self.can_delete(resource),
            full_access: self.can_full_access(resource),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(raw: &[&str]) -> PermissionSet {
        PermissionSet::from_strings(raw.iter().copied())
    }

    #[test]
    fn test_full_access_implies_everything() {
        for resource in Resource::all() {
            let perms = set(&[format!("{}.fullaccess", resource).as_str()]);
            let resolver = PermissionResolver::new(&perms);
            assert!(resolver.can_view(*resource), "{resource}");
            assert!(resolver.can_manage(*resource), "{resource}");
            assert!(resolver.can_delete(*resource), "{resource}");
            assert!(resolver.can_full_access(*resource), "{resource}");
        }
    }

    #[test]
    fn test_view_only_cannot_manage() {
        for resource in Resource::all() {
            let perms = set(&[format!("{}.view", resource).as_str()]);
            let resolver = PermissionResolver::new(&perms);
            assert!(resolver.can_view(*resource));
            assert!(!resolver.can_manage(*resource));
            assert!(!resolver.can_full_access(*resource));
            assert!(!resolver.can_delete(*resource));
        }
    }

    #[test]
    fn test_default_role_example() {
        let perms = set(&["workspaces.view"]);
        let resolver = PermissionResolver::new(&perms);
        assert!(resolver.can_view(Resource::Workspaces));
        assert!(!resolver.can_manage(Resource::Workspaces));
        assert!(!resolver.can_view(Resource::Solutions));
    }

    #[test]
    fn test_manage_does_not_grant_delete() {
        let perms = set(&["datasources.manage"]);
        let resolver = PermissionResolver::new(&perms);
        assert!(resolver.can_view(Resource::Datasources));
        assert!(!resolver.can_delete(Resource::Datasources));
        assert!(!resolver.can_perform_api_operation("/datasources/ds-1", "DELETE"));
        assert!(resolver.can_perform_api_operation("/datasources/ds-1", "PUT"));
    }

    #[test]
    fn test_explicit_delete_grants_only_delete() {
        let perms = set(&["solutions.delete"]);
        let resolver = PermissionResolver::new(&perms);
        assert!(resolver.can_delete(Resource::Solutions));
        assert!(!resolver.can_view(Resource::Solutions));
    }

    #[test]
    fn test_has_permission_strings() {
        let perms = set(&["roles.manage"]);
        let resolver = PermissionResolver::new(&perms);
        assert!(resolver.has_permission("roles.view"));
        assert!(!resolver.has_permission("roles.fullaccess"));
        assert!(!resolver.has_permission("roles"));
        assert!(!resolver.has_permission("rolez.view"));
    }

    #[test]
    fn test_api_operations() {
        let perms = set(&["workspaces.manage", "costs.view"]);
        let resolver = PermissionResolver::new(&perms);
        assert!(resolver.can_perform_api_operation("/workspaces", "POST"));
        assert!(resolver.can_perform_api_operation("/workspaces/w1/costs", "get"));
        assert!(!resolver.can_perform_api_operation("/workspaces/w1", "DELETE"));
        assert!(!resolver.can_perform_api_operation("/workspaces/w1/users", "POST"));
        assert!(!resolver.can_perform_api_operation("/unknown", "GET"));
    }

    #[test]
    fn test_empty_set_denies() {
        let perms = PermissionSet::default();
        let caps = PermissionResolver::new(&perms).capabilities(Resource::Users);
        assert!(!caps.view && !caps.manage && !caps.delete && !caps.full_access);
    }
}
