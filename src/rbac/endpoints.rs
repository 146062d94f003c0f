use super::permission::{PermissionLevel, Resource};

/// Permission required to call one endpoint pattern with one HTTP method.
#[derive(Debug, Clone, Copy)]
pub struct EndpointRule {
    pub pattern: &'static str,
    pub method: &'static str,
    pub resource: Resource,
    pub level: PermissionLevel,
}

const fn rule(
    pattern: &'static str,
    method: &'static str,
    resource: Resource,
    level: PermissionLevel,
) -> EndpointRule {
    EndpointRule {
        pattern,
        method,
        resource,
        level,
    }
}

use PermissionLevel::{Delete, FullAccess, Manage, View};
use Resource::*;

/// Every endpoint the client calls. Anything not listed is denied.
pub static ENDPOINT_RULES: &[EndpointRule] = &[
    rule("/workspaces", "GET", Workspaces, View),
    rule("/workspaces", "POST", Workspaces, Manage),
    rule("/workspaces/{id}", "GET", Workspaces, View),
    rule("/workspaces/{id}", "PUT", Workspaces, Manage),
    rule("/workspaces/{id}", "DELETE", Workspaces, Delete),
    rule("/workspaces/{id}/users", "GET", Workspaces, View),
    rule("/workspaces/{id}/users", "POST", Workspaces, FullAccess),
    rule("/workspaces/{id}/users/{userId}", "DELETE", Workspaces, FullAccess),
    rule("/workspaces/{id}/costs", "GET", Costs, View),
    rule("/workspaces/{id}/solutions", "GET", Solutions, View),
    rule("/workspaces/{id}/solutions", "POST", Solutions, Manage),
    rule("/workspaces/{id}/solutions/{solutionId}", "GET", Solutions, View),
    rule("/workspaces/{id}/solutions/{solutionId}", "PUT", Solutions, Manage),
    rule("/workspaces/{id}/solutions/{solutionId}", "DELETE", Solutions, Delete),
    rule("/workspaces/{id}/solutions/{solutionId}/datasources", "POST", Datasources, Manage),
    rule("/workspaces/{id}/solutions/{solutionId}/datasources/{datasourceId}", "DELETE", Datasources, Manage),
    rule("/workspaces/{id}/solutions/{solutionId}/executions", "GET", Executions, View),
    rule("/workspaces/{id}/solutions/{solutionId}/executions/{executionId}", "GET", Executions, View),
    rule("/datasources", "GET", Datasources, View),
    rule("/datasources", "POST", Datasources, Manage),
    rule("/datasources/{id}", "GET", Datasources, View),
    rule("/datasources/{id}", "PUT", Datasources, Manage),
    rule("/datasources/{id}", "DELETE", Datasources, Delete),
    rule("/roles", "GET", Roles, View),
    rule("/roles", "POST", Roles, Manage),
    rule("/roles/{name}", "GET", Roles, View),
    rule("/roles/{name}", "PUT", Roles, Manage),
    rule("/roles/{name}", "DELETE", Roles, Delete),
    rule("/users", "GET", Users, View),
    rule("/users/{id}", "GET", Users, View),
    rule("/users/{id}/role", "PUT", Users, FullAccess),
    rule("/activity-logs/{type}/{id}", "GET", ActivityLogs, View),
];

/// Find the rule for `endpoint` + `method`. Query strings, trailing slashes
/// and method case are ignored.
pub fn find_rule(endpoint: &str, method: &str) -> Option<&'static EndpointRule> {
    let path = endpoint.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return None;
    }

    ENDPOINT_RULES.iter().find(|rule| {
        rule.method.eq_ignore_ascii_case(method.trim()) && pattern_matches(rule.pattern, &segments)
    })
}

fn pattern_matches(pattern: &str, segments: &[&str]) -> bool {
    let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    parts.len() == segments.len()
        && parts.iter().zip(segments).all(|(part, segment)| {
            (part.starts_with('{') && part.ends_with('}')) || part == segment
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_and_parameter_segments() {
        let rule = find_rule("/workspaces/ws-1/solutions/sol-9", "PUT").unwrap();
        assert_eq!(rule.resource, Resource::Solutions);
        assert_eq!(rule.level, PermissionLevel::Manage);

        let rule = find_rule("/workspaces/ws-1", "delete").unwrap();
        assert_eq!(rule.level, PermissionLevel::Delete);
    }

    #[test]
    fn test_query_and_trailing_slash_ignored() {
        let rule = find_rule("/workspaces/?limit=10&offset=2", "GET").unwrap();
        assert_eq!(rule.pattern, "/workspaces");
        assert!(find_rule("workspaces", "GET").is_some());
    }

    #[test]
    fn test_unknown_endpoint_or_method() {
        assert!(find_rule("/billing", "GET").is_none());
        assert!(find_rule("/workspaces", "PATCH").is_none());
        assert!(find_rule("/workspaces/a/b/c/d/e/f/g", "GET").is_none());
        assert!(find_rule("", "GET").is_none());
        assert!(find_rule("/", "GET").is_none());
    }
}
