use serde::Serialize;
use serde_json::{json, Value};

use crate::api::format::status_badge;
use crate::api::PageWindow;
use crate::auth::Session;
use crate::cli::OutputFormat;
use crate::rbac::{gate::DEFAULT_DENIED_TOOLTIP, PermissionGate, Rendered, Requirement};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Pretty-print any serializable value as JSON
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: []
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print rows as left-aligned columns under a header line
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(visible_width(cell));
            }
        }
    }

    let header = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h, w = *w))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header.trim_end());
    println!("{}", "-".repeat(header.trim_end().chars().count()));

    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| {
                let pad = w.saturating_sub(visible_width(cell));
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    }
}

// ANSI escapes take no columns
fn visible_width(cell: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in cell.chars() {
        match (in_escape, c) {
            (false, '\x1b') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => width += 1,
        }
    }
    width
}

/// Status text coloured by its badge
pub fn badge(status: &str) -> String {
    format!("\x1b[{}m{}\x1b[0m", status_badge(status).ansi_code(), status)
}

pub fn print_page_footer(window: &PageWindow) {
    if window.total_pages <= 1 {
        return;
    }
    let links = window
        .pages
        .iter()
        .map(|p| if *p == window.page { format!("[{}]", p) } else { p.to_string() })
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "\nPage {} of {} ({} total)  {}{}{}",
        window.page,
        window.total_pages,
        window.total_count,
        if window.has_previous { "< " } else { "" },
        links,
        if window.has_next { " >" } else { "" }
    );
}

/// Gate a mutating command the way a protected button would: denied
/// commands fail with the tooltip before any request is made.
pub fn ensure_allowed(session: &Session, requirement: Requirement) -> anyhow::Result<()> {
    match PermissionGate::button(requirement).render(&session.resolver(), ()) {
        Rendered::Children(()) => Ok(()),
        Rendered::Disabled { tooltip, .. } => Err(anyhow::anyhow!(tooltip)),
        Rendered::Fallback(()) | Rendered::Nothing => Err(anyhow::anyhow!(DEFAULT_DENIED_TOOLTIP)),
    }
}

/// Gate a read command like a route guard
pub fn ensure_visible(session: &Session, requirement: Requirement) -> anyhow::Result<()> {
    let denied = format!("Access denied: {}", describe(&requirement));
    match PermissionGate::guard(requirement).fallback(denied).render(&session.resolver(), String::new()) {
        Rendered::Children(_) => Ok(()),
        Rendered::Fallback(message) => Err(anyhow::anyhow!(message)),
        Rendered::Disabled { tooltip, .. } => Err(anyhow::anyhow!(tooltip)),
        Rendered::Nothing => Err(anyhow::anyhow!(DEFAULT_DENIED_TOOLTIP)),
    }
}

fn describe(requirement: &Requirement) -> String {
    match requirement {
        Requirement::Permission(value) => format!("requires '{}'", value),
        Requirement::Action { resource, action } => format!("requires '{}.{}'", resource, action),
        Requirement::Endpoint { path, method } => format!("{} {} is not permitted for your role", method, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::test_tokens;
    use crate::auth::Tokens;

    fn session(permissions: &[&str]) -> Session {
        let id_token = test_tokens::sign(&json!({ "cognito:username": "ada", "sub": "u-1" }));
        Session::new(
            Tokens {
                access_token: "access".to_string(),
                id_token,
            },
            permissions.iter().copied(),
        )
        .unwrap()
    }

    #[test]
    fn test_denied_mutation_reports_tooltip() {
        let viewer = session(&["workspaces.view"]);
        let err = ensure_allowed(&viewer, Requirement::endpoint("/workspaces", "POST")).unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_DENIED_TOOLTIP);
        assert!(ensure_visible(&viewer, Requirement::endpoint("/workspaces/w1", "GET")).is_ok());

        let manager = session(&["workspaces.manage"]);
        assert!(ensure_allowed(&manager, Requirement::endpoint("/workspaces", "POST")).is_ok());
        assert!(ensure_allowed(&manager, Requirement::endpoint("/workspaces/w1", "DELETE")).is_err());
    }

    #[test]
    fn test_guard_denial_names_the_operation() {
        let nobody = session(&[]);
        let err = ensure_visible(&nobody, Requirement::endpoint("/roles", "GET")).unwrap_err();
        assert_eq!(err.to_string(), "Access denied: GET /roles is not permitted for your role");
        // Unknown endpoints are denied outright
        assert!(ensure_visible(&session(&["roles.fullaccess"]), Requirement::endpoint("/admin", "GET")).is_err());
    }

    #[test]
    fn test_visible_width_ignores_colour() {
        assert_eq!(visible_width(&badge("Active")), "Active".len());
        assert_eq!(visible_width("plain"), 5);
    }

    #[test]
    fn test_describe_requirement() {
        let text = describe(&Requirement::endpoint("/roles", "POST"));
        assert_eq!(text, "POST /roles is not permitted for your role");
    }
}
