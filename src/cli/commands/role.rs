use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use crate::api::models::RoleDefinition;
use crate::api::roles::role_path;
use crate::cli::utils::*;
use crate::cli::{Context, OutputFormat};
use crate::error::ClientError;
use crate::rbac::{PermissionResolver, PermissionSet, Requirement, Resource};

#[derive(Subcommand)]
pub enum RoleCommands {
    #[command(about = "List roles")]
    List,

    #[command(about = "Show a role and what it grants")]
    Show {
        #[arg(help = "Role name")]
        name: String,
    },

    #[command(about = "Create or update a role from a YAML or JSON file")]
    Apply {
        #[arg(help = "Role definition file")]
        file: PathBuf,
    },

    #[command(about = "Delete a role")]
    Delete {
        #[arg(help = "Role name")]
        name: String,
    },
}

pub async fn handle(cmd: RoleCommands, ctx: &Context, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let api = &ctx.api;

    match cmd {
        RoleCommands::List => {
            ensure_visible(session, Requirement::endpoint("/roles", "GET"))?;
            let roles = api.list_roles(&ctx.cancel).await?;

            if roles.is_empty() {
                return output_empty_collection(&output_format, "roles", "No roles defined");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "roles": roles })),
                OutputFormat::Text => {
                    let rows: Vec<Vec<String>> = roles
                        .iter()
                        .map(|r| {
                            vec![
                                r.name.clone(),
                                r.permissions.len().to_string(),
                                r.description.clone().unwrap_or_default(),
                            ]
                        })
                        .collect();
                    print_table(&["ROLE", "PERMISSIONS", "DESCRIPTION"], &rows);
                    Ok(())
                }
            }
        }
        RoleCommands::Show { name } => {
            ensure_visible(session, Requirement::endpoint(role_path(&name), "GET"))?;
            let role = api.get_role(&name, &ctx.cancel).await?;
            let granted = PermissionSet::from_strings(&role.permissions);
            let resolver = PermissionResolver::new(&granted);
            let matrix: Vec<_> = Resource::all()
                .iter()
                .map(|r| resolver.capabilities(*r))
                .filter(|c| c.view || c.delete)
                .collect();

            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "role": role,
                    "capabilities": matrix,
                    "rejected": granted.rejected(),
                })),
                OutputFormat::Text => {
                    println!("Role: {}", role.name);
                    if let Some(description) = &role.description {
                        println!("{}", description);
                    }
                    println!();
                    if matrix.is_empty() {
                        println!("Grants nothing");
                    }
                    for c in &matrix {
                        let mut levels = Vec::new();
                        if c.full_access {
                            levels.push("fullaccess");
                        } else {
                            if c.manage {
                                levels.push("manage");
                            } else if c.view {
                                levels.push("view");
                            }
                            if c.delete {
                                levels.push("delete");
                            }
                        }
                        println!("  {:<14} {}", c.resource.as_str(), levels.join(", "));
                    }
                    if !granted.rejected().is_empty() {
                        println!("\nUnrecognised: {}", granted.rejected().join(", "));
                    }
                    Ok(())
                }
            }
        }
        RoleCommands::Apply { file } => {
            let content = std::fs::read_to_string(&file)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {}", file.display(), e))?;
            // YAML is a superset of JSON, so one parser covers both
            let definition: RoleDefinition = serde_yaml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("invalid role definition in {}: {}", file.display(), e))?;
            definition.validate()?;
            ensure_allowed(session, Requirement::endpoint(role_path(&definition.name), "PUT"))?;

            let exists = match api.get_role(&definition.name, &ctx.cancel).await {
                Ok(_) => true,
                Err(ClientError::NotFound(_)) => false,
                Err(e) => return Err(e.into()),
            };

            let (role, verb) = if exists {
                (api.update_role(&definition, &ctx.cancel).await?, "updated")
            } else {
                (api.create_role(&definition, &ctx.cancel).await?, "created")
            };

            output_success(
                &output_format,
                &format!("Role '{}' {} with {} permission(s)", role.name, verb, role.permissions.len()),
                Some(json!({ "role": role, "action": verb })),
            )
        }
        RoleCommands::Delete { name } => {
            ensure_allowed(session, Requirement::endpoint(role_path(&name), "DELETE"))?;
            if name == session.role() {
                tracing::warn!("deleting the role of the current session ('{}')", name);
            }
            api.delete_role(&name, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Role '{}' deleted", name),
                Some(json!({ "name": name })),
            )
        }
    }
}
