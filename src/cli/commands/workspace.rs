use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::api::encode_segment;
use crate::api::format::relative_time_opt;
use crate::api::models::{CreateWorkspace, GrantAccess, UpdateWorkspace};
use crate::api::workspaces::workspace_path;
use crate::cli::utils::*;
use crate::cli::{Context, OutputFormat};
use crate::rbac::Requirement;

#[derive(Subcommand)]
pub enum WorkspaceCommands {
    #[command(about = "List workspaces")]
    List {
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: u32,
        #[arg(long, help = "Rows per page")]
        limit: Option<u32>,
    },

    #[command(about = "Show a workspace with its solutions")]
    Show {
        #[arg(help = "Workspace ID")]
        id: String,
    },

    #[command(about = "Create a workspace")]
    Create {
        #[arg(help = "Workspace name")]
        name: String,
        #[arg(long, help = "Description")]
        description: Option<String>,
    },

    #[command(about = "Rename or describe a workspace")]
    Update {
        #[arg(help = "Workspace ID")]
        id: String,
        #[arg(long, help = "New name")]
        name: Option<String>,
        #[arg(long, help = "New description")]
        description: Option<String>,
    },

    #[command(about = "Delete a workspace")]
    Delete {
        #[arg(help = "Workspace ID")]
        id: String,
    },

    #[command(about = "List users with access to a workspace")]
    Users {
        #[arg(help = "Workspace ID")]
        id: String,
    },

    #[command(about = "Grant a user access to a workspace")]
    Grant {
        #[arg(help = "Workspace ID")]
        id: String,
        #[arg(help = "User ID")]
        user_id: String,
        #[arg(long, default_value = "view", help = "Access level")]
        access: String,
    },

    #[command(about = "Revoke a user's access to a workspace")]
    Revoke {
        #[arg(help = "Workspace ID")]
        id: String,
        #[arg(help = "User ID")]
        user_id: String,
    },
}

pub async fn handle(cmd: WorkspaceCommands, ctx: &Context, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let api = &ctx.api;

    match cmd {
        WorkspaceCommands::List { page, limit } => {
            ensure_visible(session, Requirement::endpoint("/workspaces", "GET"))?;
            let request = ctx.page(page, limit);
            let result = api.list_workspaces(request, &ctx.cancel).await?;
            let window = result.window(request);

            if result.items.is_empty() {
                return output_empty_collection(&output_format, "workspaces", "No workspaces found");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "workspaces": result.items, "page": window })),
                OutputFormat::Text => {
                    let now = Utc::now();
                    let rows: Vec<Vec<String>> = result
                        .items
                        .iter()
                        .map(|w| {
                            vec![
                                w.workspace_id.clone(),
                                w.workspace_name.clone(),
                                badge(w.workspace_status.as_deref().unwrap_or("Unknown")),
                                relative_time_opt(w.last_modified_at.or(w.created_at), now),
                            ]
                        })
                        .collect();
                    print_table(&["ID", "NAME", "STATUS", "UPDATED"], &rows);
                    print_page_footer(&window);
                    Ok(())
                }
            }
        }
        WorkspaceCommands::Show { id } => {
            ensure_visible(session, Requirement::endpoint(workspace_path(&id), "GET"))?;
            let can_see_solutions = session
                .resolver()
                .can_perform_api_operation(&format!("{}/solutions", workspace_path(&id)), "GET");

            let (workspace, solutions) = if can_see_solutions {
                let (workspace, solutions) = futures::future::try_join(
                    api.get_workspace(&id, &ctx.cancel),
                    api.list_solutions(&id, ctx.page(1, None), &ctx.cancel),
                )
                .await?;
                (workspace, Some(solutions.items))
            } else {
                (api.get_workspace(&id, &ctx.cancel).await?, None)
            };

            match output_format {
                OutputFormat::Json => output_json(&json!({ "workspace": workspace, "solutions": solutions })),
                OutputFormat::Text => {
                    let now = Utc::now();
                    println!("{} ({})", workspace.workspace_name, workspace.workspace_id);
                    println!("Status:      {}", badge(workspace.workspace_status.as_deref().unwrap_or("Unknown")));
                    if let Some(description) = &workspace.description {
                        println!("Description: {}", description);
                    }
                    if let Some(owner) = &workspace.created_by {
                        println!("Created by:  {}", owner);
                    }
                    println!("Created:     {}", relative_time_opt(workspace.created_at, now));
                    println!("Updated:     {}", relative_time_opt(workspace.last_modified_at, now));

                    if let Some(solutions) = solutions {
                        println!("\nSolutions ({}):", solutions.len());
                        for s in &solutions {
                            println!(
                                "  {}  {}  {}",
                                s.solution_id,
                                s.solution_name,
                                badge(s.solution_status.as_deref().unwrap_or("Unknown"))
                            );
                        }
                    }
                    Ok(())
                }
            }
        }
        WorkspaceCommands::Create { name, description } => {
            ensure_allowed(session, Requirement::endpoint("/workspaces", "POST"))?;
            let input = CreateWorkspace {
                workspace_name: name,
                description,
            };
            let workspace = api.create_workspace(&input, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Workspace '{}' created ({})", workspace.workspace_name, workspace.workspace_id),
                Some(json!({ "workspace": workspace })),
            )
        }
        WorkspaceCommands::Update { id, name, description } => {
            ensure_allowed(session, Requirement::endpoint(workspace_path(&id), "PUT"))?;
            if name.is_none() && description.is_none() {
                anyhow::bail!("nothing to update: pass --name and/or --description");
            }
            let input = UpdateWorkspace {
                workspace_name: name,
                description,
            };
            let workspace = api.update_workspace(&id, &input, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Workspace '{}' updated", workspace.workspace_name),
                Some(json!({ "workspace": workspace })),
            )
        }
        WorkspaceCommands::Delete { id } => {
            ensure_allowed(session, Requirement::endpoint(workspace_path(&id), "DELETE"))?;
            api.delete_workspace(&id, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Workspace '{}' deleted", id),
                Some(json!({ "id": id })),
            )
        }
        WorkspaceCommands::Users { id } => {
            ensure_visible(session, Requirement::endpoint(format!("{}/users", workspace_path(&id)), "GET"))?;
            let users = api.list_workspace_users(&id, &ctx.cancel).await?;

            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users have access to this workspace");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "users": users })),
                OutputFormat::Text => {
                    let now = Utc::now();
                    let rows: Vec<Vec<String>> = users
                        .iter()
                        .map(|u| {
                            vec![
                                u.user_id.clone(),
                                u.username.clone().unwrap_or_default(),
                                u.access.clone(),
                                relative_time_opt(u.granted_at, now),
                            ]
                        })
                        .collect();
                    print_table(&["USER ID", "USERNAME", "ACCESS", "GRANTED"], &rows);
                    Ok(())
                }
            }
        }
        WorkspaceCommands::Grant { id, user_id, access } => {
            ensure_allowed(session, Requirement::endpoint(format!("{}/users", workspace_path(&id)), "POST"))?;
            let grant = GrantAccess { user_id, access };
            let granted = api.grant_workspace_access(&id, &grant, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Granted {} access on '{}' to {}", granted.access, id, granted.user_id),
                Some(json!({ "user": granted })),
            )
        }
        WorkspaceCommands::Revoke { id, user_id } => {
            ensure_allowed(
                session,
                Requirement::endpoint(format!("{}/users/{}", workspace_path(&id), encode_segment(&user_id)), "DELETE"),
            )?;
            api.revoke_workspace_access(&id, &user_id, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Revoked access on '{}' for {}", id, user_id),
                None,
            )
        }
    }
}
