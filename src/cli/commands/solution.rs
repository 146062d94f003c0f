use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::api::format::relative_time_opt;
use crate::api::models::{CreateSolution, UpdateSolution};
use crate::api::solutions::solution_path;
use crate::api::workspaces::workspace_path;
use crate::cli::utils::*;
use crate::cli::{Context, OutputFormat};
use crate::rbac::Requirement;

#[derive(Subcommand)]
pub enum SolutionCommands {
    #[command(about = "List solutions in a workspace")]
    List {
        #[arg(help = "Workspace ID")]
        workspace: String,
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: u32,
        #[arg(long, help = "Rows per page")]
        limit: Option<u32>,
    },

    #[command(about = "Show a solution")]
    Show {
        #[arg(help = "Workspace ID")]
        workspace: String,
        #[arg(help = "Solution ID")]
        id: String,
    },

    #[command(about = "Create a solution")]
    Create {
        #[arg(help = "Workspace ID")]
        workspace: String,
        #[arg(help = "Solution name")]
        name: String,
        #[arg(long, help = "Description")]
        description: Option<String>,
    },

    #[command(about = "Rename or describe a solution")]
    Update {
        #[arg(help = "Workspace ID")]
        workspace: String,
        #[arg(help = "Solution ID")]
        id: String,
        #[arg(long, help = "New name")]
        name: Option<String>,
        #[arg(long, help = "New description")]
        description: Option<String>,
    },

    #[command(about = "Delete a solution")]
    Delete {
        #[arg(help = "Workspace ID")]
        workspace: String,
        #[arg(help = "Solution ID")]
        id: String,
    },
}

pub async fn handle(cmd: SolutionCommands, ctx: &Context, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let api = &ctx.api;

    match cmd {
        SolutionCommands::List { workspace, page, limit } => {
            ensure_visible(
                session,
                Requirement::endpoint(format!("{}/solutions", workspace_path(&workspace)), "GET"),
            )?;
            let request = ctx.page(page, limit);
            let result = api.list_solutions(&workspace, request, &ctx.cancel).await?;
            let window = result.window(request);

            if result.items.is_empty() {
                return output_empty_collection(&output_format, "solutions", "No solutions in this workspace");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "solutions": result.items, "page": window })),
                OutputFormat::Text => {
                    let now = Utc::now();
                    let rows: Vec<Vec<String>> = result
                        .items
                        .iter()
                        .map(|s| {
                            vec![
                                s.solution_id.clone(),
                                s.solution_name.clone(),
                                badge(s.solution_status.as_deref().unwrap_or("Unknown")),
                                s.datasources.len().to_string(),
                                relative_time_opt(s.last_modified_at.or(s.created_at), now),
                            ]
                        })
                        .collect();
                    print_table(&["ID", "NAME", "STATUS", "DATASOURCES", "UPDATED"], &rows);
                    print_page_footer(&window);
                    Ok(())
                }
            }
        }
        SolutionCommands::Show { workspace, id } => {
            ensure_visible(session, Requirement::endpoint(solution_path(&workspace, &id), "GET"))?;
            let solution = api.get_solution(&workspace, &id, &ctx.cancel).await?;

            match output_format {
                OutputFormat::Json => output_json(&json!({ "solution": solution })),
                OutputFormat::Text => {
                    let now = Utc::now();
                    println!("{} ({})", solution.solution_name, solution.solution_id);
                    println!("Workspace:   {}", solution.workspace_id.as_deref().unwrap_or(&workspace));
                    println!("Status:      {}", badge(solution.solution_status.as_deref().unwrap_or("Unknown")));
                    if let Some(description) = &solution.description {
                        println!("Description: {}", description);
                    }
                    println!("Created:     {}", relative_time_opt(solution.created_at, now));
                    println!("Updated:     {}", relative_time_opt(solution.last_modified_at, now));
                    if solution.datasources.is_empty() {
                        println!("Datasources: none attached");
                    } else {
                        println!("Datasources: {}", solution.datasources.join(", "));
                    }
                    Ok(())
                }
            }
        }
        SolutionCommands::Create {
            workspace,
            name,
            description,
        } => {
            ensure_allowed(
                session,
                Requirement::endpoint(format!("{}/solutions", workspace_path(&workspace)), "POST"),
            )?;
            let input = CreateSolution {
                solution_name: name,
                description,
            };
            let solution = api.create_solution(&workspace, &input, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Solution '{}' created ({})", solution.solution_name, solution.solution_id),
                Some(json!({ "solution": solution })),
            )
        }
        SolutionCommands::Update {
            workspace,
            id,
            name,
            description,
        } => {
            ensure_allowed(session, Requirement::endpoint(solution_path(&workspace, &id), "PUT"))?;
            if name.is_none() && description.is_none() {
                anyhow::bail!("nothing to update: pass --name and/or --description");
            }
            let input = UpdateSolution {
                solution_name: name,
                description,
            };
            let solution = api.update_solution(&workspace, &id, &input, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Solution '{}' updated", solution.solution_name),
                Some(json!({ "solution": solution })),
            )
        }
        SolutionCommands::Delete { workspace, id } => {
            ensure_allowed(session, Requirement::endpoint(solution_path(&workspace, &id), "DELETE"))?;
            api.delete_solution(&workspace, &id, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Solution '{}' deleted", id),
                Some(json!({ "id": id, "workspace": workspace })),
            )
        }
    }
}
