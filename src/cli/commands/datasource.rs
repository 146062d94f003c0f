use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::api::datasources::datasource_path;
use crate::api::encode_segment;
use crate::api::format::relative_time_opt;
use crate::api::models::{CreateDatasource, UpdateDatasource};
use crate::api::solutions::solution_path;
use crate::cli::utils::*;
use crate::cli::{Context, OutputFormat};
use crate::rbac::Requirement;

#[derive(Subcommand)]
pub enum DatasourceCommands {
    #[command(about = "List datasources")]
    List {
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: u32,
        #[arg(long, help = "Rows per page")]
        limit: Option<u32>,
    },

    #[command(about = "Show a datasource")]
    Show {
        #[arg(help = "Datasource ID")]
        id: String,
    },

    #[command(about = "Register a datasource")]
    Create {
        #[arg(help = "Datasource name")]
        name: String,
        #[arg(long = "type", help = "Datasource type, e.g. S3 or Redshift")]
        kind: String,
        #[arg(long, help = "Description")]
        description: Option<String>,
    },

    #[command(about = "Rename or describe a datasource")]
    Update {
        #[arg(help = "Datasource ID")]
        id: String,
        #[arg(long, help = "New name")]
        name: Option<String>,
        #[arg(long, help = "New description")]
        description: Option<String>,
    },

    #[command(about = "Delete a datasource")]
    Delete {
        #[arg(help = "Datasource ID")]
        id: String,
    },

    #[command(about = "Attach a datasource to a solution")]
    Attach {
        #[arg(help = "Workspace ID")]
        workspace: String,
        #[arg(help = "Solution ID")]
        solution: String,
        #[arg(help = "Datasource ID")]
        id: String,
    },

    #[command(about = "Detach a datasource from a solution")]
    Detach {
        #[arg(help = "Workspace ID")]
        workspace: String,
        #[arg(help = "Solution ID")]
        solution: String,
        #[arg(help = "Datasource ID")]
        id: String,
    },
}

pub async fn handle(cmd: DatasourceCommands, ctx: &Context, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let api = &ctx.api;

    match cmd {
        DatasourceCommands::List { page, limit } => {
            ensure_visible(session, Requirement::endpoint("/datasources", "GET"))?;
            let request = ctx.page(page, limit);
            let result = api.list_datasources(request, &ctx.cancel).await?;
            let window = result.window(request);

            if result.items.is_empty() {
                return output_empty_collection(&output_format, "datasources", "No datasources found");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "datasources": result.items, "page": window })),
                OutputFormat::Text => {
                    let now = Utc::now();
                    let rows: Vec<Vec<String>> = result
                        .items
                        .iter()
                        .map(|d| {
                            vec![
                                d.datasource_id.clone(),
                                d.datasource_name.clone(),
                                d.datasource_type.clone(),
                                badge(d.datasource_status.as_deref().unwrap_or("Unknown")),
                                relative_time_opt(d.created_at, now),
                            ]
                        })
                        .collect();
                    print_table(&["ID", "NAME", "TYPE", "STATUS", "CREATED"], &rows);
                    print_page_footer(&window);
                    Ok(())
                }
            }
        }
        DatasourceCommands::Show { id } => {
            ensure_visible(session, Requirement::endpoint(datasource_path(&id), "GET"))?;
            let datasource = api.get_datasource(&id, &ctx.cancel).await?;

            match output_format {
                OutputFormat::Json => output_json(&json!({ "datasource": datasource })),
                OutputFormat::Text => {
                    println!("{} ({})", datasource.datasource_name, datasource.datasource_id);
                    println!("Type:        {}", datasource.datasource_type);
                    println!(
                        "Status:      {}",
                        badge(datasource.datasource_status.as_deref().unwrap_or("Unknown"))
                    );
                    if let Some(description) = &datasource.description {
                        println!("Description: {}", description);
                    }
                    println!("Created:     {}", relative_time_opt(datasource.created_at, Utc::now()));
                    Ok(())
                }
            }
        }
        DatasourceCommands::Create {
            name,
            kind,
            description,
        } => {
            ensure_allowed(session, Requirement::endpoint("/datasources", "POST"))?;
            let input = CreateDatasource {
                datasource_name: name,
                datasource_type: kind,
                description,
            };
            let datasource = api.create_datasource(&input, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!(
                    "Datasource '{}' created ({})",
                    datasource.datasource_name, datasource.datasource_id
                ),
                Some(json!({ "datasource": datasource })),
            )
        }
        DatasourceCommands::Update { id, name, description } => {
            ensure_allowed(session, Requirement::endpoint(datasource_path(&id), "PUT"))?;
            if name.is_none() && description.is_none() {
                anyhow::bail!("nothing to update: pass --name and/or --description");
            }
            let input = UpdateDatasource {
                datasource_name: name,
                description,
            };
            let datasource = api.update_datasource(&id, &input, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Datasource '{}' updated", datasource.datasource_name),
                Some(json!({ "datasource": datasource })),
            )
        }
        DatasourceCommands::Delete { id } => {
            ensure_allowed(session, Requirement::endpoint(datasource_path(&id), "DELETE"))?;
            api.delete_datasource(&id, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Datasource '{}' deleted", id),
                Some(json!({ "id": id })),
            )
        }
        DatasourceCommands::Attach { workspace, solution, id } => {
            ensure_allowed(
                session,
                Requirement::endpoint(format!("{}/datasources", solution_path(&workspace, &solution)), "POST"),
            )?;
            let updated = api.attach_datasource(&workspace, &solution, &id, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Datasource '{}' attached to '{}'", id, updated.solution_name),
                Some(json!({ "solution": updated })),
            )
        }
        DatasourceCommands::Detach { workspace, solution, id } => {
            ensure_allowed(
                session,
                Requirement::endpoint(
                    format!("{}/datasources/{}", solution_path(&workspace, &solution), encode_segment(&id)),
                    "DELETE",
                ),
            )?;
            api.detach_datasource(&workspace, &solution, &id, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Datasource '{}' detached from '{}'", id, solution),
                None,
            )
        }
    }
}
