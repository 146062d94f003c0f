use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::api::format::relative_time_opt;
use crate::api::users::user_path;
use crate::cli::utils::*;
use crate::cli::{Context, OutputFormat};
use crate::rbac::Requirement;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List users")]
    List {
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: u32,
        #[arg(long, help = "Rows per page")]
        limit: Option<u32>,
    },

    #[command(about = "Show a user")]
    Show {
        #[arg(help = "User ID")]
        id: String,
    },

    #[command(about = "Assign a role to a user")]
    AssignRole {
        #[arg(help = "User ID")]
        id: String,
        #[arg(help = "Role name")]
        role: String,
    },
}

pub async fn handle(cmd: UserCommands, ctx: &Context, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let api = &ctx.api;

    match cmd {
        UserCommands::List { page, limit } => {
            ensure_visible(session, Requirement::endpoint("/users", "GET"))?;
            let request = ctx.page(page, limit);
            let result = api.list_users(request, &ctx.cancel).await?;
            let window = result.window(request);

            if result.items.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "users": result.items, "page": window })),
                OutputFormat::Text => {
                    let now = Utc::now();
                    let rows: Vec<Vec<String>> = result
                        .items
                        .iter()
                        .map(|u| {
                            vec![
                                u.user_id.clone(),
                                u.username.clone(),
                                u.email.clone().unwrap_or_default(),
                                u.role.clone().unwrap_or_else(|| "-".to_string()),
                                relative_time_opt(u.created_at, now),
                            ]
                        })
                        .collect();
                    print_table(&["ID", "USERNAME", "EMAIL", "ROLE", "JOINED"], &rows);
                    print_page_footer(&window);
                    Ok(())
                }
            }
        }
        UserCommands::Show { id } => {
            ensure_visible(session, Requirement::endpoint(user_path(&id), "GET"))?;
            let user = api.get_user(&id, &ctx.cancel).await?;

            match output_format {
                OutputFormat::Json => output_json(&json!({ "user": user })),
                OutputFormat::Text => {
                    println!("{} ({})", user.username, user.user_id);
                    if let Some(email) = &user.email {
                        println!("Email:  {}", email);
                    }
                    println!("Role:   {}", user.role.as_deref().unwrap_or("-"));
                    println!("Joined: {}", relative_time_opt(user.created_at, Utc::now()));
                    Ok(())
                }
            }
        }
        UserCommands::AssignRole { id, role } => {
            ensure_allowed(session, Requirement::endpoint(format!("{}/role", user_path(&id)), "PUT"))?;
            let user = api.assign_role(&id, &role, &ctx.cancel).await?;
            output_success(
                &output_format,
                &format!("Assigned role '{}' to {}", role, user.username),
                Some(json!({ "user": user })),
            )
        }
    }
}
