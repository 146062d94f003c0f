use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::api::format::relative_time;
use crate::auth::Tokens;
use crate::cli::utils::{output_json, output_success, print_table};
use crate::cli::{Context, OutputFormat};
use crate::rbac::Resource;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Start a session from identity provider tokens")]
    Login {
        #[arg(long, help = "Access token sent as the bearer credential")]
        access_token: String,
        #[arg(long, help = "Identity token carrying username and role claims")]
        id_token: String,
    },

    #[command(about = "End the current session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Show what the current role may do per resource")]
    Permissions,
}

pub async fn handle(cmd: AuthCommands, ctx: &mut Context, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { access_token, id_token } => {
            let tokens = Tokens { access_token, id_token };
            let session = ctx.sessions.login(tokens, &ctx.api, &ctx.cancel).await?;

            let message = format!("Logged in as {} ({})", session.username(), session.role());
            let data = json!({
                "username": session.username(),
                "role": session.role(),
                "permissions": session.permissions().to_strings(),
            });
            ctx.api.begin_session(session);
            output_success(&output_format, &message, Some(data))
        }
        AuthCommands::Logout => {
            ctx.sessions.logout()?;
            ctx.api.end_session();
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let base_url = ctx.api.http().base_url().to_string();
            match ctx.api.session() {
                Some(session) => {
                    let expires_at = session.claims().expires_at();
                    match output_format {
                        OutputFormat::Json => output_json(&json!({
                            "authenticated": true,
                            "username": session.username(),
                            "role": session.role(),
                            "expired": session.is_expired(),
                            "expires_at": expires_at,
                            "started_at": session.started_at(),
                            "api_url": base_url,
                        })),
                        OutputFormat::Text => {
                            println!("Logged in as {} ({})", session.username(), session.role());
                            println!("Session started {}", relative_time(session.started_at(), Utc::now()));
                            if session.is_expired() {
                                println!("Identity token has expired; run 'workbench auth login' again");
                            } else if let Some(at) = expires_at {
                                println!("Expires {}", at.to_rfc3339());
                            }
                            println!("API: {}", base_url);
                            Ok(())
                        }
                    }
                }
                None => match output_format {
                    OutputFormat::Json => output_json(&json!({ "authenticated": false, "api_url": base_url })),
                    OutputFormat::Text => {
                        println!("Not logged in");
                        Ok(())
                    }
                },
            }
        }
        AuthCommands::Whoami => {
            let session = ctx.session()?;
            let claims = session.claims();
            match output_format {
                OutputFormat::Json => output_json(claims),
                OutputFormat::Text => {
                    println!("Username: {}", claims.username);
                    if let Some(email) = &claims.email {
                        println!("Email:    {}", email);
                    }
                    println!("Role:     {}", claims.role);
                    println!("Subject:  {}", claims.sub);
                    Ok(())
                }
            }
        }
        AuthCommands::Permissions => {
            let session = ctx.session()?;
            let resolver = session.resolver();
            let matrix: Vec<_> = Resource::all().iter().map(|r| resolver.capabilities(*r)).collect();

            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "role": session.role(),
                    "permissions": session.permissions().to_strings(),
                    "rejected": session.permissions().rejected(),
                    "capabilities": matrix,
                })),
                OutputFormat::Text => {
                    let mark = |granted: bool| if granted { "yes" } else { "-" }.to_string();
                    let rows: Vec<Vec<String>> = matrix
                        .iter()
                        .map(|c| {
                            vec![
                                c.resource.to_string(),
                                mark(c.view),
                                mark(c.manage),
                                mark(c.delete),
                                mark(c.full_access),
                            ]
                        })
                        .collect();
                    println!("Role: {}\n", session.role());
                    print_table(&["RESOURCE", "VIEW", "MANAGE", "DELETE", "FULL"], &rows);
                    if !session.permissions().rejected().is_empty() {
                        println!("\nIgnored: {}", session.permissions().rejected().join(", "));
                    }
                    Ok(())
                }
            }
        }
    }
}
