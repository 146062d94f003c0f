use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::api::encode_segment;
use crate::api::format::relative_time;
use crate::cli::utils::*;
use crate::cli::{Context, OutputFormat};
use crate::rbac::Requirement;

#[derive(Subcommand)]
pub enum ActivityCommands {
    #[command(about = "List activity for a resource, newest first")]
    List {
        #[arg(help = "Resource type, e.g. workspace or solution")]
        resource_type: String,
        #[arg(help = "Resource ID")]
        id: String,
        #[arg(long, help = "Only show the most recent N entries")]
        last: Option<usize>,
    },
}

pub async fn handle(cmd: ActivityCommands, ctx: &Context, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = ctx.session()?;

    match cmd {
        ActivityCommands::List { resource_type, id, last } => {
            ensure_visible(
                session,
                Requirement::endpoint(
                    format!("/activity-logs/{}/{}", encode_segment(&resource_type), encode_segment(&id)),
                    "GET",
                ),
            )?;
            let mut entries = ctx.api.list_activity(&resource_type, &id, &ctx.cancel).await?;
            entries.sort_by(|a, b| b.event_time.cmp(&a.event_time));
            if let Some(n) = last {
                entries.truncate(n);
            }

            if entries.is_empty() {
                return output_empty_collection(&output_format, "activity", "No activity recorded");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "activity": entries })),
                OutputFormat::Text => {
                    let now = Utc::now();
                    let rows: Vec<Vec<String>> = entries
                        .iter()
                        .map(|e| {
                            vec![
                                relative_time(e.event_time, now),
                                e.user.clone().unwrap_or_else(|| "system".to_string()),
                                e.action.clone(),
                                e.details.clone().unwrap_or_default(),
                            ]
                        })
                        .collect();
                    print_table(&["WHEN", "USER", "ACTION", "DETAILS"], &rows);
                    Ok(())
                }
            }
        }
    }
}
