use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::api::encode_segment;
use crate::api::format::relative_time_opt;
use crate::api::models::Execution;
use crate::api::solutions::solution_path;
use crate::cli::utils::*;
use crate::cli::{Context, OutputFormat};
use crate::rbac::Requirement;

#[derive(Subcommand)]
pub enum ExecutionCommands {
    #[command(about = "List executions of a solution")]
    List {
        #[arg(help = "Workspace ID")]
        workspace: String,
        #[arg(help = "Solution ID")]
        solution: String,
    },

    #[command(about = "Show one execution")]
    Show {
        #[arg(help = "Workspace ID")]
        workspace: String,
        #[arg(help = "Solution ID")]
        solution: String,
        #[arg(help = "Execution ID")]
        id: String,
    },
}

fn duration(execution: &Execution) -> String {
    match (execution.started_at, execution.completed_at) {
        (Some(start), Some(end)) => {
            let secs = end.signed_duration_since(start).num_seconds().max(0);
            if secs < 60 {
                format!("{}s", secs)
            } else {
                format!("{}m {}s", secs / 60, secs % 60)
            }
        }
        _ => "-".to_string(),
    }
}

pub async fn handle(cmd: ExecutionCommands, ctx: &Context, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = ctx.session()?;

    match cmd {
        ExecutionCommands::List { workspace, solution } => {
            ensure_visible(
                session,
                Requirement::endpoint(format!("{}/executions", solution_path(&workspace, &solution)), "GET"),
            )?;
            let runs = ctx.api.list_executions(&workspace, &solution, &ctx.cancel).await?;

            if runs.is_empty() {
                return output_empty_collection(&output_format, "executions", "No executions yet");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "executions": runs })),
                OutputFormat::Text => {
                    let now = Utc::now();
                    let rows: Vec<Vec<String>> = runs
                        .iter()
                        .map(|e| {
                            vec![
                                e.execution_id.clone(),
                                badge(&e.execution_status),
                                e.triggered_by.clone().unwrap_or_default(),
                                relative_time_opt(e.started_at, now),
                                duration(e),
                            ]
                        })
                        .collect();
                    print_table(&["ID", "STATUS", "TRIGGERED BY", "STARTED", "DURATION"], &rows);
                    Ok(())
                }
            }
        }
        ExecutionCommands::Show { workspace, solution, id } => {
            ensure_visible(
                session,
                Requirement::endpoint(format!("{}/executions/{}", solution_path(&workspace, &solution), encode_segment(&id)), "GET"),
            )?;
            let run = ctx.api.get_execution(&workspace, &solution, &id, &ctx.cancel).await?;

            match output_format {
                OutputFormat::Json => output_json(&json!({ "execution": run })),
                OutputFormat::Text => {
                    let now = Utc::now();
                    println!("Execution {}", run.execution_id);
                    println!("Status:    {}", badge(&run.execution_status));
                    if let Some(by) = &run.triggered_by {
                        println!("Triggered: {}", by);
                    }
                    println!("Started:   {}", relative_time_opt(run.started_at, now));
                    println!("Completed: {}", relative_time_opt(run.completed_at, now));
                    println!("Duration:  {}", duration(&run));
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_duration_formatting() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut run = Execution {
            execution_id: "e1".to_string(),
            execution_status: "Completed".to_string(),
            triggered_by: None,
            started_at: Some(start),
            completed_at: Some(start + Duration::seconds(135)),
        };
        assert_eq!(duration(&run), "2m 15s");

        run.completed_at = None;
        assert_eq!(duration(&run), "-");
    }
}
