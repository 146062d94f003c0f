use clap::Subcommand;
use serde_json::json;

use crate::api::format::format_cost;
use crate::api::workspaces::workspace_path;
use crate::cli::utils::*;
use crate::cli::{Context, OutputFormat};
use crate::rbac::Requirement;

#[derive(Subcommand)]
pub enum CostCommands {
    #[command(about = "Cost totals and per-service breakdown for a workspace")]
    Summary {
        #[arg(help = "Workspace ID")]
        workspace: String,
        #[arg(long, help = "Only show the N most expensive services")]
        top: Option<usize>,
    },
}

pub async fn handle(cmd: CostCommands, ctx: &Context, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = ctx.session()?;

    match cmd {
        CostCommands::Summary { workspace, top } => {
            ensure_visible(
                session,
                Requirement::endpoint(format!("{}/costs", workspace_path(&workspace)), "GET"),
            )?;
            let summary = ctx.api.cost_summary(&workspace, &ctx.cancel).await?;

            let mut services = summary.top_services();
            if let Some(n) = top {
                services.truncate(n);
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "workspace": workspace,
                    "total": summary.total_cost,
                    "currency": summary.currency,
                    "period_start": summary.period_start,
                    "period_end": summary.period_end,
                    "services": services,
                })),
                OutputFormat::Text => {
                    println!("Total: {}", format_cost(summary.total_cost, &summary.currency));
                    if let (Some(start), Some(end)) = (summary.period_start, summary.period_end) {
                        println!("Period: {} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"));
                    }
                    if services.is_empty() {
                        return Ok(());
                    }
                    println!();
                    let rows: Vec<Vec<String>> = services
                        .iter()
                        .map(|s| vec![s.service.clone(), format_cost(s.cost, &summary.currency)])
                        .collect();
                    print_table(&["SERVICE", "COST"], &rows);
                    Ok(())
                }
            }
        }
    }
}
