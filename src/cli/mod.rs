pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::api::{PageRequest, WorkbenchApi};
use crate::auth::{FileTokenStore, Session, SessionManager};
use crate::config::AppConfig;
use crate::error::ClientError;
use crate::http::CancelToken;

#[derive(Parser)]
#[command(name = "workbench")]
#[command(about = "Workbench CLI - manage workspaces, solutions and datasources")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Initialize configuration directory with required files")]
    Init,

    #[command(about = "Show or change console settings")]
    Config {
        #[command(subcommand)]
        cmd: commands::config::ConfigCommands,
    },

    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Workspace management")]
    Workspace {
        #[command(subcommand)]
        cmd: commands::workspace::WorkspaceCommands,
    },

    #[command(about = "Solutions within a workspace")]
    Solution {
        #[command(subcommand)]
        cmd: commands::solution::SolutionCommands,
    },

    #[command(about = "Datasource management and attachment")]
    Datasource {
        #[command(subcommand)]
        cmd: commands::datasource::DatasourceCommands,
    },

    #[command(about = "Roles and their permissions")]
    Role {
        #[command(subcommand)]
        cmd: commands::role::RoleCommands,
    },

    #[command(about = "Users and role assignment")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Activity history of a resource")]
    Activity {
        #[command(subcommand)]
        cmd: commands::activity::ActivityCommands,
    },

    #[command(about = "Solution execution history")]
    Execution {
        #[command(subcommand)]
        cmd: commands::execution::ExecutionCommands,
    },

    #[command(about = "Workspace cost reporting")]
    Cost {
        #[command(subcommand)]
        cmd: commands::cost::CostCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command needs: the API client with the restored session,
/// the session manager and a cancellation token tied to Ctrl-C.
pub struct Context {
    pub api: WorkbenchApi,
    pub sessions: SessionManager<FileTokenStore>,
    pub cancel: CancelToken,
    pub page_size: u32,
}

impl Context {
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::load_settings()?;
        let mut app_config: AppConfig = crate::config::config().clone();
        if let Some(url) = settings.api_url.as_ref().filter(|_| !config::api_url_from_env()) {
            app_config.api.base_url = url.trim_end_matches('/').to_string();
        }
        let page_size = settings.page_size.unwrap_or(app_config.display.page_size);

        let mut api = WorkbenchApi::from_config(&app_config)?;
        let sessions = SessionManager::new(config::token_store()?);
        if let Some(session) = sessions.restore()? {
            if session.is_expired() {
                tracing::warn!("stored session for '{}' has expired", session.username());
            }
            api.begin_session(session);
        }

        Ok(Self {
            api,
            sessions,
            cancel: CancelToken::new(),
            page_size,
        })
    }

    pub fn session(&self) -> anyhow::Result<&Session> {
        Ok(self.api.require_session()?)
    }

    pub fn page(&self, page: u32, limit: Option<u32>) -> PageRequest {
        PageRequest::new(page, limit.unwrap_or(self.page_size))
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let result = dispatch(cli.command, output_format.clone()).await;
    if let (Err(e), OutputFormat::Json) = (&result, &output_format) {
        let code = e.downcast_ref::<ClientError>().map(ClientError::error_code);
        utils::output_error(&output_format, &e.to_string(), code)?;
    }
    result
}

async fn dispatch(command: Commands, output_format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Init => commands::init::handle(output_format).await,
        Commands::Config { cmd } => commands::config::handle(cmd, output_format).await,
        command => {
            let mut ctx = Context::load()?;

            let cancel = ctx.cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });

            match command {
                Commands::Auth { cmd } => commands::auth::handle(cmd, &mut ctx, output_format).await,
                Commands::Workspace { cmd } => commands::workspace::handle(cmd, &ctx, output_format).await,
                Commands::Solution { cmd } => commands::solution::handle(cmd, &ctx, output_format).await,
                Commands::Datasource { cmd } => commands::datasource::handle(cmd, &ctx, output_format).await,
                Commands::Role { cmd } => commands::role::handle(cmd, &ctx, output_format).await,
                Commands::User { cmd } => commands::user::handle(cmd, &ctx, output_format).await,
                Commands::Activity { cmd } => commands::activity::handle(cmd, &ctx, output_format).await,
                Commands::Execution { cmd } => commands::execution::handle(cmd, &ctx, output_format).await,
                Commands::Cost { cmd } => commands::cost::handle(cmd, &ctx, output_format).await,
                Commands::Init | Commands::Config { .. } => Ok(()),
            }
        }
    }
}
