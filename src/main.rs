use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use flowboard::config::{CliOverrides, FlowboardConfig};

mod cmd;

#[derive(Parser)]
#[command(name = "flowboard")]
#[command(version, about = "Kanban/GTD board client with WIP limits and live sync")]
pub struct Cli {
    /// Path to a config file. Defaults to ./flowboard.toml, then the user config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Board service REST base URL (overrides config and FLOWBOARD_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Board service WebSocket URL (overrides config and FLOWBOARD_WS_URL)
    #[arg(long, global = true)]
    pub ws_url: Option<String>,

    /// Bearer token (overrides config and FLOWBOARD_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Debug logging for flowboard
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "FLOWBOARD_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a board grouped by column or by project swimlane
    Show {
        board: String,

        /// Group by project first
        #[arg(long)]
        swimlanes: bool,

        /// Case-insensitive text in title or description
        #[arg(short, long)]
        search: Option<String>,

        /// Only tasks with this context (email, meeting, phone, read, watch, desk, other)
        #[arg(long)]
        context: Option<String>,

        /// Only tasks in columns of this type (input, clarify, context, waiting, someday, done, archive)
        #[arg(long)]
        column_type: Option<String>,

        /// Only tasks in this project
        #[arg(long)]
        project: Option<String>,

        /// Only stale tasks
        #[arg(long)]
        stale: bool,

        /// Hide completed tasks
        #[arg(long)]
        hide_done: bool,
    },
    /// Move a task to another column
    Move {
        board: String,
        task: String,
        column: String,

        /// Proposed position within the column
        #[arg(long)]
        position: Option<f64>,

        /// Exceed the column's WIP limit
        #[arg(long)]
        force: bool,
    },
    /// Create a task
    Create {
        board: String,
        column: String,
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        context: Option<String>,
    },
    /// Edit a task's fields
    Edit {
        board: String,
        task: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        context: Option<String>,

        /// Mark done (true) or reopen (false)
        #[arg(long)]
        done: Option<bool>,

        #[arg(long)]
        waiting_for: Option<String>,

        /// Replace the task's tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Delete a task
    Delete { board: String, task: String },
    /// Accept a server suggestion (title, description, context) for a task
    AcceptHint {
        board: String,
        task: String,
        field: String,
    },
    /// Show column occupancy against WIP limits
    Wip { board: String },
    /// Stream live board events until interrupted
    Watch {
        #[arg(required = true)]
        boards: Vec<String>,
    },
}

fn init_logging(verbose: bool, log_json: bool) {
    let default = if verbose { "flowboard=debug" } else { "flowboard=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let registry = tracing_subscriber::registry().with(filter);
    if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let overrides = CliOverrides {
        api_url: cli.api_url.clone(),
        ws_url: cli.ws_url.clone(),
        token: cli.token.clone(),
    };
    let config = FlowboardConfig::resolve(cli.config.as_deref(), &overrides)?;

    match &cli.command {
        Commands::Show {
            board,
            swimlanes,
            search,
            context,
            column_type,
            project,
            stale,
            hide_done,
        } => {
            let filter = cmd::parse_filter(
                search.clone(),
                context.as_deref(),
                column_type.as_deref(),
                project.clone(),
                *stale,
                *hide_done,
            )?;
            cmd::cmd_show(&config, board, &filter, *swimlanes).await?;
        }
        Commands::Move {
            board,
            task,
            column,
            position,
            force,
        } => {
            cmd::cmd_move(&config, board, task, column, *position, *force).await?;
        }
        Commands::Create {
            board,
            column,
            title,
            description,
            project,
            context,
        } => {
            cmd::cmd_create(
                &config,
                board,
                column,
                title,
                description.clone(),
                project.clone(),
                context.as_deref(),
            )
            .await?;
        }
        Commands::Edit {
            board,
            task,
            title,
            description,
            project,
            context,
            done,
            waiting_for,
            tags,
        } => {
            let edits = cmd::TaskEdits {
                title: title.clone(),
                description: description.clone(),
                project_id: project.clone(),
                context: context.clone(),
                done: *done,
                waiting_for: waiting_for.clone(),
                tags: tags.clone(),
            };
            cmd::cmd_edit(&config, board, task, edits).await?;
        }
        Commands::Delete { board, task } => cmd::cmd_delete(&config, board, task).await?,
        Commands::AcceptHint { board, task, field } => {
            cmd::cmd_accept_hint(&config, board, task, field).await?
        }
        Commands::Wip { board } => cmd::cmd_wip(&config, board).await?,
        Commands::Watch { boards } => cmd::cmd_watch(&config, boards).await?,
    }

    Ok(())
}
