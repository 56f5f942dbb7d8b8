use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagecraft::api::{self, AppState};
use pagecraft::config::WorkspaceConfig;
use pagecraft::store::ProjectStore;

#[derive(Parser)]
#[command(name = "pagecraft")]
#[command(about = "Workspace server for AI-generated single-page prototypes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[command(flatten)]
        workspace: WorkspaceArgs,
    },
    /// Print the projects under the configured root, newest first
    Projects {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },
}

#[derive(Args)]
struct WorkspaceArgs {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Projects root directory (overrides config and environment)
    #[arg(long)]
    projects_dir: Option<PathBuf>,
}

impl WorkspaceArgs {
    fn load(&self) -> anyhow::Result<WorkspaceConfig> {
        let mut config = WorkspaceConfig::load(&self.config)?.with_env_overrides();
        if let Some(dir) = &self.projects_dir {
            config.projects_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "pagecraft=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(host: &str, port: u16, config: WorkspaceConfig) -> anyhow::Result<()> {
    match &config.projects_dir {
        Some(dir) => tracing::info!("Projects directory: {}", dir.display()),
        None => tracing::warn!("No projects directory configured"),
    }

    let app = api::create_router(AppState::from_config(&config));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("pagecraft listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve {
            port,
            host,
            workspace,
        }) => serve(&host, port, workspace.load()?).await?,
        Some(Commands::Projects { workspace }) => {
            let store = ProjectStore::new(workspace.load()?.projects_dir);
            for project in store.list() {
                let marker = if project.has_artifact { "*" } else { " " };
                println!(
                    "{} {}  {}",
                    marker,
                    project.modified_at.format("%Y-%m-%d %H:%M"),
                    project.name
                );
            }
        }
        None => {
            let workspace = WorkspaceArgs {
                config: PathBuf::from("config.json"),
                projects_dir: None,
            };
            serve("127.0.0.1", 8000, workspace.load()?).await?;
        }
    }

    Ok(())
}
