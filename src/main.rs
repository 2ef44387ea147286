use anyhow::Result;
use clap::Parser;
use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_core::cli::{self, Cli, Commands, DbCommands, TokenCommands};
use bazaar_core::config::Config;
use bazaar_core::services::reconciliation;
use bazaar_core::{AppState, create_app, db};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Cli::parse();
    let config = Config::from_env()?;

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Db(DbCommands::Migrate) => cli::handle_db_migrate(&config).await,
        Commands::Config => cli::handle_config_validate(&config),
        Commands::Reconcile => cli::handle_reconcile(&config).await,
        Commands::Token(TokenCommands::Mint { user_id, role }) => {
            cli::handle_token_mint(&config, user_id, &role)
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    let pool = db::create_pool(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    // Balance reconciliation runs beside the server
    tokio::spawn(reconciliation::run_reconciler(
        pool.clone(),
        config.reconcile_interval_secs,
    ));

    let state = AppState {
        db: pool,
        config: config.clone(),
    };
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
