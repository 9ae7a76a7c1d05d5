use rootcause::prelude::Report;
use schoolbook_server::{
    app,
    auth::AppState,
    config::ServerConfig,
    db::seed_if_empty,
    mail::{Mailer, SmtpMailer},
};
use sqlx::postgres::PgPoolOptions;
use std::fmt;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Errors that stop the server from starting or keep it from serving.
#[derive(Debug)]
enum StartupError {
    Config { details: String },
    Database { details: String },
    Migration { details: String },
    Seed { details: String },
    Bind { addr: String, details: String },
    Serve { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "failed to load configuration: {}", details),
            Self::Database { details } => write!(f, "failed to connect to database: {}", details),
            Self::Migration { details } => write!(f, "failed to run migrations: {}", details),
            Self::Seed { details } => write!(f, "failed to seed database: {}", details),
            Self::Bind { addr, details } => write!(f, "failed to bind to {}: {}", addr, details),
            Self::Serve { details } => write!(f, "server error: {}", details),
        }
    }
}

impl std::error::Error for StartupError {}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::error!(error = %report, "shutting down");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Report<StartupError>> {
    // Load configuration from environment
    let config = ServerConfig::from_env().map_err(|e| StartupError::Config {
        details: e.to_string(),
    })?;
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| StartupError::Database {
            details: e.to_string(),
        })?;

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| StartupError::Migration {
            details: e.to_string(),
        })?;

    let outcome = seed_if_empty(
        &db_pool,
        config.seed_path.as_deref(),
        config.bootstrap_admin.as_ref(),
    )
    .await
    .map_err(|e| StartupError::Seed {
        details: e.to_string(),
    })?;
    tracing::info!(
        ran_seed_file = outcome.ran_seed_file,
        created_admin = outcome.created_admin,
        "Seeding checked"
    );

    let mailer: Option<Arc<dyn Mailer>> = match config.mail {
        Some(mail) => {
            tracing::info!(host = %mail.smtp_host(), port = mail.smtp_port(), "Parent mail enabled");
            Some(Arc::new(SmtpMailer::new(mail)))
        }
        None => {
            tracing::warn!("MAIL__USERNAME/MAIL__PASSWORD not set, parent mail disabled");
            None
        }
    };

    // Create application state
    let app_state = Arc::new(AppState::new(
        db_pool,
        &config.token,
        &config.policy,
        mailer,
    ));
    let app = app::router(app_state, &config.static_dir);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| StartupError::Bind {
            addr: addr.clone(),
            details: e.to_string(),
        })?;

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            details: e.to_string(),
        })?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
