use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;

use access_service::{
    build_router,
    config::AccessConfig,
    db::{MemoryCastings, MemoryDirectory},
    registry::default_registry,
    services::{DecisionEngine, PermissionStore, TokenService},
    AppState,
};
use service_core::observability::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = AccessConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting access service"
    );

    // Directory and backend collaborators. In-memory reference
    // implementations; real persistence plugs in behind the same traits.
    let directory = Arc::new(MemoryDirectory::new());
    if directory.seed_defaults().await {
        tracing::info!("Directory seeded with default roles");
    }

    if let (Some(email), Some(password)) = (
        config.bootstrap.admin_email.clone(),
        config.bootstrap.admin_password.clone(),
    ) {
        let admin = directory
            .insert_user(&email, "Administrator", &password, "admin")
            .await
            .map_err(service_core::error::AppError::InternalError)?;
        tracing::info!(user_id = %admin.user_id, "Bootstrap admin registered");
    }

    let backend = Arc::new(MemoryCastings::new());

    let jwt = TokenService::new(&config.token);
    tracing::info!("Token service initialized");

    let store = PermissionStore::new(directory.clone(), directory.clone());
    let engine = DecisionEngine::new(store);

    let registry = Arc::new(default_registry());
    for (operation, declared) in registry.operations() {
        tracing::debug!(
            operation = %operation,
            requirements = ?declared
                .requirements
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>(),
            "Declared operation requirements"
        );
    }

    let state = AppState {
        config: config.clone(),
        jwt,
        engine,
        registry,
        users: directory.clone(),
        roles: directory.clone(),
        credentials: directory,
        backend,
    };

    let app = build_router(state).await?;

    let addr = SocketAddr::new(config.common.host.parse().map_err(|e| {
        service_core::error::AppError::ConfigError(anyhow::anyhow!("Invalid host: {}", e))
    })?, config.common.port);

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
