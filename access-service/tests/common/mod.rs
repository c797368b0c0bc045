use std::sync::Arc;

use axum::Router;

use access_service::{
    build_router,
    config::{AccessConfig, BootstrapConfig, Environment, SecurityConfig, TokenConfig},
    db::{CastingBackend, CredentialVerifier, MemoryCastings, MemoryDirectory, PermissionLookup, UserLookup},
    models::User,
    registry::default_registry,
    services::{DecisionEngine, PermissionStore, TokenService},
    AppState,
};

pub struct TestApp {
    pub app: Router,
    pub directory: Arc<MemoryDirectory>,
    pub backend: Arc<MemoryCastings>,
    pub jwt: TokenService,
}

pub fn test_config() -> AccessConfig {
    AccessConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        environment: Environment::Dev,
        service_name: "access-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        token: TokenConfig {
            secret: "integration-test-secret-0123456789abcdef".to_string(),
            issuer: "access-service".to_string(),
            audience: "casting-platform".to_string(),
            access_token_expiry_minutes: 60,
            clock_skew_seconds: 60,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        bootstrap: BootstrapConfig {
            admin_email: None,
            admin_password: None,
        },
    }
}

/// Build an app around the given collaborators. Lets tests swap in a
/// failing directory while keeping the same token configuration.
pub async fn spawn_app_with(
    users: Arc<dyn UserLookup>,
    roles: Arc<dyn PermissionLookup>,
    credentials: Arc<dyn CredentialVerifier>,
    backend: Arc<dyn CastingBackend>,
) -> (Router, TokenService) {
    let config = test_config();
    let jwt = TokenService::new(&config.token);
    let engine = DecisionEngine::new(PermissionStore::new(users.clone(), roles.clone()));

    let state = AppState {
        config,
        jwt: jwt.clone(),
        engine,
        registry: Arc::new(default_registry()),
        users,
        roles,
        credentials,
        backend,
    };

    let app = build_router(state).await.expect("failed to build router");
    (app, jwt)
}

/// Build an app over a freshly seeded in-memory directory.
pub async fn spawn_app() -> TestApp {
    let directory = Arc::new(MemoryDirectory::new());
    directory.seed_defaults().await;
    let backend = Arc::new(MemoryCastings::new());

    let (app, jwt) = spawn_app_with(
        directory.clone(),
        directory.clone(),
        directory.clone(),
        backend.clone(),
    )
    .await;

    TestApp {
        app,
        directory,
        backend,
        jwt,
    }
}

impl TestApp {
    pub async fn register(&self, email: &str, name: &str, password: &str, role: &str) -> User {
        self.directory
            .insert_user(email, name, password, role)
            .await
            .expect("failed to register test user")
    }

    pub fn token_for(&self, user: &User, role: &str) -> String {
        self.jwt
            .issue(user, role)
            .expect("failed to issue test token")
            .access_token
    }
}
