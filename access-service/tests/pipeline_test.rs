//! End-to-end tests of the request authorization pipeline: every
//! protected operation goes through the same funnel, denials are
//! terminal before the handler, and infrastructure failures are not
//! denials.

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;
use uuid::Uuid;

use access_service::db::{
    CredentialVerifier, LookupError, MemoryCastings, PermissionLookup, UserLookup,
};
use access_service::models::{Permission, Role, User};
use async_trait::async_trait;

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let test_app = common::spawn_app().await;

    let response = test_app.app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unauthenticated_requests_to_protected_operations_are_rejected() {
    let test_app = common::spawn_app().await;

    for request in [
        get("/castings", None),
        json_request("POST", "/castings", None, r#"{"title":"Editorial"}"#),
        json_request(
            "PATCH",
            &format!("/users/{}/profile", Uuid::new_v4()),
            None,
            r#"{"bio":"hi"}"#,
        ),
    ] {
        let response = test_app.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Nothing reached the backend.
    assert_eq!(test_app.backend.application_count().await, 0);
}

#[tokio::test]
async fn garbage_tokens_are_unauthenticated() {
    let test_app = common::spawn_app().await;

    let response = test_app
        .app
        .clone()
        .oneshot(get("/castings", Some("not-a-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn model_may_view_and_apply_but_not_create() {
    let test_app = common::spawn_app().await;
    let model = test_app
        .register("mira@example.com", "Mira", "pw-123456", "model")
        .await;
    let photographer = test_app
        .register("kai@example.com", "Kai", "pw-123456", "photographer")
        .await;

    let model_token = test_app.token_for(&model, "model");
    let photographer_token = test_app.token_for(&photographer, "photographer");

    // Photographer sets up a casting.
    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/castings",
            Some(&photographer_token),
            r#"{"title":"Editorial shoot","description":"Two looks"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let casting: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let casting_id = casting["casting_id"].as_str().unwrap().to_string();

    // Model can view the board.
    let response = test_app
        .app
        .clone()
        .oneshot(get("/castings", Some(&model_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Model cannot create a casting.
    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/castings",
            Some(&model_token),
            r#"{"title":"My own casting"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The denial body names only the failing pair.
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "Missing permission: casting:create");

    // Model can apply.
    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/castings/{}/applications", casting_id),
            Some(&model_token),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(test_app.backend.application_count().await, 1);
}

#[tokio::test]
async fn denied_operations_never_reach_the_handler() {
    let test_app = common::spawn_app().await;
    let model = test_app
        .register("mira@example.com", "Mira", "pw-123456", "model")
        .await;
    let token = test_app.token_for(&model, "model");

    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/castings/{}/applications", Uuid::new_v4()),
            None,
            "",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A denied creation leaves no casting behind either: the model's
    // create was rejected before the backend saw it.
    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/castings",
            Some(&token),
            r#"{"title":"Should not exist"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_app
        .app
        .clone()
        .oneshot(get("/castings", Some(&token)))
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let castings: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(castings.as_array().unwrap().len(), 0);
    assert_eq!(test_app.backend.application_count().await, 0);
}

#[tokio::test]
async fn own_profile_updates_are_ownership_checked() {
    let test_app = common::spawn_app().await;
    let mira = test_app
        .register("mira@example.com", "Mira", "pw-123456", "model")
        .await;
    let kai = test_app
        .register("kai@example.com", "Kai", "pw-123456", "model")
        .await;
    let token = test_app.token_for(&mira, "model");

    // Own profile: allowed.
    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/users/{}/profile", mira.user_id),
            Some(&token),
            r#"{"bio":"Editorial and runway"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Someone else's profile: forbidden despite profile:update:own.
    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/users/{}/profile", kai.user_id),
            Some(&token),
            r#"{"bio":"hijacked"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unparseable_owner_target_is_a_bad_request_not_a_denial() {
    let test_app = common::spawn_app().await;
    let mira = test_app
        .register("mira@example.com", "Mira", "pw-123456", "model")
        .await;
    let token = test_app.token_for(&mira, "model");

    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/users/not-a-uuid/profile",
            Some(&token),
            r#"{"bio":"hi"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn role_assignment_is_admin_only_and_takes_effect() {
    let test_app = common::spawn_app().await;
    let admin = test_app
        .register("root@example.com", "Root", "pw-123456", "admin")
        .await;
    let mira = test_app
        .register("mira@example.com", "Mira", "pw-123456", "model")
        .await;

    let admin_token = test_app.token_for(&admin, "admin");
    let model_token = test_app.token_for(&mira, "model");

    // A model may not touch role assignments.
    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/admin/users/{}/role", mira.user_id),
            Some(&model_token),
            r#"{"role":"admin"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin promotes Mira to photographer.
    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/admin/users/{}/role", mira.user_id),
            Some(&admin_token),
            r#"{"role":"photographer"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The reassignment takes effect on the next resolution: even the
    // token issued while Mira was a model now opens casting creation,
    // because decisions resolve the directory role, not the token claim.
    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/castings",
            Some(&model_token),
            r#"{"title":"First casting"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Directory that fails every lookup.
struct BrokenDirectory;

#[async_trait]
impl UserLookup for BrokenDirectory {
    async fn user(&self, _user_id: Uuid) -> Result<Option<User>, LookupError> {
        Err(LookupError::Unavailable("directory offline".to_string()))
    }

    async fn assign_role(&self, _user_id: Uuid, _role_id: Uuid) -> Result<bool, LookupError> {
        Err(LookupError::Unavailable("directory offline".to_string()))
    }
}

#[async_trait]
impl PermissionLookup for BrokenDirectory {
    async fn role(&self, _role_id: Uuid) -> Result<Option<Role>, LookupError> {
        Err(LookupError::Unavailable("directory offline".to_string()))
    }

    async fn role_by_name(&self, _name: &str) -> Result<Option<Role>, LookupError> {
        Err(LookupError::Unavailable("directory offline".to_string()))
    }

    async fn role_permissions(&self, _role_id: Uuid) -> Result<Vec<Permission>, LookupError> {
        Err(LookupError::Unavailable("directory offline".to_string()))
    }
}

#[async_trait]
impl CredentialVerifier for BrokenDirectory {
    async fn verify_credentials(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<Option<User>, LookupError> {
        Err(LookupError::Unavailable("directory offline".to_string()))
    }
}

#[tokio::test]
async fn lookup_failures_surface_as_infrastructure_errors_not_denials() {
    let broken = Arc::new(BrokenDirectory);
    let (app, jwt) = common::spawn_app_with(
        broken.clone(),
        broken.clone(),
        broken,
        Arc::new(MemoryCastings::new()),
    )
    .await;

    let user = User::new(
        "mira@example.com".to_string(),
        "Mira".to_string(),
        Uuid::new_v4(),
    );
    let token = jwt.issue(&user, "model").unwrap().access_token;

    let response = app
        .oneshot(get("/castings", Some(&token)))
        .await
        .unwrap();

    // 502, not 403: a broken directory must never read as a decision.
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
