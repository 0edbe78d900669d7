//! Handler tests over the in-memory adapters.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};

use blog_core::ports::{PasswordService, TokenService};
use blog_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
use blog_shared::dto::{AuthResponse, MessageResponse, PostResponse, UserResponse};

use crate::state::AppState;

const BOUNDARY: &str = "test-boundary";

/// Build a fully wired test service over in-memory state.
macro_rules! test_app {
    () => {{
        let state = AppState::in_memory(1024 * 1024);
        let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 1,
            issuer: "test-issuer".to_string(),
        }));
        let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(token_service))
                .app_data(web::Data::new(password_service))
                .configure(super::configure_routes),
        )
        .await
    }};
}

/// Register a user and return their bearer token.
macro_rules! register {
    ($app:expr, $username:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(serde_json::json!({
                "username": $username,
                "password": "password123",
            }))
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: AuthResponse = test::read_body_json(resp).await;
        body.access_token
    }};
}

fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((content_type, data)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"upload.bin\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(
    method: test::TestRequest,
    uri: &str,
    token: Option<&str>,
    body: Vec<u8>,
) -> actix_http::Request {
    let mut req = method.uri(uri).insert_header((
        "content-type",
        format!("multipart/form-data; boundary={BOUNDARY}"),
    ));
    if let Some(token) = token {
        req = req.insert_header(("authorization", format!("Bearer {token}")));
    }
    req.set_payload(body).to_request()
}

#[actix_web::test]
async fn test_health_check() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_login_wrong_password() {
    let app = test_app!();
    register!(&app, "alice");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(serde_json::json!({
            "username": "alice",
            "password": "not-the-password",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_me_returns_current_user() {
    let app = test_app!();
    let token = register!(&app, "alice");

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: UserResponse = test::read_body_json(resp).await;
    assert_eq!(body.username, "alice");
}

#[actix_web::test]
async fn test_me_without_token_is_rejected() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Please authenticate.");
}

#[actix_web::test]
async fn test_register_duplicate_username() {
    let app = test_app!();
    register!(&app, "alice");

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(serde_json::json!({
            "username": "alice",
            "password": "password123",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_unauthenticated_create_is_rejected() {
    let app = test_app!();

    let body = multipart_body(&[("title", "A"), ("content", "B")], None);
    let req = multipart_request(test::TestRequest::post(), "/api/posts", None, body);
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Please authenticate.");

    // No post was created
    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    let posts: Vec<PostResponse> = test::read_body_json(resp).await;
    assert!(posts.is_empty());
}

#[actix_web::test]
async fn test_create_rejects_blank_title() {
    let app = test_app!();
    let token = register!(&app, "alice");

    let body = multipart_body(&[("title", "   "), ("content", "B")], None);
    let req = multipart_request(test::TestRequest::post(), "/api/posts", Some(&token), body);
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_post_lifecycle_with_ownership() {
    let app = test_app!();
    let alice = register!(&app, "alice");
    let bob = register!(&app, "bob");

    // Alice creates a post
    let body = multipart_body(&[("title", "A"), ("content", "B")], None);
    let req = multipart_request(test::TestRequest::post(), "/api/posts", Some(&alice), body);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: PostResponse = test::read_body_json(resp).await;
    assert_eq!(created.author.username, "alice");
    assert_eq!(created.image_url, None);

    let uri = format!("/api/posts/{}", created.id);

    // Bob cannot update it
    let body = multipart_body(&[("title", "Hacked"), ("content", "B")], None);
    let req = multipart_request(test::TestRequest::put(), &uri, Some(&bob), body);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Post is unchanged
    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: PostResponse = test::read_body_json(resp).await;
    assert_eq!(fetched.title, "A");

    // Bob cannot delete it either
    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(("authorization", format!("Bearer {bob}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The owner can
    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(("authorization", format!("Bearer {alice}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: MessageResponse = test::read_body_json(resp).await;
    assert_eq!(body.message, "Post removed");

    // And now it is gone
    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_update_overwrites_fields_wholesale() {
    let app = test_app!();
    let token = register!(&app, "alice");

    let body = multipart_body(
        &[("title", "A"), ("subtitle", "sub"), ("content", "B")],
        None,
    );
    let req = multipart_request(test::TestRequest::post(), "/api/posts", Some(&token), body);
    let created: PostResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(created.subtitle.as_deref(), Some("sub"));

    // Subtitle omitted on update: it is cleared, not preserved
    let uri = format!("/api/posts/{}", created.id);
    let body = multipart_body(&[("title", "A2"), ("content", "B2")], None);
    let req = multipart_request(test::TestRequest::put(), &uri, Some(&token), body);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: PostResponse = test::read_body_json(resp).await;

    assert_eq!(updated.title, "A2");
    assert_eq!(updated.content, "B2");
    assert_eq!(updated.subtitle, None);
}

#[actix_web::test]
async fn test_image_upload_round_trip() {
    let app = test_app!();
    let token = register!(&app, "alice");
    let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

    let body = multipart_body(
        &[("title", "A"), ("content", "B")],
        Some(("image/png", &payload)),
    );
    let req = multipart_request(test::TestRequest::post(), "/api/posts", Some(&token), body);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: PostResponse = test::read_body_json(resp).await;

    let image_url = created.image_url.expect("post should carry an image url");
    assert!(image_url.starts_with("/uploads/"));

    let req = test::TestRequest::get().uri(&image_url).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap();
    assert_eq!(content_type.to_str().unwrap(), "image/png");
    let bytes = test::read_body(resp).await;
    assert_eq!(bytes.as_ref(), payload.as_slice());
}

#[actix_web::test]
async fn test_replaced_image_leaves_old_attachment() {
    let app = test_app!();
    let token = register!(&app, "alice");

    let body = multipart_body(
        &[("title", "A"), ("content", "B")],
        Some(("image/png", b"old-bytes")),
    );
    let req = multipart_request(test::TestRequest::post(), "/api/posts", Some(&token), body);
    let created: PostResponse = test::read_body_json(test::call_service(&app, req).await).await;
    let old_url = created.image_url.unwrap();

    let uri = format!("/api/posts/{}", created.id);
    let body = multipart_body(
        &[("title", "A"), ("content", "B")],
        Some(("image/jpeg", b"new-bytes")),
    );
    let req = multipart_request(test::TestRequest::put(), &uri, Some(&token), body);
    let updated: PostResponse = test::read_body_json(test::call_service(&app, req).await).await;
    let new_url = updated.image_url.unwrap();
    assert_ne!(old_url, new_url);

    // The orphaned object remains downloadable
    let req = test::TestRequest::get().uri(&old_url).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = test::read_body(resp).await;
    assert_eq!(bytes.as_ref(), b"old-bytes");
}

#[actix_web::test]
async fn test_download_error_statuses() {
    let app = test_app!();

    // Malformed id
    let req = test::TestRequest::get()
        .uri("/uploads/not-a-uuid")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Well-formed but unknown id
    let req = test::TestRequest::get()
        .uri(&format!("/uploads/{}", uuid::Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_oversized_upload_is_rejected() {
    let app = test_app!();
    let token = register!(&app, "alice");
    let payload = vec![0u8; 2 * 1024 * 1024]; // over the 1 MiB test cap

    let body = multipart_body(
        &[("title", "A"), ("content", "B")],
        Some(("image/png", &payload)),
    );
    let req = multipart_request(test::TestRequest::post(), "/api/posts", Some(&token), body);
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
