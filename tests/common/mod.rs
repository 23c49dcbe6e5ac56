#![allow(dead_code)]

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;
use todo_server::{configure, AppState, InMemoryRepository, Settings};

pub fn test_state() -> AppState {
    let config = Settings::new_for_test().expect("Failed to load test config");
    AppState::with_repository(config, Arc::new(InMemoryRepository::new()))
}

pub async fn test_app(
    state: AppState,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure),
    )
    .await
}

pub async fn register<S>(app: &S, username: &str, email: &str, password: &str) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": username, "email": email, "password": password }))
        .send_request(app)
        .await
}

pub async fn login<S>(app: &S, username: &str, password: &str) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    test::TestRequest::post()
        .uri("/token")
        .set_form([("username", username), ("password", password)])
        .send_request(app)
        .await
}

/// Registers the account and returns a bearer token for it.
pub async fn signup<S>(app: &S, username: &str, password: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = register(app, username, &format!("{}@x.com", username), password).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", username);

    let resp = login(app, username, password).await;
    assert_eq!(resp.status(), 200, "login of {} failed", username);
    let body: Value = test::read_body_json(resp).await;
    body["access_token"].as_str().expect("access_token missing").to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
