#![allow(dead_code)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::Value;

use taskhub::auth::{generate_token, AuthMiddleware, AuthSettings};
use taskhub::models::{NewUser, User};
use taskhub::routes::{self, health};
use taskhub::store::{MemoryStore, Store};

pub const JWT_SECRET: &str = "integration-test-secret";

/// A seeded account together with a valid bearer token for it.
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> i32 {
        self.user.id
    }

    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

pub fn new_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// The same application `main` serves, backed by `store` instead of PostgreSQL.
pub fn build_app(
    store: Arc<dyn Store>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::from(store))
        .app_data(web::Data::new(AuthSettings {
            jwt_secret: JWT_SECRET.to_string(),
            token_lifetime_hours: 1,
            password_cost: 4,
        }))
        .app_data(routes::json_config())
        .app_data(routes::path_config())
        .app_data(routes::query_config())
        .wrap(
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600),
        )
        .wrap(Logger::default())
        .service(health::health)
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware::new(JWT_SECRET))
                .configure(routes::config),
        )
}

/// Inserts an account straight into the store, the only way to get a superuser.
pub async fn seed_user(store: &MemoryStore, username: &str, is_superuser: bool) -> TestUser {
    let user = store
        .create_user(NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "not-a-real-hash".to_string(),
            is_superuser,
        })
        .await
        .expect("Failed to seed user");
    let token = generate_token(user.id, JWT_SECRET, 1).expect("Failed to mint token");
    TestUser { user, token }
}

/// Sends `req` and returns the status with the parsed JSON body (`Null` when empty).
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: actix_http::Request,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!(
            "Response body is not JSON ({}): {}",
            e,
            String::from_utf8_lossy(&bytes)
        )
    });
    (status, body)
}
