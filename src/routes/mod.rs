pub mod auth;
pub mod groups;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::error::AppError;

/// Mounts every `/api` resource. Literal segments (`completed/`, `pending/`, `me/`) are
/// registered before `{id}/` so they are not swallowed by the id pattern.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::list_completed)
            .service(tasks::list_pending)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::partial_update_task)
            .service(tasks::delete_task)
            .service(tasks::toggle_completed),
    )
    .service(
        web::scope("/groups")
            .service(groups::list_groups)
            .service(groups::create_group)
            .service(groups::get_group)
            .service(groups::update_group)
            .service(groups::partial_update_group)
            .service(groups::delete_group)
            .service(groups::group_tasks),
    )
    .service(
        web::scope("/users")
            .service(users::list_users)
            .service(users::create_user)
            .route("/me/", web::get().to(users::current_user))
            .route("/profile/", web::get().to(users::current_user)),
    );
}

/// Renders malformed JSON bodies as `{"error": ...}` 400s, like every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// An id segment that does not parse names no resource: 404.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::NotFound(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}
