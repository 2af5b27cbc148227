use crate::{
    access::{Access, Action},
    auth::{AuthSettings, Identity, RegisterRequest},
    error::AppError,
    routes::auth::create_account,
    store::Store,
};
use actix_web::{get, post, web, HttpResponse, Responder};

/// Superusers get every account; everyone else gets a list holding only their own.
#[get("/")]
pub async fn list_users(
    store: web::Data<dyn Store>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::ListUsers).await?;
    let users = store.list_users(access.scope()?).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Creates an account. Open to anonymous callers; never creates a superuser.
#[post("/")]
pub async fn create_user(
    store: web::Data<dyn Store>,
    settings: web::Data<AuthSettings>,
    identity: Identity,
    user_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    Access::evaluate(store.get_ref(), &identity, Action::CreateUser).await?;
    let user = create_account(store.get_ref(), &settings, user_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// The caller's own account. Served at both `/me/` and `/profile/`.
pub async fn current_user(
    store: web::Data<dyn Store>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    let access = Access::evaluate(store.get_ref(), &identity, Action::CurrentUser).await?;
    let user_id = access.principal()?.user_id;
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(user))
}
