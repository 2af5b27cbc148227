use crate::{
    auth::{verify_password, AuthResponse, AuthSettings, LoginRequest, RegisterRequest},
    error::AppError,
    models::{NewUser, User},
    store::Store,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Validates the payload and creates a regular (non-superuser) account.
pub(crate) async fn create_account(
    store: &dyn Store,
    settings: &AuthSettings,
    request: RegisterRequest,
) -> Result<User, AppError> {
    request.validate()?;

    if store.find_credentials(&request.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = settings.hash_password(&request.password)?;
    let user = store
        .create_user(NewUser::regular(request.username, request.email, password_hash))
        .await?;
    log::info!("registered user {} ({})", user.id, user.username);
    Ok(user)
}

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
#[post("/register")]
pub async fn register(
    store: web::Data<dyn Store>,
    settings: web::Data<AuthSettings>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = create_account(store.get_ref(), &settings, register_data.into_inner()).await?;
    let token = settings.issue_token(user.id)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

/// Login user
///
/// Authenticates a user and returns an authentication token.
#[post("/login")]
pub async fn login(
    store: web::Data<dyn Store>,
    settings: web::Data<AuthSettings>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let Some(credentials) = store.find_credentials(&login_data.email).await? else {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };
    if !verify_password(&login_data.password, &credentials.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = settings.issue_token(credentials.id)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: credentials.id,
    }))
}
