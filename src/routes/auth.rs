/// Authentication Routes
///
/// Handles user registration, login, and current user information.
/// bcrypt and user file work runs on the blocking pool, off the workers.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::AuthService;
use crate::configuration::PasswordSettings;
use crate::error::AppError;
use crate::middleware::BearerToken;
use crate::store::UserPublic;
use crate::validators::{validate_email, validate_full_name, validate_password};

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}

/// POST /register
///
/// Create an account and return its public view.
///
/// # Errors
/// - 409: Email already registered
/// - 422: Invalid email, password length, or name
/// - 500: Store failure
pub async fn register(
    form: web::Json<RegisterRequest>,
    service: web::Data<AuthService>,
    password_rules: web::Data<PasswordSettings>,
) -> Result<HttpResponse, AppError> {
    let RegisterRequest {
        email,
        password,
        full_name,
    } = form.into_inner();

    let email = validate_email(&email)?;
    validate_password(&password, password_rules.get_ref())?;
    let full_name = validate_full_name(full_name.as_deref())?;

    let user = run_blocking(move || {
        service.register_user(&email, &password, full_name.as_deref())
    })
    .await?;

    Ok(HttpResponse::Created().json(user))
}

/// POST /login
///
/// Exchange credentials for a bearer token.
///
/// # Errors
/// - 401: Unknown email or wrong password, reported identically
/// - 422: Malformed email
pub async fn login(
    form: web::Json<LoginRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { email, password } = form.into_inner();
    let email = validate_email(&email)?;

    let token = run_blocking(move || service.authenticate_user(&email, &password)).await?;

    Ok(HttpResponse::Ok().json(token))
}

/// GET /me
///
/// Return the user the bearer token was issued for.
///
/// # Errors
/// - 401: Missing, malformed, expired or forged token
/// - 404: Token subject no longer exists
pub async fn me(
    token: BearerToken,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let user = run_blocking(move || service.resolve_user_from_token(token.as_str())).await?;

    tracing::debug!(email = %user.email, "Current user resolved");
    Ok(HttpResponse::Ok().json(UserPublic::from(user)))
}
