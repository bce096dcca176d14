use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthService, CredentialHasher, TokenIssuer};
use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::middleware::RequestLogger;
use crate::routes::{health_check, login, me, register, root};
use crate::store::JsonFileUserStore;

/// Wire the auth service from settings: file-backed store, bcrypt hasher
/// with the configured cost, and an HMAC token issuer.
pub fn build_auth_service(settings: &Settings) -> Result<AuthService, AppError> {
    let store = JsonFileUserStore::new(settings.storage.users_file.clone());
    let hasher = CredentialHasher::new(settings.password.bcrypt_cost);
    let issuer = TokenIssuer::from_settings(&settings.jwt)?;

    tracing::info!(
        users_file = %settings.storage.users_file.display(),
        bcrypt_cost = settings.password.bcrypt_cost,
        "Auth service initialised"
    );

    Ok(AuthService::new(Arc::new(store), hasher, issuer))
}

pub fn run(
    listener: TcpListener,
    auth_service: Arc<AuthService>,
    settings: &Settings,
) -> Result<Server, std::io::Error> {
    let auth_service = web::Data::from(auth_service);
    let application = web::Data::new(settings.application.clone());
    let password_rules = web::Data::new(settings.password.clone());

    let server = HttpServer::new(move || {
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            AppError::from(ValidationError::MalformedBody(err.to_string())).into()
        });

        App::new()
            .wrap(RequestLogger)
            .app_data(json_config)
            .app_data(auth_service.clone())
            .app_data(application.clone())
            .app_data(password_rules.clone())
            .route("/", web::get().to(root))
            .route("/health", web::get().to(health_check))
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
