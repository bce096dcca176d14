/// Authentication module
///
/// Password hashing, bearer token issuance/verification, and the service
/// that ties them to the user store.

mod claims;
mod jwt;
mod password;
mod service;

pub use claims::Claims;
pub use jwt::{TokenError, TokenIssuer};
pub use password::{
    truncate_password, CredentialHasher, BCRYPT_MAX_PASSWORD_BYTES, MAX_BCRYPT_COST,
    MIN_BCRYPT_COST,
};
pub use service::{AuthService, TokenResponse};
