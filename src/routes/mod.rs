mod auth;
mod health_check;

pub use auth::{login, me, register, LoginRequest, RegisterRequest};
pub use health_check::{health_check, root};
