/// Middleware module
///
/// Bearer token extraction and request logging for the HTTP layer.

mod bearer;
mod request_logger;

pub use bearer::BearerToken;
pub use request_logger::RequestLogger;
