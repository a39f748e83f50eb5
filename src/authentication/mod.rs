mod middleware;
mod token;

pub use middleware::{UserId, reject_anonymous_users};
pub use token::{AuthError, JwtSecret, decode_token, encode_token};
