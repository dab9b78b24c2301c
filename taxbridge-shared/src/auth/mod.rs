//! Authentication: session tokens, password hashing and the request
//! auth context injected by the API's JWT middleware.

pub mod jwt;
pub mod middleware;
pub mod password;

pub use middleware::AuthContext;
