//! Session authentication
//!
//! Login issues an HS256 JWT whose subject is the account id; the
//! middleware verifies it on protected routes.

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, JwtService};
pub use middleware::{AuthenticatedAccount, jwt_auth_middleware};
