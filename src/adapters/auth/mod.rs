//! Authentication adapters.
//!
//! - `JwtSessionValidator` - HS256 tokens signed with a shared secret
//! - `MockSessionValidator` - Token map for tests

mod jwt;
mod mock;

pub use jwt::{JwtClaims, JwtConfig, JwtSessionValidator};
pub use mock::MockSessionValidator;
