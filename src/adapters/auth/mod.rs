//! Authentication adapters.
//!
//! - `argon2_hasher` - Argon2id implementation of `PasswordHasher`
//! - `jwt_token_service` - HS256 implementation of `TokenService`

mod argon2_hasher;
mod jwt_token_service;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt_token_service::JwtTokenService;
