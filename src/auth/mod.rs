// src/auth/mod.rs
// DOCUMENTATION: Authentication and authorization
// PURPOSE: Token issuing, request extractors and permission rules

pub mod extractor;
pub mod jwt;
pub mod permissions;

pub use extractor::{AuthUser, OptionalUser};
pub use jwt::{generate_access_token, validate_token, Claims};
pub use permissions::{is_safe_method, Permission};
