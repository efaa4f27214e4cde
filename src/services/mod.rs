// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod catalog_service;
pub mod mailer;
pub mod rate_limiter;
pub mod review_service;
pub mod user_service;

pub use catalog_service::*;
pub use mailer::*;
pub use rate_limiter::*;
pub use review_service::*;
pub use user_service::*;
