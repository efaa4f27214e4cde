// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod comment_repository;
pub mod review_repository;
pub mod taxonomy_repository;
pub mod title_repository;
pub mod user_repository;

pub use comment_repository::*;
pub use review_repository::*;
pub use taxonomy_repository::*;
pub use title_repository::*;
pub use user_repository::*;
