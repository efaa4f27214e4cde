// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod category;
pub mod comment;
pub mod pagination;
pub mod review;
pub mod title;
pub mod user;

pub use category::*;
pub use comment::*;
pub use pagination::*;
pub use review::*;
pub use title::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// PATCH field that can be cleared: absent → `None`, `null` → `Some(None)`
/// Use with `#[serde(default, deserialize_with = "nullable")]`
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
