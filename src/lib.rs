// src/lib.rs
// DOCUMENTATION: Library root shared by the server and the helper binaries
// PURPOSE: Expose modules to src/main.rs, load-data and deploy-check

pub mod auth;
pub mod config;
pub mod db;
pub mod deploy;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
