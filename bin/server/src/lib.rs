//! schoolbook REST API server.
//!
//! This crate wires the identity resolver and the access policy engine into
//! an Axum JSON API backed by PostgreSQL, and serves the front-end's static
//! files for every path outside `/api`.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod mail;
