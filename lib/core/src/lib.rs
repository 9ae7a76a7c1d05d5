//! Core domain types and utilities for the schoolbook backend.
//!
//! This crate provides the foundational types, error handling, and shared
//! identifiers used by the identity, authorization, and server crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{AnnouncementId, GradeId, ParseIdError, StudentId, UserId};
