//! Database repositories for schoolbook.
//!
//! This module provides data access for:
//! - Accounts and their password hashes
//! - Students, grades and announcements
//! - Family links, which also back the policy engine's link lookup
//! - First-run seeding

pub mod announcements;
pub mod family_links;
pub mod grades;
pub mod seed;
pub mod students;
pub mod users;

pub use announcements::{AnnouncementRecord, AnnouncementRepository, NewAnnouncement};
pub use family_links::FamilyLinkRepository;
pub use grades::{GradeRecord, GradeRepository, NewGrade, SubjectAverage};
pub use seed::{SeedError, SeedOutcome, seed_if_empty};
pub use students::{StudentFields, StudentRecord, StudentRepository};
pub use users::{NewUser, UserCredentials, UserRecord, UserRepository};
