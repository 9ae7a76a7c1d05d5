//! First-run seeding of an empty database.

use super::UserRepository;
use crate::config::BootstrapAdmin;
use rootcause::prelude::Report;
use schoolbook_platform_access::{Role, hash_password};
use sqlx::PgPool;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Seeding errors.
#[derive(Debug)]
pub enum SeedError {
    /// The seed file exists but could not be read.
    ReadFailed { path: PathBuf, reason: String },
    /// A statement failed.
    Database { details: String },
    /// The bootstrap password could not be hashed.
    HashFailed { reason: String },
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { path, reason } => {
                write!(f, "failed to read seed file '{}': {}", path.display(), reason)
            }
            Self::Database { details } => write!(f, "seed database error: {}", details),
            Self::HashFailed { reason } => write!(f, "failed to hash admin password: {}", reason),
        }
    }
}

impl std::error::Error for SeedError {}

/// What a seeding pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedOutcome {
    pub ran_seed_file: bool,
    pub created_admin: bool,
}

/// Reads a seed file, returning `None` if it does not exist.
pub fn read_seed_file(path: &Path) -> Result<Option<String>, Report<SeedError>> {
    match std::fs::read_to_string(path) {
        Ok(sql) => Ok(Some(sql)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SeedError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into()),
    }
}

/// Seeds the database when it has no accounts yet.
///
/// Runs the SQL file at `seed_path` if it exists, then creates the bootstrap
/// admin if one is configured and its username is still free.
#[instrument(skip(pool, admin))]
pub async fn seed_if_empty(
    pool: &PgPool,
    seed_path: Option<&Path>,
    admin: Option<&BootstrapAdmin>,
) -> Result<SeedOutcome, Report<SeedError>> {
    let users = UserRepository::new(pool.clone());
    let existing = users.count().await.map_err(db_error)?;
    if existing > 0 {
        info!(users = existing, "database already seeded");
        return Ok(SeedOutcome::default());
    }

    let mut outcome = SeedOutcome::default();

    if let Some(path) = seed_path {
        match read_seed_file(path)? {
            Some(sql) => {
                info!(path = %path.display(), "running seed SQL");
                sqlx::raw_sql(&sql).execute(pool).await.map_err(db_error)?;
                outcome.ran_seed_file = true;
            }
            None => warn!(path = %path.display(), "seed file missing"),
        }
    }

    if let Some(admin) = admin {
        let taken = users
            .find_by_username(&admin.username)
            .await
            .map_err(db_error)?
            .is_some();
        if !taken {
            let hash = hash_password(&admin.password).map_err(|e| SeedError::HashFailed {
                reason: e.to_string(),
            })?;
            users
                .create(&admin.username, &hash, Role::Admin, &admin.name)
                .await
                .map_err(db_error)?;
            info!(username = %admin.username, "created bootstrap admin");
            outcome.created_admin = true;
        }
    }

    Ok(outcome)
}

fn db_error(e: sqlx::Error) -> SeedError {
    SeedError::Database {
        details: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_seed_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("init.sql");
        assert_eq!(read_seed_file(&path).expect("read"), None);
    }

    #[test]
    fn seed_file_contents_are_returned() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "INSERT INTO students (first_name, last_name, class) VALUES ('Anna', 'Rossi', '3A');")
            .expect("write");

        let sql = read_seed_file(file.path()).expect("read").expect("present");
        assert!(sql.contains("INSERT INTO students"));
    }

    #[test]
    fn directory_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(read_seed_file(dir.path()).is_err());
    }
}
