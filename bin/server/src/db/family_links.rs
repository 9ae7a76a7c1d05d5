//! Family link storage, also the policy engine's link store.

use async_trait::async_trait;
use rootcause::prelude::Report;
use schoolbook_authz::{AuthzError, FamilyLink, LinkStore};
use schoolbook_core::{StudentId, UserId};
use sqlx::{FromRow, PgPool};
use std::collections::BTreeSet;
use tracing::instrument;

#[derive(FromRow)]
struct FamilyLinkRow {
    user_id: i64,
    student_id: i64,
    relation: String,
}

impl From<FamilyLinkRow> for FamilyLink {
    fn from(row: FamilyLinkRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            student_id: StudentId::new(row.student_id),
            relation: row.relation,
        }
    }
}

/// Repository for family link operations.
#[derive(Clone)]
pub struct FamilyLinkRepository {
    pool: PgPool,
}

impl FamilyLinkRepository {
    /// Creates a new family link repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists every link.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<FamilyLink>, sqlx::Error> {
        let rows: Vec<FamilyLinkRow> = sqlx::query_as(
            r#"
            SELECT user_id, student_id, relation
            FROM family_links
            ORDER BY user_id, student_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FamilyLink::from).collect())
    }

    /// Creates a link, or updates the relation of an existing one.
    #[instrument(skip(self, link), fields(user_id = %link.user_id, student_id = %link.student_id))]
    pub async fn upsert(&self, link: &FamilyLink) -> Result<FamilyLink, sqlx::Error> {
        let row: FamilyLinkRow = sqlx::query_as(
            r#"
            INSERT INTO family_links (user_id, student_id, relation)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, student_id) DO UPDATE SET relation = EXCLUDED.relation
            RETURNING user_id, student_id, relation
            "#,
        )
        .bind(link.user_id.get())
        .bind(link.student_id.get())
        .bind(&link.relation)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Removes a link. Returns false if it did not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: UserId, student_id: StudentId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM family_links WHERE user_id = $1 AND student_id = $2")
            .bind(user_id.get())
            .bind(student_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LinkStore for FamilyLinkRepository {
    #[instrument(skip(self))]
    async fn list_linked_students(
        &self,
        user_id: UserId,
    ) -> Result<BTreeSet<StudentId>, Report<AuthzError>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT student_id FROM family_links WHERE user_id = $1")
                .bind(user_id.get())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AuthzError::StorageUnavailable {
                    details: e.to_string(),
                })?;

        Ok(ids.into_iter().map(StudentId::new).collect())
    }
}
