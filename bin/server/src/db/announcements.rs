//! Announcement storage.

use chrono::{DateTime, Utc};
use schoolbook_core::AnnouncementId;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

#[derive(FromRow)]
struct AnnouncementRow {
    id: i64,
    title: String,
    text: String,
    class: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AnnouncementRow> for AnnouncementRecord {
    fn from(row: AnnouncementRow) -> Self {
        Self {
            id: AnnouncementId::new(row.id),
            title: row.title,
            text: row.text,
            class: row.class,
            created_at: row.created_at,
        }
    }
}

/// A school announcement, optionally addressed to one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnouncementRecord {
    pub id: AnnouncementId,
    pub title: String,
    pub text: String,
    pub class: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new announcement.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAnnouncement {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub class: Option<String>,
}

/// Repository for announcement operations.
pub struct AnnouncementRepository {
    pool: PgPool,
}

impl AnnouncementRepository {
    /// Creates a new announcement repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists announcements, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<AnnouncementRecord>, sqlx::Error> {
        let rows: Vec<AnnouncementRow> = sqlx::query_as(
            r#"
            SELECT id, title, text, class, created_at
            FROM announcements
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AnnouncementRecord::from).collect())
    }

    /// Publishes an announcement.
    #[instrument(skip(self, announcement))]
    pub async fn create(
        &self,
        announcement: &NewAnnouncement,
    ) -> Result<AnnouncementRecord, sqlx::Error> {
        let row: AnnouncementRow = sqlx::query_as(
            r#"
            INSERT INTO announcements (title, text, class)
            VALUES ($1, $2, $3)
            RETURNING id, title, text, class, created_at
            "#,
        )
        .bind(&announcement.title)
        .bind(&announcement.text)
        .bind(&announcement.class)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Deletes an announcement. Returns false if it did not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: AnnouncementId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
