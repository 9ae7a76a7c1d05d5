//! Student storage.

use schoolbook_authz::ScopeFilter;
use schoolbook_core::StudentId;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

#[derive(FromRow)]
struct StudentRow {
    id: i64,
    first_name: String,
    last_name: String,
    class: String,
    parent_email: Option<String>,
}

impl From<StudentRow> for StudentRecord {
    fn from(row: StudentRow) -> Self {
        Self {
            id: StudentId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            class: row.class,
            parent_email: row.parent_email,
        }
    }
}

/// A student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRecord {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub class: String,
    pub parent_email: Option<String>,
}

/// Editable student fields, for create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentFields {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub parent_email: Option<String>,
}

impl StudentFields {
    /// Returns the first missing required field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("class", &self.class),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Repository for student operations.
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    /// Creates a new student repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists the students visible through `scope`, ordered by class and name.
    ///
    /// A restricted scope is pushed into the query, so rows outside it are
    /// never read.
    #[instrument(skip(self, scope), fields(unrestricted = scope.is_unrestricted()))]
    pub async fn list(&self, scope: &ScopeFilter) -> Result<Vec<StudentRecord>, sqlx::Error> {
        let rows: Vec<StudentRow> = match scope.student_ids() {
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, first_name, last_name, class, parent_email
                    FROM students
                    ORDER BY class, last_name, first_name
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
            Some(ids) if ids.is_empty() => Vec::new(),
            Some(ids) => {
                sqlx::query_as(
                    r#"
                    SELECT id, first_name, last_name, class, parent_email
                    FROM students
                    WHERE id = ANY($1)
                    ORDER BY class, last_name, first_name
                    "#,
                )
                .bind(ids)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(StudentRecord::from).collect())
    }

    /// Finds a student by ID.
    #[instrument(skip(self))]
    pub async fn find(&self, id: StudentId) -> Result<Option<StudentRecord>, sqlx::Error> {
        let row: Option<StudentRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, class, parent_email
            FROM students
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StudentRecord::from))
    }

    /// Creates a student.
    #[instrument(skip(self, fields))]
    pub async fn create(&self, fields: &StudentFields) -> Result<StudentRecord, sqlx::Error> {
        let row: StudentRow = sqlx::query_as(
            r#"
            INSERT INTO students (first_name, last_name, class, parent_email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, class, parent_email
            "#,
        )
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.class)
        .bind(&fields.parent_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replaces a student's fields. Returns `None` if the student does not exist.
    #[instrument(skip(self, fields))]
    pub async fn update(
        &self,
        id: StudentId,
        fields: &StudentFields,
    ) -> Result<Option<StudentRecord>, sqlx::Error> {
        let row: Option<StudentRow> = sqlx::query_as(
            r#"
            UPDATE students
            SET first_name = $2, last_name = $3, class = $4, parent_email = $5
            WHERE id = $1
            RETURNING id, first_name, last_name, class, parent_email
            "#,
        )
        .bind(id.get())
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.class)
        .bind(&fields.parent_email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StudentRecord::from))
    }

    /// Deletes a student and, by cascade, their grades and family links.
    ///
    /// Returns false if the student did not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: StudentId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(first: &str, last: &str, class: &str) -> StudentFields {
        StudentFields {
            first_name: first.to_string(),
            last_name: last.to_string(),
            class: class.to_string(),
            parent_email: None,
        }
    }

    #[test]
    fn missing_field_reports_first_blank() {
        assert_eq!(fields("Anna", "Rossi", "3A").missing_field(), None);
        assert_eq!(fields("", "Rossi", "3A").missing_field(), Some("first_name"));
        assert_eq!(fields("Anna", "Rossi", "  ").missing_field(), Some("class"));
    }

    #[test]
    fn record_serializes_plain_id() {
        let record = StudentRecord {
            id: StudentId::new(12),
            first_name: "Anna".into(),
            last_name: "Rossi".into(),
            class: "3A".into(),
            parent_email: Some("rossi@example.com".into()),
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["id"], 12);
        assert_eq!(json["class"], "3A");
    }
}
