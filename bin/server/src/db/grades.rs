//! Grade storage and per-student statistics.

use chrono::NaiveDate;
use schoolbook_core::{GradeId, StudentId};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

#[derive(FromRow)]
struct GradeRow {
    id: i64,
    student_id: i64,
    subject: String,
    score: f64,
    date: NaiveDate,
}

impl From<GradeRow> for GradeRecord {
    fn from(row: GradeRow) -> Self {
        Self {
            id: GradeId::new(row.id),
            student_id: StudentId::new(row.student_id),
            subject: row.subject,
            score: row.score,
            date: row.date,
        }
    }
}

/// A single grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeRecord {
    pub id: GradeId,
    pub student_id: StudentId,
    pub subject: String,
    pub score: f64,
    pub date: NaiveDate,
}

/// Fields for a new grade. The date defaults to today.
#[derive(Debug, Clone, Deserialize)]
pub struct NewGrade {
    #[serde(default)]
    pub subject: String,
    pub score: f64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Average score for one subject, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SubjectAverage {
    pub subject: String,
    pub avg: f64,
    pub count: i64,
}

/// Repository for grade operations.
pub struct GradeRepository {
    pool: PgPool,
}

impl GradeRepository {
    /// Creates a new grade repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists a student's grades, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<GradeRecord>, sqlx::Error> {
        let rows: Vec<GradeRow> = sqlx::query_as(
            r#"
            SELECT id, student_id, subject, score, date
            FROM grades
            WHERE student_id = $1
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(student_id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GradeRecord::from).collect())
    }

    /// Adds a grade. Returns `None` if the student does not exist.
    #[instrument(skip(self, grade))]
    pub async fn create(
        &self,
        student_id: StudentId,
        grade: &NewGrade,
    ) -> Result<Option<GradeRecord>, sqlx::Error> {
        let row: Option<GradeRow> = sqlx::query_as(
            r#"
            INSERT INTO grades (student_id, subject, score, date)
            SELECT $1, $2, $3, COALESCE($4, CURRENT_DATE)
            WHERE EXISTS (SELECT 1 FROM students WHERE id = $1)
            RETURNING id, student_id, subject, score, date
            "#,
        )
        .bind(student_id.get())
        .bind(&grade.subject)
        .bind(grade.score)
        .bind(grade.date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GradeRecord::from))
    }

    /// Returns the student a grade belongs to.
    #[instrument(skip(self))]
    pub async fn find_owner(&self, id: GradeId) -> Result<Option<StudentId>, sqlx::Error> {
        let owner: Option<i64> = sqlx::query_scalar("SELECT student_id FROM grades WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner.map(StudentId::new))
    }

    /// Deletes a grade. Returns false if it did not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: GradeId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM grades WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Per-subject averages for a student.
    #[instrument(skip(self))]
    pub async fn subject_averages(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<SubjectAverage>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT subject,
                   ROUND(AVG(score)::numeric, 2)::float8 AS avg,
                   COUNT(*) AS count
            FROM grades
            WHERE student_id = $1
            GROUP BY subject
            ORDER BY subject
            "#,
        )
        .bind(student_id.get())
        .fetch_all(&self.pool)
        .await
    }

    /// Overall average for a student, or `None` without grades.
    #[instrument(skip(self))]
    pub async fn overall_average(&self, student_id: StudentId) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT ROUND(AVG(score)::numeric, 2)::float8 FROM grades WHERE student_id = $1",
        )
        .bind(student_id.get())
        .fetch_one(&self.pool)
        .await
    }
}
