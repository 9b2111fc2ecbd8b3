//! SQLite storage backend (embedded, no external dependencies)

use anyhow::{Context, Result};
use async_trait::async_trait;
use gradebook_types::{Student, StudentPayload};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::sync::Arc;

use super::{StoreError, StudentStore};

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;

            // Check if directory is writable
            let test_file = parent.join(".write_test");
            match tokio::fs::write(&test_file, b"test").await {
                Ok(_) => {
                    let _ = tokio::fs::remove_file(&test_file).await;
                }
                Err(e) => {
                    return Err(anyhow::anyhow!(
                        "Database directory is not writable: {}: {}",
                        parent.display(),
                        e
                    ));
                }
            }
        }

        // Use SqliteConnectOptions for better control
        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Private single-connection database for contract tests. A shared pool
    /// would give each connection its own `:memory:` database.
    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::run_migrations(&pool).await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        // Students table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS students (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                age INTEGER NOT NULL,
                course TEXT NOT NULL,
                score REAL NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn fetch(&self, id: i64) -> Result<Student, StoreError> {
        let row: Option<StudentRow> = sqlx::query_as(
            r#"
            SELECT id, name, age, course, score FROM students WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        row.map(Into::into).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl StudentStore for Database {
    async fn create(&self, payload: StudentPayload) -> Result<Student, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO students (name, age, course, score)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&payload.name)
        .bind(payload.age)
        .bind(&payload.course)
        .bind(payload.score)
        .execute(&*self.pool)
        .await?;

        // Read back the materialized row; SQLite does not return it from
        // the insert itself.
        self.fetch(result.last_insert_rowid()).await
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        let rows: Vec<StudentRow> = sqlx::query_as(
            r#"
            SELECT id, name, age, course, score FROM students ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: i64) -> Result<Student, StoreError> {
        self.fetch(id).await
    }

    async fn update(&self, id: i64, payload: StudentPayload) -> Result<Student, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE students SET name = ?1, age = ?2, course = ?3, score = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&payload.name)
        .bind(payload.age)
        .bind(&payload.course)
        .bind(payload.score)
        .bind(id)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        self.fetch(id).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM students WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn topper(&self) -> Result<Student, StoreError> {
        let row: Option<StudentRow> = sqlx::query_as(
            r#"
            SELECT id, name, age, course, score FROM students
            ORDER BY score DESC, id ASC LIMIT 1
            "#,
        )
        .fetch_optional(&*self.pool)
        .await?;

        row.map(Into::into).ok_or(StoreError::Empty)
    }
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct StudentRow {
    id: i64,
    name: String,
    age: i32,
    course: String,
    score: f64,
}

impl From<StudentRow> for Student {
    fn from(r: StudentRow) -> Self {
        Student {
            id: r.id,
            name: r.name,
            age: r.age,
            course: r.course,
            score: r.score,
        }
    }
}
