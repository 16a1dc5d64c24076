use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use crate::log_db_operation;
use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Each in-memory connection is its own database, so keep exactly one alive
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        let db = Database { pool };
        db.migrate().await?;
        log_db_operation!(info, "migrate", "database initialized");
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                interest TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS quizzes (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                score TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS roadmaps (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                email TEXT NOT NULL,
                name TEXT NOT NULL,
                icon TEXT NOT NULL,
                color TEXT NOT NULL,
                progress INTEGER NOT NULL DEFAULT 0,
                completed INTEGER NOT NULL DEFAULT 0,
                lessons INTEGER NOT NULL DEFAULT 0,
                description TEXT NOT NULL,
                sections TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS problems (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL CHECK (length(trim(title)) > 0),
                difficulty TEXT NOT NULL,
                solved INTEGER NOT NULL DEFAULT 0,
                category TEXT NOT NULL,
                solution TEXT NOT NULL,
                examples TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // User operations
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        interest: Option<&str>,
    ) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            interest: interest.map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, interest, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.interest)
        .bind(timestamp(&user.created_at))
        .execute(&self.pool)
        .await?;

        log_db_operation!(debug, "create_user", id = user.id);
        Ok(user)
    }

    // Quiz operations
    pub async fn create_quiz_record(&self, user_id: Uuid, title: &str, score: &str) -> Result<QuizRecord> {
        let record = QuizRecord {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            score: score.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO quizzes (id, user_id, title, score, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(&record.title)
        .bind(&record.score)
        .bind(timestamp(&record.created_at))
        .execute(&self.pool)
        .await?;

        log_db_operation!(debug, "create_quiz_record", id = record.id);
        Ok(record)
    }

    pub async fn list_quiz_records_by_user(&self, user_id: Uuid) -> Result<Vec<QuizRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM quizzes WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let records = rows.iter().map(row_to_quiz_record).collect::<Result<Vec<_>>>()?;
        log_db_operation!(debug, "list_quiz_records_by_user", count = records.len());
        Ok(records)
    }

    // Roadmap operations
    pub async fn create_roadmap_record(&self, user: &User, plan: &RoadmapPlan) -> Result<Roadmap> {
        let roadmap = Roadmap {
            id: Uuid::new_v4(),
            user_id: user.id,
            email: user.email.clone(),
            name: plan.name.clone(),
            icon: plan.icon.clone(),
            color: plan.color.clone(),
            progress: 0,
            completed: 0,
            lessons: plan.lesson_count,
            description: plan.description.clone(),
            roadmap: plan.sections.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO roadmaps (id, user_id, email, name, icon, color, progress, completed,
                                  lessons, description, sections, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(roadmap.id.to_string())
        .bind(roadmap.user_id.to_string())
        .bind(&roadmap.email)
        .bind(&roadmap.name)
        .bind(&roadmap.icon)
        .bind(&roadmap.color)
        .bind(i64::from(roadmap.progress))
        .bind(i64::from(roadmap.completed))
        .bind(i64::from(roadmap.lessons))
        .bind(&roadmap.description)
        .bind(serde_json::to_string(&roadmap.roadmap)?)
        .bind(timestamp(&roadmap.created_at))
        .execute(&self.pool)
        .await?;

        log_db_operation!(debug, "create_roadmap_record", id = roadmap.id);
        Ok(roadmap)
    }

    pub async fn get_roadmap_by_id(&self, id: Uuid) -> Result<Option<Roadmap>> {
        let row = sqlx::query("SELECT * FROM roadmaps WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row_to_roadmap(&row)).transpose()
    }

    pub async fn list_roadmaps_by_user(&self, user_id: Uuid) -> Result<Vec<Roadmap>> {
        let rows = sqlx::query(
            "SELECT * FROM roadmaps WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let roadmaps = rows.iter().map(row_to_roadmap).collect::<Result<Vec<_>>>()?;
        log_db_operation!(debug, "list_roadmaps_by_user", count = roadmaps.len());
        Ok(roadmaps)
    }

    pub async fn update_roadmap_record(&self, roadmap: &Roadmap) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE roadmaps
            SET progress = ?1, completed = ?2, lessons = ?3, sections = ?4
            WHERE id = ?5
            "#,
        )
        .bind(i64::from(roadmap.progress))
        .bind(i64::from(roadmap.completed))
        .bind(i64::from(roadmap.lessons))
        .bind(serde_json::to_string(&roadmap.roadmap)?)
        .bind(roadmap.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Roadmap '{}' not found", roadmap.id));
        }

        Ok(())
    }

    // Problem operations
    pub async fn create_problem_record(&self, user_id: Uuid, draft: &ProblemDraft) -> Result<Problem> {
        self.create_problem_records(user_id, std::slice::from_ref(draft))
            .await?
            .pop()
            .context("Problem insert returned no record")
    }

    /// Inserts a whole problem set in one transaction; nothing is stored if any insert fails
    pub async fn create_problem_records(
        &self,
        user_id: Uuid,
        drafts: &[ProblemDraft],
    ) -> Result<Vec<Problem>> {
        let mut tx = self.pool.begin().await?;
        let mut problems = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let problem = Problem {
                id: Uuid::new_v4(),
                user_id,
                title: draft.title.clone(),
                difficulty: draft.difficulty,
                solved: false,
                category: draft.category.clone(),
                solution: draft.solution.clone(),
                examples: draft.examples.clone(),
                created_at: Utc::now(),
            };

            sqlx::query(
                r#"
                INSERT INTO problems (id, user_id, title, difficulty, solved, category, solution,
                                      examples, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(problem.id.to_string())
            .bind(problem.user_id.to_string())
            .bind(&problem.title)
            .bind(problem.difficulty.as_str())
            .bind(problem.solved)
            .bind(&problem.category)
            .bind(&problem.solution)
            .bind(serde_json::to_string(&problem.examples)?)
            .bind(timestamp(&problem.created_at))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert problem '{}'", problem.title))?;

            problems.push(problem);
        }

        tx.commit().await?;
        log_db_operation!(debug, "create_problem_records", count = problems.len());
        Ok(problems)
    }

    pub async fn list_problems_by_user(&self, user_id: Uuid) -> Result<Vec<Problem>> {
        let rows = sqlx::query(
            "SELECT * FROM problems WHERE user_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let problems = rows.iter().map(row_to_problem).collect::<Result<Vec<_>>>()?;
        log_db_operation!(debug, "list_problems_by_user", count = problems.len());
        Ok(problems)
    }

    /// Only returns the problem when it belongs to `user_id`
    pub async fn get_problem_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Problem>> {
        let row = sqlx::query("SELECT * FROM problems WHERE id = ?1 AND user_id = ?2")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row_to_problem(&row)).transpose()
    }

    pub async fn update_problem_record(&self, problem: &Problem) -> Result<()> {
        let result = sqlx::query("UPDATE problems SET solved = ?1 WHERE id = ?2")
            .bind(problem.solved)
            .bind(problem.id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Problem '{}' not found", problem.id));
        }

        Ok(())
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let raw: String = row.try_get(column)?;
    Ok(DateTime::parse_from_rfc3339(&raw)
        .with_context(|| format!("Invalid timestamp in column '{}'", column))?
        .with_timezone(&Utc))
}

fn parse_uuid(row: &SqliteRow, column: &str) -> Result<Uuid> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw).with_context(|| format!("Invalid UUID in column '{}'", column))
}

fn parse_count(row: &SqliteRow, column: &str) -> Result<u32> {
    let raw: i64 = row.try_get(column)?;
    u32::try_from(raw).with_context(|| format!("Negative count in column '{}'", column))
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: parse_uuid(row, "id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        interest: row.try_get("interest")?,
        created_at: parse_timestamp(row, "created_at")?,
    })
}

fn row_to_quiz_record(row: &SqliteRow) -> Result<QuizRecord> {
    Ok(QuizRecord {
        id: parse_uuid(row, "id")?,
        user_id: parse_uuid(row, "user_id")?,
        title: row.try_get("title")?,
        score: row.try_get("score")?,
        created_at: parse_timestamp(row, "created_at")?,
    })
}

fn row_to_roadmap(row: &SqliteRow) -> Result<Roadmap> {
    let sections: String = row.try_get("sections")?;

    Ok(Roadmap {
        id: parse_uuid(row, "id")?,
        user_id: parse_uuid(row, "user_id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        icon: row.try_get("icon")?,
        color: row.try_get("color")?,
        progress: parse_count(row, "progress")?,
        completed: parse_count(row, "completed")?,
        lessons: parse_count(row, "lessons")?,
        description: row.try_get("description")?,
        roadmap: serde_json::from_str(&sections).context("Invalid roadmap sections JSON")?,
        created_at: parse_timestamp(row, "created_at")?,
    })
}

fn row_to_problem(row: &SqliteRow) -> Result<Problem> {
    let difficulty: String = row.try_get("difficulty")?;
    let examples: String = row.try_get("examples")?;

    Ok(Problem {
        id: parse_uuid(row, "id")?,
        user_id: parse_uuid(row, "user_id")?,
        title: row.try_get("title")?,
        difficulty: difficulty.parse()?,
        solved: row.try_get("solved")?,
        category: row.try_get("category")?,
        solution: row.try_get("solution")?,
        examples: serde_json::from_str(&examples).context("Invalid problem examples JSON")?,
        created_at: parse_timestamp(row, "created_at")?,
    })
}
