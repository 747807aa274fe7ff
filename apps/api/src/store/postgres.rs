use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use tracing::info;
use uuid::Uuid;

use crate::models::analysis::{AnalysisRecord, ResumeRow};
use crate::models::user::User;
use crate::store::{AnalysisStore, UserStore};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_RESUME: &str = r#"
    INSERT INTO resumes
        (id, user_id, source_link, extracted_text, score, missing_keywords,
         suggested_jobs, readability_score, grammar_issues, ats_friendly,
         detailed_description, personal_info, education, experience, skills,
         section_wise_score, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
"#;

/// Binds every column of `INSERT_RESUME`, in order.
fn bind_record<'q>(
    query: Query<'q, Postgres, PgArguments>,
    record: &'q AnalysisRecord,
) -> Query<'q, Postgres, PgArguments> {
    let analysis = &record.analysis;
    query
        .bind(record.id)
        .bind(record.owner_id)
        .bind(&record.source_link)
        .bind(&record.extracted_text)
        .bind(analysis.score)
        .bind(analysis.missing_keywords.as_slice())
        .bind(analysis.suggested_jobs.as_slice())
        .bind(analysis.readability_score)
        .bind(&analysis.grammar_issues)
        .bind(analysis.ats_friendly.as_str())
        .bind(&analysis.detailed_description)
        .bind(Json(&analysis.personal_info))
        .bind(Json(&analysis.education))
        .bind(Json(&analysis.experience))
        .bind(Json(&analysis.skills))
        .bind(Json(&analysis.section_wise_score))
        .bind(record.created_at)
}

#[async_trait]
impl AnalysisStore for PgStore {
    async fn save(&self, record: &AnalysisRecord) -> Result<Uuid> {
        // Append-only INSERT; rows are never updated
        bind_record(sqlx::query(INSERT_RESUME), record)
            .execute(&self.pool)
            .await?;

        info!("Inserted resume analysis {} for user {}", record.id, record.owner_id);
        Ok(record.id)
    }

    async fn save_for_owner(&self, record: &AnalysisRecord) -> Result<Uuid> {
        // Record and owner link are written by a single statement
        let sql = format!(
            "WITH inserted AS ({INSERT_RESUME} RETURNING id, user_id) \
             INSERT INTO user_resumes (user_id, resume_id) SELECT user_id, id FROM inserted"
        );
        bind_record(sqlx::query(&sql), record)
            .execute(&self.pool)
            .await?;

        info!("Inserted resume analysis {} for user {}", record.id, record.owner_id);
        Ok(record.id)
    }

    async fn append_to_owner(&self, owner_id: Uuid, record_id: Uuid) -> Result<()> {
        sqlx::query("INSERT INTO user_resumes (user_id, resume_id) VALUES ($1, $2)")
            .bind(owner_id)
            .bind(record_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<AnalysisRecord>> {
        let rows = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(AnalysisRecord::from).collect())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<AnalysisRecord>> {
        let rows = sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT r.*
            FROM resumes r
            JOIN user_resumes ur ON ur.resume_id = r.id
            WHERE ur.user_id = $1
            ORDER BY ur.position ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AnalysisRecord::from).collect())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn ensure_user(&self, id: Uuid, email: &str) -> Result<User> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_name(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            "UPDATE users SET first_name = $2, last_name = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(&self.pool)
        .await?)
    }
}
