use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    entities::project::{Project, ProjectPage, ProjectPatch, ProjectRecord},
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

/// Document store for projects.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    /// All projects, newest `created_at` first.
    async fn list_projects(&self) -> Result<Vec<Project>, AppError>;
    async fn get_project(&self, id: &Uuid) -> Result<Option<Project>, AppError>;
    async fn create_project(&self, record: &ProjectRecord) -> Result<Uuid, AppError>;
    async fn update_project(&self, id: &Uuid, patch: &ProjectPatch) -> Result<(), AppError>;
    async fn delete_project(&self, id: &Uuid) -> Result<(), AppError>;
}

#[async_trait]
impl<T: ProjectRepository + ?Sized> ProjectRepository for Arc<T> {
    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        (**self).list_projects().await
    }

    async fn get_project(&self, id: &Uuid) -> Result<Option<Project>, AppError> {
        (**self).get_project(id).await
    }

    async fn create_project(&self, record: &ProjectRecord) -> Result<Uuid, AppError> {
        (**self).create_project(record).await
    }

    async fn update_project(&self, id: &Uuid, patch: &ProjectPatch) -> Result<(), AppError> {
        (**self).update_project(id, patch).await
    }

    async fn delete_project(&self, id: &Uuid) -> Result<(), AppError> {
        (**self).delete_project(id).await
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    title: String,
    description: String,
    date: NaiveDate,
    technologies: Vec<String>,
    link: Option<String>,
    image_url: Option<String>,
    pages: Json<Vec<ProjectPage>>,
    created_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            title: row.title,
            description: row.description,
            date: row.date,
            technologies: row.technologies,
            link: row.link,
            image_url: row.image_url,
            pages: row.pages.0,
            created_at: row.created_at,
        }
    }
}

const SELECT_PROJECT: &str = r#"
    SELECT id, title, description, date, technologies, link, image_url, pages, created_at
    FROM projects
"#;

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "{SELECT_PROJECT} ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn get_project(&self, id: &Uuid) -> Result<Option<Project>, AppError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!("{SELECT_PROJECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Project::from))
    }

    async fn create_project(&self, record: &ProjectRecord) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO projects (
                title, description, date, technologies, link, image_url, pages, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING id
            "#,
        )
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.date)
        .bind(&record.technologies)
        .bind(&record.link)
        .bind(&record.image_url)
        .bind(Json(&record.pages))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_project(&self, id: &Uuid, patch: &ProjectPatch) -> Result<(), AppError> {
        // COALESCE keeps stored values for untouched fields; the flags
        // distinguish "unchanged" from "set to null" for nullable columns.
        let result = sqlx::query(
            r#"
            UPDATE projects SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                date = COALESCE($3, date),
                technologies = COALESCE($4, technologies),
                link = CASE WHEN $5 THEN link ELSE $6 END,
                image_url = CASE WHEN $7 THEN image_url ELSE $8 END,
                pages = COALESCE($9, pages)
            WHERE id = $10
            "#,
        )
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.date)
        .bind(&patch.technologies)
        .bind(patch.link.is_unchanged())
        .bind(patch.link.flatten_str())
        .bind(patch.image_url.is_unchanged())
        .bind(patch.image_url.flatten_str())
        .bind(patch.pages.as_ref().map(Json))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Project not found".to_string()));
        }

        Ok(())
    }

    async fn delete_project(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Project not found".to_string()));
        }

        Ok(())
    }
}
