use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    entities::{
        project::{Project, ProjectPatch, ProjectRecord},
        user::{User, UserInsert},
    },
    errors::AppError,
    repositories::{project::ProjectRepository, user::UserRepository},
};

/// Process-local project store for development and tests.
#[derive(Default)]
pub struct InMemoryProjectRepo {
    projects: DashMap<Uuid, (u64, Project)>,
    sequence: AtomicU64,
}

impl InMemoryProjectRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let mut entries: Vec<(u64, Project)> = self
            .projects
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        // Insertion sequence breaks timestamp ties
        entries.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });

        Ok(entries.into_iter().map(|(_, project)| project).collect())
    }

    async fn get_project(&self, id: &Uuid) -> Result<Option<Project>, AppError> {
        Ok(self.projects.get(id).map(|entry| entry.value().1.clone()))
    }

    async fn create_project(&self, record: &ProjectRecord) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let project = record.clone().into_project(id, Utc::now());

        self.projects.insert(id, (sequence, project));
        Ok(id)
    }

    async fn update_project(&self, id: &Uuid, patch: &ProjectPatch) -> Result<(), AppError> {
        let mut entry = self
            .projects
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        patch.apply_to(&mut entry.value_mut().1);
        Ok(())
    }

    async fn delete_project(&self, id: &Uuid) -> Result<(), AppError> {
        self.projects
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }
}

/// Process-local user store keyed by normalized email.
#[derive(Default)]
pub struct InMemoryUserRepo {
    users: DashMap<String, User>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepo {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .get(&email.trim().to_lowercase())
            .map(|entry| entry.value().clone()))
    }

    async fn create_user(&self, user: &UserInsert) -> Result<Uuid, AppError> {
        let email = user.email.trim().to_lowercase();
        if self.users.contains_key(&email) {
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }

        let id = Uuid::new_v4();
        self.users.insert(
            email.clone(),
            User {
                id,
                email,
                password_hash: user.password_hash.clone(),
                is_admin: user.is_admin,
                created_at: user.created_at,
            },
        );
        Ok(id)
    }
}
