use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::project::{Project, ProjectCard},
    errors::AppError,
    repositories::{project::ProjectRepository, storage::ObjectStorage},
    use_cases::listing::ProjectListing,
    utils::valid_uuid::valid_uuid,
};

/// Issued by the first step of a deletion; must be presented to confirm it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionTicket {
    pub ticket: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub expires_in: u64,
}

struct PendingDeletion {
    project_id: Uuid,
    issued_at: Instant,
}

pub struct ProjectHandler<R, S>
where
    R: ProjectRepository,
    S: ObjectStorage,
{
    pub project_repo: R,
    pub storage: S,
    listing: Mutex<ProjectListing>,
    tickets: DashMap<Uuid, PendingDeletion>,
    ticket_ttl: Duration,
}

impl<R, S> ProjectHandler<R, S>
where
    R: ProjectRepository,
    S: ObjectStorage,
{
    pub fn new(project_repo: R, storage: S, ticket_ttl: Duration) -> Self {
        ProjectHandler {
            project_repo,
            storage,
            listing: Mutex::new(ProjectListing::new()),
            tickets: DashMap::new(),
            ticket_ttl,
        }
    }

    /// All projects, newest first.
    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        self.project_repo.list_projects().await
    }

    pub async fn list_cards(&self) -> Result<Vec<ProjectCard>, AppError> {
        let projects = self.list_projects().await?;
        Ok(projects.into_iter().map(ProjectCard::from).collect())
    }

    pub async fn get_project(&self, id: &str) -> Result<Project, AppError> {
        let valid_id = valid_uuid(id)?;
        self.project_repo
            .get_project(&valid_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }

    /// Fetches the list again and returns the admin view of it.
    pub async fn refresh_listing(&self) -> ProjectListing {
        let result = self.project_repo.list_projects().await;

        let mut listing = self.listing.lock();
        listing.apply(result);
        listing.clone()
    }

    /// First deletion step: checks the project exists and issues a ticket.
    #[instrument(skip(self))]
    pub async fn request_deletion(&self, id: &str) -> Result<DeletionTicket, AppError> {
        let project = self.get_project(id).await?;
        let ticket = Uuid::new_v4();

        self.tickets.insert(
            ticket,
            PendingDeletion {
                project_id: project.id,
                issued_at: Instant::now(),
            },
        );

        Ok(DeletionTicket {
            ticket,
            project_id: project.id,
            title: project.title,
            expires_in: self.ticket_ttl.as_secs(),
        })
    }

    /// Second deletion step. Image deletions are best-effort; the document is
    /// deleted regardless of their outcome.
    #[instrument(skip(self))]
    pub async fn confirm_deletion(&self, id: &str, ticket: &str) -> Result<ProjectListing, AppError> {
        let project_id = valid_uuid(id)?;
        let ticket = Uuid::parse_str(ticket)
            .map_err(|_| AppError::InvalidInput("Invalid deletion ticket".to_string()))?;

        let (_, pending) = self
            .tickets
            .remove_if(&ticket, |_, pending| pending.project_id == project_id)
            .ok_or_else(|| {
                tracing::warn!(%project_id, "Deletion confirmed with an unknown ticket");
                AppError::InvalidInput("Deletion ticket is invalid or expired".to_string())
            })?;

        if pending.issued_at.elapsed() > self.ticket_ttl {
            return Err(AppError::InvalidInput("Deletion ticket is invalid or expired".to_string()));
        }

        let project = self
            .project_repo
            .get_project(&project_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        for reference in project.image_references() {
            if let Err(e) = self.storage.delete(reference).await {
                tracing::warn!(%project_id, reference, "Failed to delete image: {}", e);
            }
        }

        self.project_repo.delete_project(&project_id).await.map_err(|e| {
            tracing::error!(%project_id, "Project deletion failed: {}", e);
            e
        })?;
        tracing::info!(%project_id, "Project deleted");

        Ok(self.refresh_listing().await)
    }

    /// Drops tickets that can no longer be confirmed.
    pub fn purge_expired_tickets(&self) -> usize {
        let before = self.tickets.len();
        self.tickets
            .retain(|_, pending| pending.issued_at.elapsed() <= self.ticket_ttl);
        before.saturating_sub(self.tickets.len())
    }
}
