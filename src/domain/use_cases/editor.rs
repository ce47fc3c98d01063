use std::collections::HashSet;

use chrono::Utc;
use futures::future::try_join_all;
use tracing::instrument;

use crate::{
    constants::{COVER_PREFIX, PAGE_PREFIX},
    entities::{
        draft::{DraftPage, ImageSlot, ProjectDraft},
        image::ImageUpload,
        project::{ProjectPage, ProjectPatch, ProjectSavedResponse},
    },
    errors::AppError,
    repositories::{project::ProjectRepository, storage::ObjectStorage},
    utils::storage_path::object_path,
};

/// Turns a draft into a stored project: pending images are uploaded first,
/// then the document is written exactly once.
pub struct ProjectEditor<R, S>
where
    R: ProjectRepository,
    S: ObjectStorage,
{
    pub project_repo: R,
    pub storage: S,
}

/// Storage paths reserved for one submit.
struct UploadPlan {
    millis: i64,
    reserved: HashSet<String>,
}

impl UploadPlan {
    fn new() -> Self {
        UploadPlan {
            millis: Utc::now().timestamp_millis(),
            reserved: HashSet::new(),
        }
    }

    /// Same-named files in one submit get successive timestamps.
    fn reserve(&mut self, prefix: &str, file_name: &str) -> String {
        let mut millis = self.millis;
        loop {
            let path = object_path(prefix, file_name, millis);
            if self.reserved.insert(path.clone()) {
                return path;
            }
            millis += 1;
        }
    }
}

impl<R, S> ProjectEditor<R, S>
where
    R: ProjectRepository,
    S: ObjectStorage,
{
    pub fn new(project_repo: R, storage: S) -> Self {
        ProjectEditor { project_repo, storage }
    }

    /// Uploads the pending cover and page images, then creates or updates the
    /// project. Any failure before the write leaves the store untouched.
    #[instrument(skip(self, draft), fields(draft_id = %draft.id(), project_id = ?draft.project_id()))]
    pub async fn submit(&self, draft: &ProjectDraft) -> Result<ProjectSavedResponse, AppError> {
        draft.validate_for_submit()?;

        let mut plan = UploadPlan::new();

        let cover_url = match draft.cover() {
            ImageSlot::None => None,
            ImageSlot::Remote { url } => Some(url.clone()),
            ImageSlot::Pending { upload } => {
                let path = plan.reserve(COVER_PREFIX, &upload.file_name);
                Some(self.upload(upload, path).await?)
            }
        };

        let page_uploads = draft.pages().iter().map(|page| {
            let path = page
                .image
                .pending()
                .map(|upload| plan.reserve(PAGE_PREFIX, &upload.file_name));
            self.resolve_page(page, path)
        });
        // Collect before awaiting so every path is reserved up front
        let page_uploads: Vec<_> = page_uploads.collect();
        let pages = try_join_all(page_uploads).await?;

        let record = draft.to_record(cover_url, pages);

        match draft.project_id() {
            Some(id) => {
                self.project_repo
                    .update_project(&id, &ProjectPatch::from(record))
                    .await
                    .map_err(|e| {
                        tracing::error!(project_id = %id, "Project update failed: {}", e);
                        e
                    })?;

                tracing::info!(project_id = %id, "Project updated");
                Ok(ProjectSavedResponse {
                    id,
                    created: false,
                    message: "Project updated successfully".to_string(),
                })
            }
            None => {
                let id = self.project_repo.create_project(&record).await.map_err(|e| {
                    tracing::error!("Project creation failed: {}", e);
                    e
                })?;

                tracing::info!(project_id = %id, "Project created");
                Ok(ProjectSavedResponse {
                    id,
                    created: true,
                    message: "Project created successfully".to_string(),
                })
            }
        }
    }

    async fn resolve_page(&self, page: &DraftPage, path: Option<String>) -> Result<ProjectPage, AppError> {
        let image_url = match (&page.image, path) {
            (ImageSlot::Pending { upload }, Some(path)) => Some(self.upload(upload, path).await?),
            (ImageSlot::Remote { url }, _) => Some(url.clone()),
            _ => None,
        };

        Ok(ProjectPage {
            name: page.name.clone(),
            features: page.features.clone(),
            image_url,
        })
    }

    async fn upload(&self, image: &ImageUpload, path: String) -> Result<String, AppError> {
        self.storage.upload(image, &path).await.map_err(|e| {
            tracing::error!(path = %path, "Image upload failed: {}", e);
            AppError::from(e)
        })
    }
}
