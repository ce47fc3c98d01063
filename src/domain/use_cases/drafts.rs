use dashmap::DashMap;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::{draft::ProjectDraft, project::ProjectSavedResponse},
    errors::AppError,
    repositories::{project::ProjectRepository, storage::ObjectStorage},
    use_cases::editor::ProjectEditor,
    utils::valid_uuid::valid_uuid,
};

/// Open drafts keyed by draft id. Each draft is edited by one admin at a time.
#[derive(Default)]
pub struct DraftWorkspace {
    drafts: DashMap<Uuid, ProjectDraft>,
}

impl DraftWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn open_new(&self) -> ProjectDraft {
        let draft = ProjectDraft::new();
        self.drafts.insert(draft.id(), draft.clone());
        draft
    }

    /// Opens a draft prefilled from a stored project.
    pub async fn open_from_project<R>(&self, repo: &R, project_id: &str) -> Result<ProjectDraft, AppError>
    where
        R: ProjectRepository + ?Sized,
    {
        let project_id = valid_uuid(project_id)?;
        let project = repo
            .get_project(&project_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        let draft = ProjectDraft::from_project(&project);
        self.drafts.insert(draft.id(), draft.clone());
        Ok(draft)
    }

    pub fn get(&self, draft_id: &str) -> Result<ProjectDraft, AppError> {
        let id = valid_uuid(draft_id)?;
        self.drafts
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(draft_not_found)
    }

    /// Runs an edit against the stored draft and returns its result with the
    /// updated draft.
    pub fn mutate<T, F>(&self, draft_id: &str, edit: F) -> Result<(T, ProjectDraft), AppError>
    where
        F: FnOnce(&mut ProjectDraft) -> Result<T, AppError>,
    {
        let id = valid_uuid(draft_id)?;
        let mut entry = self.drafts.get_mut(&id).ok_or_else(draft_not_found)?;

        let output = edit(entry.value_mut())?;
        Ok((output, entry.value().clone()))
    }

    pub fn discard(&self, draft_id: &str) -> Result<(), AppError> {
        let id = valid_uuid(draft_id)?;
        self.drafts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(draft_not_found)
    }

    /// Submits a snapshot of the draft; the draft is closed only on success.
    #[instrument(skip(self, editor))]
    pub async fn submit<R, S>(
        &self,
        draft_id: &str,
        editor: &ProjectEditor<R, S>,
    ) -> Result<ProjectSavedResponse, AppError>
    where
        R: ProjectRepository,
        S: ObjectStorage,
    {
        let draft = self.get(draft_id)?;
        let saved = editor.submit(&draft).await?;

        self.drafts.remove(&draft.id());
        Ok(saved)
    }
}

fn draft_not_found() -> AppError {
    AppError::NotFound("Draft not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::draft::PageInput;

    #[test]
    fn failed_edit_leaves_draft_unchanged() {
        let workspace = DraftWorkspace::new();
        let draft = workspace.open_new();
        let id = draft.id().to_string();

        workspace
            .mutate(&id, |d| d.add_page(PageInput::new("Home", "Landing")))
            .unwrap();
        let err = workspace
            .mutate(&id, |d| d.add_page(PageInput::new("", "No name")))
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(workspace.get(&id).unwrap().pages().len(), 1);
    }

    #[test]
    fn discard_closes_draft() {
        let workspace = DraftWorkspace::new();
        let id = workspace.open_new().id().to_string();

        workspace.discard(&id).unwrap();

        assert!(workspace.is_empty());
        assert!(matches!(workspace.get(&id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn malformed_draft_id_is_invalid_input() {
        let workspace = DraftWorkspace::new();
        assert!(matches!(workspace.get("not-a-uuid"), Err(AppError::InvalidInput(_))));
    }
}
