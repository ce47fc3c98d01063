use serde::Serialize;

use crate::{entities::project::Project, errors::AppError, repositories::project::ProjectRepository};

pub const LOAD_FAILED_NOTIFICATION: &str = "Could not load projects. Please try again.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "projects", rename_all = "lowercase")]
pub enum ListingState {
    Loading,
    Empty,
    Loaded(Vec<Project>),
}

/// Admin project list as last fetched, with an optional notification for the
/// most recent failure.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectListing {
    #[serde(flatten)]
    state: ListingState,
    notification: Option<String>,
}

impl Default for ProjectListing {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectListing {
    pub fn new() -> Self {
        ProjectListing {
            state: ListingState::Loading,
            notification: None,
        }
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    pub fn projects(&self) -> &[Project] {
        match &self.state {
            ListingState::Loaded(projects) => projects,
            _ => &[],
        }
    }

    pub async fn load<R: ProjectRepository + ?Sized>(&mut self, repo: &R) -> &ListingState {
        let result = repo.list_projects().await;
        self.apply(result)
    }

    /// Records a fetch result. A failure keeps the projects already shown.
    pub fn apply(&mut self, result: Result<Vec<Project>, AppError>) -> &ListingState {
        match result {
            Ok(projects) if projects.is_empty() => {
                self.state = ListingState::Empty;
                self.notification = None;
            }
            Ok(projects) => {
                self.state = ListingState::Loaded(projects);
                self.notification = None;
            }
            Err(e) => {
                tracing::error!("Failed to load projects: {}", e);
                if self.state == ListingState::Loading {
                    self.state = ListingState::Empty;
                }
                self.notification = Some(LOAD_FAILED_NOTIFICATION.to_string());
            }
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;

    fn project(title: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            technologies: vec![],
            link: None,
            image_url: None,
            pages: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn starts_loading() {
        assert_eq!(ProjectListing::new().state(), &ListingState::Loading);
    }

    #[test]
    fn empty_result_is_empty_state() {
        let mut listing = ProjectListing::new();
        assert_eq!(listing.apply(Ok(vec![])), &ListingState::Empty);
    }

    #[test]
    fn failure_keeps_previous_projects_and_notifies() {
        let mut listing = ProjectListing::new();
        listing.apply(Ok(vec![project("a"), project("b")]));

        listing.apply(Err(AppError::InternalError("down".into())));

        assert_eq!(listing.projects().len(), 2);
        assert_eq!(listing.notification(), Some(LOAD_FAILED_NOTIFICATION));
    }

    #[test]
    fn success_clears_notification() {
        let mut listing = ProjectListing::new();
        listing.apply(Err(AppError::InternalError("down".into())));
        assert_eq!(listing.state(), &ListingState::Empty);

        listing.apply(Ok(vec![project("a")]));
        assert!(listing.notification().is_none());
    }

    #[test]
    fn serializes_state_tag() {
        let mut listing = ProjectListing::new();
        listing.apply(Ok(vec![project("a")]));

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["state"], "loaded");
        assert_eq!(json["projects"][0]["title"], "a");
    }
}
