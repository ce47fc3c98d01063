use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::TECHNOLOGY_PREVIEW_LIMIT;
use crate::entities::option_fields::OptionField;

// ───── Stored Documents ─────────────────────────────────────────────

/// A persisted portfolio entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub pages: Vec<ProjectPage>,
    pub created_at: DateTime<Utc>,
}

/// A page embedded in a project. Only resolved image references can be stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPage {
    pub name: String,
    pub features: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Project {
    /// Every storage reference owned by this project, cover first.
    pub fn image_references(&self) -> Vec<&str> {
        self.image_url
            .as_deref()
            .into_iter()
            .chain(self.pages.iter().filter_map(|p| p.image_url.as_deref()))
            .collect()
    }
}

// ───── Write Payloads ───────────────────────────────────────────────

/// Full document written on create. Id and creation time come from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub technologies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub pages: Vec<ProjectPage>,
}

impl ProjectRecord {
    pub fn into_project(self, id: Uuid, created_at: DateTime<Utc>) -> Project {
        Project {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            technologies: self.technologies,
            link: self.link,
            image_url: self.image_url,
            pages: self.pages,
            created_at,
        }
    }
}

/// Partial update. Unset fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub technologies: Option<Vec<String>>,
    pub link: OptionField<String>,
    pub image_url: OptionField<String>,
    pub pages: Option<Vec<ProjectPage>>,
}

impl ProjectPatch {
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(title) = &self.title {
            project.title = title.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(date) = self.date {
            project.date = date;
        }
        if let Some(technologies) = &self.technologies {
            project.technologies = technologies.clone();
        }
        self.link.apply(&mut project.link);
        self.image_url.apply(&mut project.image_url);
        if let Some(pages) = &self.pages {
            project.pages = pages.clone();
        }
    }
}

impl From<ProjectRecord> for ProjectPatch {
    /// Full-document update: every field is written, absent optionals are cleared.
    fn from(record: ProjectRecord) -> Self {
        ProjectPatch {
            title: Some(record.title),
            description: Some(record.description),
            date: Some(record.date),
            technologies: Some(record.technologies),
            link: record.link.into(),
            image_url: record.image_url.into(),
            pages: Some(record.pages),
        }
    }
}

// ───── API Response Models ──────────────────────────────────────────

/// Showcase card: the project with its technology list cut for display.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub technologies: Vec<String>,
    pub more_technologies: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub page_count: usize,
}

impl From<Project> for ProjectCard {
    fn from(project: Project) -> Self {
        let total = project.technologies.len();
        let technologies: Vec<String> = project
            .technologies
            .into_iter()
            .take(TECHNOLOGY_PREVIEW_LIMIT)
            .collect();

        ProjectCard {
            id: project.id,
            title: project.title,
            description: project.description,
            date: project.date,
            more_technologies: total - technologies.len(),
            technologies,
            link: project.link,
            image_url: project.image_url,
            page_count: project.pages.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectSavedResponse {
    pub id: Uuid,
    pub created: bool,
    pub message: String,
}
