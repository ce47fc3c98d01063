use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::image::ImageUpload;
use crate::entities::project::{Project, ProjectPage, ProjectRecord};
use crate::errors::{AppError, FieldError};

// ───── Identifiers ──────────────────────────────────────────────────

/// Stable identifier of a page inside a draft, assigned when the page is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(Uuid);

impl PageId {
    pub fn new() -> Self {
        PageId(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PageId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(PageId)
            .map_err(|_| AppError::InvalidInput("Invalid page id".to_string()))
    }
}

// ───── Draft Parts ──────────────────────────────────────────────────

/// Image attached to a draft page or cover. A URL and a pending payload
/// are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageSlot {
    #[default]
    None,
    Remote { url: String },
    Pending { upload: ImageUpload },
}

impl ImageSlot {
    fn from_reference(url: Option<String>) -> Self {
        url.map_or(ImageSlot::None, |url| ImageSlot::Remote { url })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ImageSlot::Pending { .. })
    }

    pub fn pending(&self) -> Option<&ImageUpload> {
        match self {
            ImageSlot::Pending { upload } => Some(upload),
            _ => None,
        }
    }

    pub fn remote_url(&self) -> Option<&str> {
        match self {
            ImageSlot::Remote { url } => Some(url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftPage {
    pub id: PageId,
    pub name: String,
    pub features: String,
    pub image: ImageSlot,
}

/// Values submitted for a new or edited page.
#[derive(Debug, Clone, Default, Validate)]
pub struct PageInput {
    #[validate(custom(function = "not_blank", message = "Page name is required"))]
    pub name: String,

    #[validate(custom(function = "not_blank", message = "Page features are required"))]
    pub features: String,

    pub image: Option<ImageUpload>,

    /// Drops the current image when no new one is supplied.
    pub clear_image: bool,
}

impl PageInput {
    pub fn new(name: impl Into<String>, features: impl Into<String>) -> Self {
        PageInput {
            name: name.into(),
            features: features.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Change to the draft cover image.
#[derive(Debug, Clone)]
pub enum CoverChange {
    Upload(ImageUpload),
    Clear,
}

/// Scalar field update.
#[derive(Debug, Clone)]
pub enum ProjectField {
    Title(String),
    Description(String),
    Date(NaiveDate),
    Link(Option<String>),
    Cover(CoverChange),
}

// ───── Draft ────────────────────────────────────────────────────────

/// In-memory edit buffer for one project being created or edited.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    id: Uuid,
    project_id: Option<Uuid>,
    title: String,
    description: String,
    date: NaiveDate,
    technologies: Vec<String>,
    link: Option<String>,
    cover: ImageSlot,
    pages: Vec<DraftPage>,
    updated_at: DateTime<Utc>,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectDraft {
    /// Empty draft for a project that does not exist yet.
    pub fn new() -> Self {
        let now = Utc::now();
        ProjectDraft {
            id: Uuid::new_v4(),
            project_id: None,
            title: String::new(),
            description: String::new(),
            date: now.date_naive(),
            technologies: Vec::new(),
            link: None,
            cover: ImageSlot::None,
            pages: Vec::new(),
            updated_at: now,
        }
    }

    /// Draft of a stored project; tags and pages keep their stored order.
    pub fn from_project(project: &Project) -> Self {
        let pages = project
            .pages
            .iter()
            .map(|page| DraftPage {
                id: PageId::new(),
                name: page.name.clone(),
                features: page.features.clone(),
                image: ImageSlot::from_reference(page.image_url.clone()),
            })
            .collect();

        ProjectDraft {
            id: Uuid::new_v4(),
            project_id: Some(project.id),
            title: project.title.clone(),
            description: project.description.clone(),
            date: project.date,
            technologies: project.technologies.clone(),
            link: project.link.clone(),
            cover: ImageSlot::from_reference(project.image_url.clone()),
            pages,
            updated_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn project_id(&self) -> Option<Uuid> {
        self.project_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn technologies(&self) -> &[String] {
        &self.technologies
    }

    pub fn cover(&self) -> &ImageSlot {
        &self.cover
    }

    pub fn pages(&self) -> &[DraftPage] {
        &self.pages
    }

    pub fn page(&self, id: PageId) -> Option<&DraftPage> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Resolves a list position to the page's stable id.
    pub fn page_id_at(&self, index: usize) -> Option<PageId> {
        self.pages.get(index).map(|p| p.id)
    }

    pub fn set_field(&mut self, field: ProjectField) {
        match field {
            ProjectField::Title(title) => self.title = title,
            ProjectField::Description(description) => self.description = description,
            ProjectField::Date(date) => self.date = date,
            ProjectField::Link(link) => self.link = link.filter(|l| !l.trim().is_empty()),
            ProjectField::Cover(CoverChange::Upload(upload)) => {
                self.cover = ImageSlot::Pending { upload }
            }
            ProjectField::Cover(CoverChange::Clear) => self.cover = ImageSlot::None,
        }
        self.touch();
    }

    /// Appends a trimmed tag. Blank input is ignored; duplicates are kept.
    pub fn add_technology(&mut self, technology: &str) -> bool {
        let technology = technology.trim();
        if technology.is_empty() {
            return false;
        }
        self.technologies.push(technology.to_string());
        self.touch();
        true
    }

    pub fn remove_technology(&mut self, index: usize) -> Result<String, AppError> {
        if index >= self.technologies.len() {
            return Err(AppError::field(
                "technologies",
                &format!("No technology at position {}", index),
            ));
        }
        let removed = self.technologies.remove(index);
        self.touch();
        Ok(removed)
    }

    pub fn add_page(&mut self, input: PageInput) -> Result<PageId, AppError> {
        input.validate()?;

        let page = DraftPage {
            id: PageId::new(),
            name: input.name,
            features: input.features,
            image: input.image.map_or(ImageSlot::None, |upload| ImageSlot::Pending { upload }),
        };
        let id = page.id;

        self.pages.push(page);
        self.touch();
        Ok(id)
    }

    /// Replaces the page in place. Without a new image the current one is kept
    /// unless `clear_image` is set.
    pub fn edit_page(&mut self, id: PageId, input: PageInput) -> Result<(), AppError> {
        input.validate()?;

        let page = self
            .pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Page {}", id)))?;

        page.name = input.name;
        page.features = input.features;
        match input.image {
            Some(upload) => page.image = ImageSlot::Pending { upload },
            None if input.clear_image => page.image = ImageSlot::None,
            None => {}
        }

        self.touch();
        Ok(())
    }

    pub fn remove_page(&mut self, id: PageId) -> Result<(), AppError> {
        let index = self
            .pages
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Page {}", id)))?;

        self.pages.remove(index);
        self.touch();
        Ok(())
    }

    /// Checks run before any upload or write. Only an empty page list is
    /// refused; every other field is saved as entered.
    pub fn validate_for_submit(&self) -> Result<(), AppError> {
        if self.pages.is_empty() {
            return Err(AppError::ValidationError(vec![FieldError::new(
                "pages",
                "Add at least one page before saving",
            )]));
        }
        Ok(())
    }

    /// Assembles the write payload once every image has a reference.
    pub fn to_record(&self, cover_url: Option<String>, pages: Vec<ProjectPage>) -> ProjectRecord {
        ProjectRecord {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
            technologies: self.technologies.clone(),
            link: self.link.clone(),
            image_url: cover_url,
            pages,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn tags_follow_adds_minus_removed_positions() {
        let mut draft = ProjectDraft::new();
        for tag in ["Rust", "  Actix ", "", "Rust", "SQL"] {
            draft.add_technology(tag);
        }
        draft.remove_technology(1).unwrap();

        assert_eq!(draft.technologies(), ["Rust", "Rust", "SQL"]);
    }

    #[test]
    fn removing_missing_tag_is_rejected() {
        let mut draft = ProjectDraft::new();
        draft.add_technology("Rust");

        assert!(draft.remove_technology(3).is_err());
        assert_eq!(draft.technologies(), ["Rust"]);
    }

    #[test]
    fn blank_page_fields_are_rejected_without_change() {
        let mut draft = ProjectDraft::new();

        let err = draft.add_page(PageInput::new("  ", "features")).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref e) if e[0].field == "name"));
        assert!(draft.add_page(PageInput::new("Home", "")).is_err());
        assert!(draft.pages().is_empty());
    }

    #[test]
    fn edit_replaces_only_the_target_page() {
        let mut draft = ProjectDraft::new();
        draft.add_page(PageInput::new("A", "a")).unwrap();
        let target = draft.add_page(PageInput::new("B", "b")).unwrap();
        draft.add_page(PageInput::new("C", "c")).unwrap();
        let before = draft.pages().to_vec();

        draft.edit_page(target, PageInput::new("B2", "b2")).unwrap();

        assert_eq!(draft.pages()[0], before[0]);
        assert_eq!(draft.pages()[2], before[2]);
        assert_eq!(draft.pages()[1].id, target);
        assert_eq!(draft.pages()[1].name, "B2");
    }

    #[test]
    fn invalid_edit_leaves_page_untouched() {
        let mut draft = ProjectDraft::new();
        let id = draft.add_page(PageInput::new("A", "a")).unwrap();

        assert!(draft.edit_page(id, PageInput::new("", "x")).is_err());
        assert_eq!(draft.page(id).unwrap().name, "A");
    }

    #[test]
    fn edit_keeps_or_clears_existing_image() {
        let mut draft = ProjectDraft::new();
        let id = draft
            .add_page(PageInput::new("A", "a").with_image(png("a.png")))
            .unwrap();

        draft.edit_page(id, PageInput::new("A", "new")).unwrap();
        assert!(draft.page(id).unwrap().image.is_pending());

        let mut clearing = PageInput::new("A", "new");
        clearing.clear_image = true;
        draft.edit_page(id, clearing).unwrap();
        assert_eq!(draft.page(id).unwrap().image, ImageSlot::None);
    }

    #[test]
    fn page_ids_survive_removal_of_earlier_pages() {
        let mut draft = ProjectDraft::new();
        let first = draft.add_page(PageInput::new("A", "a")).unwrap();
        let second = draft.add_page(PageInput::new("B", "b")).unwrap();

        draft.remove_page(first).unwrap();
        draft.edit_page(second, PageInput::new("B", "edited")).unwrap();

        assert_eq!(draft.page_id_at(0), Some(second));
        assert_eq!(draft.pages()[0].features, "edited");
    }

    #[test]
    fn submit_validation_only_requires_pages() {
        let mut draft = ProjectDraft::new();

        match draft.validate_for_submit() {
            Err(AppError::ValidationError(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["pages"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        draft.set_field(ProjectField::Link(Some("not a url".into())));
        draft.add_page(PageInput::new("Home", "Landing")).unwrap();
        assert!(draft.validate_for_submit().is_ok());
    }

    #[test]
    fn record_keeps_text_as_entered() {
        let mut draft = ProjectDraft::new();
        draft.set_field(ProjectField::Title("  X ".into()));
        draft.set_field(ProjectField::Description(" about ".into()));

        let record = draft.to_record(None, Vec::new());

        assert_eq!(record.title, "  X ");
        assert_eq!(record.description, " about ");
    }

    #[test]
    fn draft_from_project_keeps_order_and_references() {
        let project = Project {
            id: Uuid::new_v4(),
            title: "X".into(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            technologies: vec!["B".into(), "A".into()],
            link: None,
            image_url: Some("https://cdn/c.png".into()),
            pages: vec![
                ProjectPage { name: "2".into(), features: "f".into(), image_url: None },
                ProjectPage { name: "1".into(), features: "f".into(), image_url: Some("https://cdn/p.png".into()) },
            ],
            created_at: Utc::now(),
        };

        let draft = ProjectDraft::from_project(&project);

        assert_eq!(draft.project_id(), Some(project.id));
        assert_eq!(draft.technologies(), ["B", "A"]);
        assert_eq!(draft.pages()[0].name, "2");
        assert_eq!(draft.pages()[1].image.remote_url(), Some("https://cdn/p.png"));
        assert_eq!(draft.cover().remote_url(), Some("https://cdn/c.png"));
    }
}
