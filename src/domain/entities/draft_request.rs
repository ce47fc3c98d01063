use actix_multipart::form::{json::Json as MpJson, tempfile::TempFile, MultipartForm};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::entities::draft::{DraftPage, PageId, PageInput, ProjectDraft, ProjectField};
use crate::entities::image::ImageUpload;
use crate::entities::option_fields::OptionField;
use crate::errors::AppError;

// ───── Multipart Forms ──────────────────────────────────────────────

// Field caps sit above `MAX_IMAGE_BYTES`; the size check itself is in
// `ImageUpload::new`.
#[derive(Debug, MultipartForm)]
pub struct CoverUpload {
    #[multipart(rename = "image", limit = "6MiB")]
    pub image: TempFile,
}

#[derive(Debug, MultipartForm)]
pub struct PageForm {
    #[multipart(rename = "metadata")]
    pub metadata: MpJson<PageMetadata>,

    #[multipart(rename = "image", limit = "6MiB")]
    pub image: Option<TempFile>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub name: String,
    pub features: String,
    #[serde(default)]
    pub clear_image: bool,
}

impl PageForm {
    pub async fn into_input(self) -> Result<PageInput, AppError> {
        let metadata = self.metadata.into_inner();
        let image = match self.image {
            Some(file) => Some(read_upload(file).await?),
            None => None,
        };

        Ok(PageInput {
            name: metadata.name,
            features: metadata.features,
            image,
            clear_image: metadata.clear_image,
        })
    }
}

/// Reads a spooled multipart file and checks it is an image.
pub async fn read_upload(file: TempFile) -> Result<ImageUpload, AppError> {
    let file_name = file.file_name.unwrap_or_else(|| "image".to_string());
    let bytes = fs::read(file.file.path()).await.map_err(|e| {
        tracing::error!("Failed to read uploaded file: {}", e);
        AppError::InternalError("Failed to read uploaded file".to_string())
    })?;

    Ok(ImageUpload::new(file_name, bytes)?)
}

// ───── JSON Requests ────────────────────────────────────────────────

/// Scalar draft fields. Missing keys are left alone; `"link": null` clears the link.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftFieldsUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub link: OptionField<String>,
}

impl DraftFieldsUpdate {
    pub fn into_fields(self) -> Vec<ProjectField> {
        let mut fields = Vec::new();
        if let Some(title) = self.title {
            fields.push(ProjectField::Title(title));
        }
        if let Some(description) = self.description {
            fields.push(ProjectField::Description(description));
        }
        if let Some(date) = self.date {
            fields.push(ProjectField::Date(date));
        }
        if let Some(link) = self.link.into_option() {
            fields.push(ProjectField::Link(link));
        }
        fields
    }
}

#[derive(Debug, Deserialize)]
pub struct NewTechnology {
    pub name: String,
}

// ───── Responses ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyAdded {
    pub added: bool,
    pub draft: ProjectDraft,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSaved {
    pub page_id: PageId,
    pub page: Option<DraftPage>,
    pub draft: ProjectDraft,
}

impl PageSaved {
    pub fn new(page_id: PageId, draft: ProjectDraft) -> Self {
        PageSaved {
            page_id,
            page: draft.page(page_id).cloned(),
            draft,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_leave_fields_alone() {
        let update: DraftFieldsUpdate = serde_json::from_str(r#"{"title":"X"}"#).unwrap();
        let fields = update.into_fields();

        assert_eq!(fields.len(), 1);
        assert!(matches!(&fields[0], ProjectField::Title(t) if t == "X"));
    }

    #[test]
    fn null_link_clears_it() {
        let update: DraftFieldsUpdate = serde_json::from_str(r#"{"link":null}"#).unwrap();

        assert!(matches!(update.into_fields().as_slice(), [ProjectField::Link(None)]));
    }

    #[test]
    fn page_metadata_defaults_to_keeping_the_image() {
        let metadata: PageMetadata =
            serde_json::from_str(r#"{"name":"Home","features":"Hero"}"#).unwrap();

        assert!(!metadata.clear_image);
    }
}
