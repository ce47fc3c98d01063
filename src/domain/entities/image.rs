use std::fmt;

use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::constants::MAX_IMAGE_BYTES;
use crate::errors::StorageError;

/// An image payload received from the admin and not yet uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Builds an upload after sniffing the payload; only image formats are accepted.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, StorageError> {
        let file_name = file_name.into();

        if bytes.is_empty() {
            return Err(StorageError::InvalidImage("file is empty".into()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(StorageError::InvalidImage(format!(
                "file exceeds {} bytes",
                MAX_IMAGE_BYTES
            )));
        }

        let kind = infer::get(&bytes)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .ok_or_else(|| StorageError::InvalidImage(format!("{} is not a supported image", file_name)))?;

        Ok(ImageUpload {
            file_name,
            content_type: kind.mime_type().to_string(),
            bytes,
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Serialized as a summary; raw bytes never leave the server.
impl Serialize for ImageUpload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ImageUpload", 3)?;
        state.serialize_field("fileName", &self.file_name)?;
        state.serialize_field("contentType", &self.content_type)?;
        state.serialize_field("size", &self.bytes.len())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn accepts_png_payload() {
        let upload = ImageUpload::new("shot.png", PNG_HEADER.to_vec()).unwrap();

        assert_eq!(upload.content_type, "image/png");
        assert_eq!(upload.size(), PNG_HEADER.len());
    }

    #[test]
    fn rejects_non_image_payload() {
        let err = ImageUpload::new("notes.txt", b"plain text".to_vec()).unwrap_err();
        assert!(matches!(err, StorageError::InvalidImage(_)));
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(ImageUpload::new("empty.png", Vec::new()).is_err());
    }

    #[test]
    fn summary_omits_bytes() {
        let upload = ImageUpload::new("shot.png", PNG_HEADER.to_vec()).unwrap();
        let json = serde_json::to_value(&upload).unwrap();

        assert_eq!(json["fileName"], "shot.png");
        assert!(json.get("bytes").is_none());
    }
}
