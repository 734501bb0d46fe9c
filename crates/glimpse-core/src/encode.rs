//! Turns raw user input (search text plus selected files) into typed queries.
//!
//! The encoder is a pending set: files are accepted or rejected one at a time,
//! and a rejected file never disturbs files already accepted. `encode()` only
//! fails when there is nothing at all to search with.

use base64::Engine;

use crate::error::{GlimpseError, Result};
use crate::model::Query;

/// Image media types the encoder accepts for base64 queries.
pub const ACCEPTED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// True when `media_type` is a video type, accepted by the upload-search path.
pub fn is_video_type(media_type: &str) -> bool {
    media_type.starts_with("video/")
}

/// A file accepted into the pending set, kept in insertion order.
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct QueryEncoder {
    text: String,
    images: Vec<PendingImage>,
    embedding_model: String,
}

impl QueryEncoder {
    pub fn new(embedding_model: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            images: Vec::new(),
            embedding_model: embedding_model.into(),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Accept one image into the pending set. Rejection leaves previously
    /// accepted files untouched.
    pub fn add_image(
        &mut self,
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let name = name.into();
        let media_type = media_type.into();
        if !ACCEPTED_IMAGE_TYPES.contains(&media_type.as_str()) {
            return Err(GlimpseError::Validation(format!(
                "'{name}' is not an accepted image type ({media_type})"
            )));
        }
        self.images.push(PendingImage {
            name,
            media_type,
            bytes,
        });
        Ok(())
    }

    pub fn pending_images(&self) -> &[PendingImage] {
        &self.images
    }

    /// Produce the query list: one `text` query for non-empty trimmed text,
    /// then one `base64` query per accepted image, in insertion order.
    /// Fails when both the text is empty and no images are pending; the
    /// caller must not issue a request in that case.
    pub fn encode(&self) -> Result<Vec<Query>> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() && self.images.is_empty() {
            return Err(GlimpseError::Validation(
                "enter a search term or select a file".into(),
            ));
        }

        let mut queries = Vec::with_capacity(1 + self.images.len());
        if !trimmed.is_empty() {
            queries.push(Query::text(trimmed, &self.embedding_model));
        }
        for image in &self.images {
            let payload = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
            queries.push(Query::base64(payload, &self.embedding_model));
        }
        Ok(queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QueryKind;

    #[test]
    fn test_text_only_produces_one_trimmed_text_query() {
        let mut encoder = QueryEncoder::new("multimodal");
        encoder.set_text("  cat videos  ");
        let queries = encoder.encode().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].kind, QueryKind::Text);
        assert_eq!(queries[0].value, "cat videos");
    }

    #[test]
    fn test_one_base64_query_per_image_in_order() {
        let mut encoder = QueryEncoder::new("multimodal");
        encoder.add_image("a.png", "image/png", vec![1, 2, 3]).unwrap();
        encoder.add_image("b.jpg", "image/jpeg", vec![4, 5]).unwrap();
        let queries = encoder.encode().unwrap();
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|q| q.kind == QueryKind::Base64));
        // Insertion order survives encoding.
        assert_eq!(
            queries[0].value,
            base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3])
        );
        // Payloads are valid per the model's own rules.
        assert!(queries.iter().all(|q| q.validate().is_ok()));
    }

    #[test]
    fn test_rejected_file_keeps_accepted_ones() {
        let mut encoder = QueryEncoder::new("multimodal");
        encoder.add_image("ok.png", "image/png", vec![9]).unwrap();
        let err = encoder.add_image("notes.txt", "text/plain", vec![1]);
        assert!(matches!(err, Err(GlimpseError::Validation(_))));
        assert_eq!(encoder.pending_images().len(), 1);
        assert_eq!(encoder.pending_images()[0].name, "ok.png");
        // Encoding still succeeds from the surviving file.
        assert_eq!(encoder.encode().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_input_is_a_validation_error() {
        let encoder = QueryEncoder::new("multimodal");
        assert!(matches!(
            encoder.encode(),
            Err(GlimpseError::Validation(_))
        ));

        let mut encoder = QueryEncoder::new("multimodal");
        encoder.set_text("   ");
        assert!(encoder.encode().is_err());
    }

    #[test]
    fn test_text_and_images_combine() {
        let mut encoder = QueryEncoder::new("multimodal");
        encoder.set_text("sunset");
        encoder.add_image("s.webp", "image/webp", vec![7]).unwrap();
        let queries = encoder.encode().unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].kind, QueryKind::Text);
        assert_eq!(queries[1].kind, QueryKind::Base64);
    }

    #[test]
    fn test_video_type_check() {
        assert!(is_video_type("video/mp4"));
        assert!(!is_video_type("image/png"));
        assert!(!is_video_type("text/plain"));
    }
}
