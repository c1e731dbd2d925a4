// ABOUTME: Tag service: label creation and listing for exercise categorization

use std::sync::Arc;

use tracing::info;

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{TagPayload, TagView};

/// Business logic for exercise tags
#[derive(Clone)]
pub struct TagService {
    db: Arc<Database>,
}

impl TagService {
    /// Create a service backed by the given database
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a tag
    ///
    /// # Errors
    ///
    /// Returns a validation error when a title collides with an existing tag
    pub async fn create(&self, payload: TagPayload) -> AppResult<TagView> {
        let tag = self
            .db
            .create_tag(&payload.title_en, &payload.title_ru)
            .await?;

        info!(tag_id = tag.id, "tag created");
        Ok(TagView::from(tag))
    }

    /// All tags, most recently updated first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self) -> AppResult<Vec<TagView>> {
        let tags = self.db.list_tags().await?;
        Ok(tags.into_iter().map(TagView::from).collect())
    }
}
