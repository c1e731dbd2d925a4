// ABOUTME: Exercise service: creation with media upload, tag attachment, safe deletion
// ABOUTME: Media writes happen outside the database transaction and are cleaned up on abort
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::database::{self as db, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{ExerciseListFilter, ExercisePayload, ExerciseView};
use crate::services::lifecycle::ensure_present;
use crate::storage::{self, MediaStorage};

/// Input for exercise creation, including the uploaded media file
#[derive(Debug)]
pub struct NewExercise {
    pub title_en: String,
    pub title_ru: String,
    pub tag_ids: Vec<i64>,
    /// Client-side name of the uploaded file; only its extension survives
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Business logic for exercises and their stored media
#[derive(Clone)]
pub struct ExerciseService {
    db: Arc<Database>,
    media: Arc<dyn MediaStorage>,
}

impl ExerciseService {
    /// Create a service backed by the given database and media storage
    pub fn new(db: Arc<Database>, media: Arc<dyn MediaStorage>) -> Self {
        Self { db, media }
    }

    /// Create an exercise: store the media under a sanitized name, then insert
    /// the row and its tag links in one transaction
    ///
    /// The upload happens first; if the transaction aborts the stored file is
    /// removed again so failed creates leave nothing behind.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the upload fails and a validation error
    /// when a title collides or a tag id does not exist
    pub async fn create(&self, request: NewExercise) -> AppResult<ExerciseView> {
        let NewExercise {
            title_en,
            title_ru,
            tag_ids,
            file_name,
            content_type,
            data,
        } = request;

        let stored_name = storage::make_filename(&title_en, &file_name);
        let media_path = self
            .media
            .upload(&stored_name, data, &content_type)
            .await
            .map_err(|e| AppError::storage(format!("media upload failed: {e}")))?;

        match self.persist(&title_en, &title_ru, &tag_ids, &media_path).await {
            Ok(view) => Ok(view),
            Err(error) => {
                // The row never landed, so the uploaded file must go too
                if let Err(cleanup) = self.media.delete(&media_path).await {
                    warn!(
                        path = %media_path,
                        error = %cleanup,
                        "failed to remove media after aborted exercise create"
                    );
                }
                Err(error)
            }
        }
    }

    /// Fetch one exercise with its attached tag ids
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted exercises
    pub async fn find(&self, id: i64) -> AppResult<ExerciseView> {
        let exercise = ensure_present(self.db.exercise_by_id(id).await?, id)?;
        let tag_ids = self.db.tag_ids_for_exercise(id).await?;
        Ok(ExerciseView::from_entity(exercise, tag_ids))
    }

    /// List exercises per the filter, each with its attached tag ids
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn list(&self, filter: &ExerciseListFilter) -> AppResult<Vec<ExerciseView>> {
        let exercises = self.db.list_exercises(filter).await?;
        let ids: Vec<i64> = exercises.iter().map(|exercise| exercise.id).collect();
        let mut tags_by_exercise = self.db.tag_ids_for_exercises(&ids).await?;

        Ok(exercises
            .into_iter()
            .map(|exercise| {
                let tag_ids = tags_by_exercise.remove(&exercise.id).unwrap_or_default();
                ExerciseView::from_entity(exercise, tag_ids)
            })
            .collect())
    }

    /// Merge-style update: empty titles and an empty tips list keep the
    /// stored values
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted exercises
    pub async fn update(&self, id: i64, payload: ExercisePayload) -> AppResult<ExerciseView> {
        let mut guard = self.db.begin().await?;

        let mut exercise =
            ensure_present(db::exercises::find_exercise(guard.executor()?, id).await?, id)?;
        if !payload.title_en.is_empty() {
            exercise.title_en = payload.title_en;
        }
        if !payload.title_ru.is_empty() {
            exercise.title_ru = payload.title_ru;
        }
        if !payload.tips.is_empty() {
            exercise.tips = payload.tips;
        }

        db::exercises::update_exercise_row(guard.executor()?, &exercise).await?;
        guard.commit().await?;

        debug!(exercise_id = id, "exercise updated");
        self.find(id).await
    }

    /// Soft-delete an exercise unless a live block still references it, then
    /// remove its media
    ///
    /// Media removal happens after the commit; a failure there leaves an
    /// orphaned file but never a half-deleted exercise.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted exercises and a
    /// referenced-entity error naming the first live block that still
    /// contains the exercise
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut guard = self.db.begin().await?;

        let exercise =
            ensure_present(db::exercises::find_exercise(guard.executor()?, id).await?, id)?;
        if let Some(block_id) =
            db::exercises::first_live_block_referencing(guard.executor()?, id).await?
        {
            return Err(AppError::referenced_entity(
                format!("exercise {id}"),
                format!("block {block_id}"),
            ));
        }

        db::exercises::soft_delete_exercise(guard.executor()?, id).await?;
        guard.commit().await?;

        if !exercise.filename.is_empty() {
            if let Err(error) = self.media.delete(&exercise.filename).await {
                warn!(
                    exercise_id = id,
                    path = %exercise.filename,
                    error = %error,
                    "failed to remove media for deleted exercise"
                );
            }
        }

        info!(exercise_id = id, "exercise deleted");
        Ok(())
    }

    async fn persist(
        &self,
        title_en: &str,
        title_ru: &str,
        tag_ids: &[i64],
        media_path: &str,
    ) -> AppResult<ExerciseView> {
        let mut guard = self.db.begin().await?;

        let id =
            db::exercises::insert_exercise(guard.executor()?, title_en, title_ru, media_path, &[])
                .await?;
        db::tags::add_tag_links(guard.executor()?, id, tag_ids).await?;
        let exercise = db::exercises::find_exercise(guard.executor()?, id)
            .await?
            .ok_or_else(|| AppError::internal(format!("exercise {id} vanished after insert")))?;
        guard.commit().await?;

        info!(exercise_id = id, "exercise created");
        Ok(ExerciseView::from_entity(exercise, tag_ids.to_vec()))
    }
}
