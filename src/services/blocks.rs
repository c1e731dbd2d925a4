// ABOUTME: Block composition service: timing fit on write, draft-gated slot edits
// ABOUTME: Capacity checks, ordered add/remove, safe deletion, and read-model hydration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::database::{self as db, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{
    Block, BlockDetail, BlockExerciseView, BlockPayload, BlockSummary, ExerciseBlock, ListFilter,
    Side,
};
use crate::services::lifecycle::{ensure_draft, ensure_present};
use crate::services::timing::{self, Timing};

/// Business logic for blocks and their ordered exercise slots
#[derive(Clone)]
pub struct BlockService {
    db: Arc<Database>,
}

impl BlockService {
    /// Create a service backed by the given database
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a block in draft state; timing is fitted before the row is stored
    ///
    /// # Errors
    ///
    /// Returns a validation error when a title collides with an existing block
    pub async fn create(&self, payload: BlockPayload) -> AppResult<BlockDetail> {
        let fitted = timing::fit(Timing {
            total_duration: payload.total_duration,
            on_time: payload.on_time,
            relax_time: payload.relax_time,
        });
        let block = self
            .db
            .create_block(
                &payload.title_en,
                &payload.title_ru,
                fitted.total_duration,
                fitted.on_time,
                fitted.relax_time,
            )
            .await?;

        info!(block_id = block.id, "block created");
        self.hydrate(block).await
    }

    /// Fetch one block with its hydrated exercise slots
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted blocks
    pub async fn find(&self, id: i64) -> AppResult<BlockDetail> {
        let block = ensure_present(self.db.block_by_id(id).await?, id)?;
        self.hydrate(block).await
    }

    /// List blocks per the filter, each with its ordered member exercise ids
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self, filter: &ListFilter) -> AppResult<Vec<BlockSummary>> {
        let blocks = self.db.list_blocks(filter).await?;
        let ids: Vec<i64> = blocks.iter().map(|block| block.id).collect();
        let mut members = member_ids_by_block(self.db.exercise_links_for_blocks(&ids).await?);

        Ok(blocks
            .into_iter()
            .map(|block| {
                let exercises_ids = members.remove(&block.id).unwrap_or_default();
                BlockSummary::from_entity(block, exercises_ids)
            })
            .collect())
    }

    /// Merge-style update: empty titles and zero durations keep the stored
    /// value, the rest time is always overwritten, and the merged timing is
    /// re-fitted before saving
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted blocks
    pub async fn update(&self, id: i64, payload: BlockPayload) -> AppResult<BlockDetail> {
        let mut guard = self.db.begin().await?;

        let mut block = ensure_present(db::blocks::find_block(guard.executor()?, id).await?, id)?;
        if !payload.title_en.is_empty() {
            block.title_en = payload.title_en;
        }
        if !payload.title_ru.is_empty() {
            block.title_ru = payload.title_ru;
        }
        if payload.total_duration != 0 {
            block.total_duration = payload.total_duration;
        }
        if payload.on_time != 0 {
            block.on_time = payload.on_time;
        }
        // Zero is a meaningful rest time, so relax_time is applied unconditionally
        block.relax_time = payload.relax_time;

        let fitted = timing::fit(block_timing(&block));
        block.total_duration = fitted.total_duration;
        block.on_time = fitted.on_time;
        block.relax_time = fitted.relax_time;

        db::blocks::update_block_row(guard.executor()?, &block).await?;
        guard.commit().await?;

        debug!(block_id = id, "block updated");
        self.find(id).await
    }

    /// Flip the draft flag regardless of current contents
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted blocks
    pub async fn toggle_draft(&self, id: i64) -> AppResult<BlockDetail> {
        let block = ensure_present(self.db.toggle_block_draft(id).await?, id)?;
        info!(block_id = id, draft = block.draft, "block draft state toggled");
        self.hydrate(block).await
    }

    /// Link an exercise into the next free slot of a draft block
    ///
    /// # Errors
    ///
    /// Returns a not-found error when either end of the link is missing, an
    /// invalid-state error when the block is not a draft, a full error when
    /// every slot is occupied, and a validation error when the exercise is
    /// already linked
    pub async fn add_exercise(
        &self,
        block_id: i64,
        exercise_id: i64,
        side: Side,
    ) -> AppResult<BlockDetail> {
        let mut guard = self.db.begin().await?;

        let block = ensure_present(
            db::blocks::find_block(guard.executor()?, block_id).await?,
            block_id,
        )?;
        ensure_draft(&block)?;

        let occupied = db::blocks::count_exercise_links(guard.executor()?, block_id).await?;
        if timing::is_full(
            block_timing(&block),
            u32::try_from(occupied).unwrap_or(u32::MAX),
        ) {
            return Err(AppError::full(format!(
                "block {block_id} already holds {occupied} exercises"
            ))
            .with_resource_id(block_id.to_string()));
        }

        let exercise = ensure_present(
            db::exercises::find_exercise(guard.executor()?, exercise_id).await?,
            exercise_id,
        )?;
        db::blocks::insert_exercise_link(guard.executor()?, block_id, exercise.id, side).await?;
        guard.commit().await?;

        debug!(block_id, exercise_id, side = %side, "exercise linked into block");
        self.find(block_id).await
    }

    /// Unlink an exercise from a draft block
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted blocks and for
    /// exercises that are not linked, and an invalid-state error when the
    /// block is not a draft
    pub async fn remove_exercise(&self, block_id: i64, exercise_id: i64) -> AppResult<BlockDetail> {
        let mut guard = self.db.begin().await?;

        let block = ensure_present(
            db::blocks::find_block(guard.executor()?, block_id).await?,
            block_id,
        )?;
        ensure_draft(&block)?;

        let removed = db::blocks::delete_exercise_link(guard.executor()?, block_id, exercise_id)
            .await?;
        if !removed {
            return Err(AppError::not_found(format!(
                "exercise {exercise_id} in block {block_id}"
            )));
        }
        guard.commit().await?;

        debug!(block_id, exercise_id, "exercise unlinked from block");
        self.find(block_id).await
    }

    /// Soft-delete a block unless a live training still references it
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted blocks and a
    /// referenced-entity error naming the first live training that still
    /// contains the block
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut guard = self.db.begin().await?;

        let block = ensure_present(db::blocks::find_block(guard.executor()?, id).await?, id)?;
        if let Some(training_id) =
            db::blocks::first_live_training_referencing(guard.executor()?, id).await?
        {
            return Err(AppError::referenced_entity(
                format!("block {id}"),
                format!("training {training_id}"),
            ));
        }

        db::blocks::delete_exercise_links_for_block(guard.executor()?, block.id).await?;
        db::blocks::soft_delete_block(guard.executor()?, block.id).await?;
        guard.commit().await?;

        info!(block_id = id, "block deleted");
        Ok(())
    }

    /// Attach ordered slot views to a block entity
    async fn hydrate(&self, block: Block) -> AppResult<BlockDetail> {
        let links = self.db.exercise_links(block.id).await?;
        let exercise_ids: Vec<i64> = links.iter().map(|link| link.exercise_id).collect();
        let exercises: HashMap<i64, _> = self
            .db
            .exercises_by_ids(&exercise_ids)
            .await?
            .into_iter()
            .map(|exercise| (exercise.id, exercise))
            .collect();

        let mut views = Vec::with_capacity(links.len());
        let mut order: i64 = 0;
        for link in &links {
            let Some(exercise) = exercises.get(&link.exercise_id) else {
                warn!(
                    block_id = block.id,
                    exercise_id = link.exercise_id,
                    "slot references a missing exercise row; skipping"
                );
                continue;
            };
            views.push(BlockExerciseView {
                exercise_id: link.exercise_id,
                order,
                side: link.side,
                title_en: exercise.title_en.clone(),
                title_ru: exercise.title_ru.clone(),
                filename: exercise.filename.clone(),
            });
            order += 1;
        }

        Ok(BlockDetail {
            id: block.id,
            created_at: block.created_at,
            title_en: block.title_en,
            title_ru: block.title_ru,
            total_duration: block.total_duration,
            on_time: block.on_time,
            relax_time: block.relax_time,
            draft: block.draft,
            exercises_ids: views.iter().map(|view| view.exercise_id).collect(),
            exercises: views,
        })
    }
}

/// Timing parameters currently stored on a block
fn block_timing(block: &Block) -> Timing {
    Timing {
        total_duration: block.total_duration,
        on_time: block.on_time,
        relax_time: block.relax_time,
    }
}

/// Group association rows into per-block member id lists, preserving slot order
pub(crate) fn member_ids_by_block(links: Vec<ExerciseBlock>) -> HashMap<i64, Vec<i64>> {
    let mut members: HashMap<i64, Vec<i64>> = HashMap::new();
    for link in links {
        members
            .entry(link.block_id)
            .or_default()
            .push(link.exercise_id);
    }
    members
}
