// ABOUTME: Training composition service: draft-gated block membership and deletion
// ABOUTME: Hydrates trainings into ordered block summaries on every read path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::database::{self as db, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Block, BlockSummary, ListFilter, Training, TrainingDetail, TrainingPayload};
use crate::services::blocks::member_ids_by_block;
use crate::services::lifecycle::{ensure_draft, ensure_present};

/// Business logic for trainings and their ordered block lists
#[derive(Clone)]
pub struct TrainingService {
    db: Arc<Database>,
}

impl TrainingService {
    /// Create a service backed by the given database
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a training in draft state
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails
    pub async fn create(&self, payload: TrainingPayload) -> AppResult<TrainingDetail> {
        let training = self
            .db
            .create_training(&payload.title_en, &payload.title_ru)
            .await?;

        info!(training_id = training.id, "training created");
        self.hydrate(training).await
    }

    /// Fetch one training with its hydrated block summaries
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted trainings
    pub async fn find(&self, id: i64) -> AppResult<TrainingDetail> {
        let training = ensure_present(self.db.training_by_id(id).await?, id)?;
        self.hydrate(training).await
    }

    /// List trainings per the filter, each hydrated with its block summaries
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn list(&self, filter: &ListFilter) -> AppResult<Vec<TrainingDetail>> {
        let trainings = self.db.list_trainings(filter).await?;
        let training_ids: Vec<i64> = trainings.iter().map(|training| training.id).collect();

        let links = self.db.block_links_for_trainings(&training_ids).await?;
        let mut block_ids_by_training: HashMap<i64, Vec<i64>> = HashMap::new();
        for link in &links {
            block_ids_by_training
                .entry(link.training_id)
                .or_default()
                .push(link.block_id);
        }

        // The same block can appear in several trainings; fetch each once
        let unique_block_ids: Vec<i64> = links
            .iter()
            .map(|link| link.block_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let blocks_by_id = self.blocks_by_id(&unique_block_ids).await?;
        let members =
            member_ids_by_block(self.db.exercise_links_for_blocks(&unique_block_ids).await?);

        Ok(trainings
            .into_iter()
            .map(|training| {
                let block_ids = block_ids_by_training
                    .remove(&training.id)
                    .unwrap_or_default();
                assemble(training, block_ids, &blocks_by_id, &members)
            })
            .collect())
    }

    /// Merge-style update: empty titles keep the stored value
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted trainings
    pub async fn update(&self, id: i64, payload: TrainingPayload) -> AppResult<TrainingDetail> {
        let mut guard = self.db.begin().await?;

        let mut training =
            ensure_present(db::trainings::find_training(guard.executor()?, id).await?, id)?;
        if !payload.title_en.is_empty() {
            training.title_en = payload.title_en;
        }
        if !payload.title_ru.is_empty() {
            training.title_ru = payload.title_ru;
        }

        db::trainings::update_training_row(guard.executor()?, &training).await?;
        guard.commit().await?;

        debug!(training_id = id, "training updated");
        self.find(id).await
    }

    /// Flip the draft flag regardless of current contents
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted trainings
    pub async fn toggle_draft(&self, id: i64) -> AppResult<TrainingDetail> {
        let training = ensure_present(self.db.toggle_training_draft(id).await?, id)?;
        info!(
            training_id = id,
            draft = training.draft,
            "training draft state toggled"
        );
        self.hydrate(training).await
    }

    /// Link a block at the end of a draft training
    ///
    /// The block itself may be in either lifecycle state; only the training
    /// must be a draft.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when either end of the link is missing, an
    /// invalid-state error when the training is not a draft, and a validation
    /// error when the block is already linked
    pub async fn add_block(&self, training_id: i64, block_id: i64) -> AppResult<TrainingDetail> {
        let mut guard = self.db.begin().await?;

        let training = ensure_present(
            db::trainings::find_training(guard.executor()?, training_id).await?,
            training_id,
        )?;
        ensure_draft(&training)?;

        let block = ensure_present(
            db::blocks::find_block(guard.executor()?, block_id).await?,
            block_id,
        )?;
        db::trainings::insert_block_link(guard.executor()?, training_id, block.id).await?;
        guard.commit().await?;

        debug!(training_id, block_id, "block linked into training");
        self.find(training_id).await
    }

    /// Unlink a block from a draft training
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted trainings and
    /// for blocks that are not linked, and an invalid-state error when the
    /// training is not a draft
    pub async fn remove_block(&self, training_id: i64, block_id: i64) -> AppResult<TrainingDetail> {
        let mut guard = self.db.begin().await?;

        let training = ensure_present(
            db::trainings::find_training(guard.executor()?, training_id).await?,
            training_id,
        )?;
        ensure_draft(&training)?;

        let removed =
            db::trainings::delete_block_link(guard.executor()?, training_id, block_id).await?;
        if !removed {
            return Err(AppError::not_found(format!(
                "block {block_id} in training {training_id}"
            )));
        }
        guard.commit().await?;

        debug!(training_id, block_id, "block unlinked from training");
        self.find(training_id).await
    }

    /// Soft-delete a training
    ///
    /// Nothing references trainings, so deletion never needs a referrer check.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for missing or soft-deleted trainings
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let deleted = self.db.delete_training(id).await?;
        if !deleted {
            return Err(AppError::not_found(format!("training {id}"))
                .with_resource_id(id.to_string()));
        }

        info!(training_id = id, "training deleted");
        Ok(())
    }

    /// Attach ordered block summaries to a training entity
    async fn hydrate(&self, training: Training) -> AppResult<TrainingDetail> {
        let links = self.db.block_links(training.id).await?;
        let block_ids: Vec<i64> = links.iter().map(|link| link.block_id).collect();

        let blocks_by_id = self.blocks_by_id(&block_ids).await?;
        let members = member_ids_by_block(self.db.exercise_links_for_blocks(&block_ids).await?);

        Ok(assemble(training, block_ids, &blocks_by_id, &members))
    }

    async fn blocks_by_id(&self, ids: &[i64]) -> AppResult<HashMap<i64, Block>> {
        Ok(self
            .db
            .blocks_by_ids(ids)
            .await?
            .into_iter()
            .map(|block| (block.id, block))
            .collect())
    }
}

/// Build the read model from a training and its resolved member blocks
fn assemble(
    training: Training,
    block_ids: Vec<i64>,
    blocks_by_id: &HashMap<i64, Block>,
    members: &HashMap<i64, Vec<i64>>,
) -> TrainingDetail {
    let mut blocks = Vec::with_capacity(block_ids.len());
    for block_id in block_ids {
        match blocks_by_id.get(&block_id) {
            Some(block) if !block.is_deleted() => {
                let exercises_ids = members.get(&block_id).cloned().unwrap_or_default();
                blocks.push(BlockSummary::from_entity(block.clone(), exercises_ids));
            }
            _ => warn!(
                training_id = training.id,
                block_id, "linked block is missing or deleted; skipping"
            ),
        }
    }

    TrainingDetail {
        id: training.id,
        created_at: training.created_at,
        title_en: training.title_en,
        title_ru: training.title_ru,
        draft: training.draft,
        block_ids: blocks.iter().map(|block| block.id).collect(),
        blocks,
    }
}
