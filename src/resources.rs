// ABOUTME: Centralized resource container for dependency injection across route handlers
// ABOUTME: Builds every service once over shared database and media storage handles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use crate::auth::SessionManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::services::blocks::BlockService;
use crate::services::exercises::ExerciseService;
use crate::services::tags::TagService;
use crate::services::trainings::TrainingService;
use crate::storage::MediaStorage;

/// Centralized resource container for dependency injection
///
/// Handlers receive this as axum state; every expensive resource is built
/// once and shared through `Arc`.
#[derive(Clone)]
pub struct ServerResources {
    pub database: Arc<Database>,
    pub sessions: SessionManager,
    pub blocks: BlockService,
    pub trainings: TrainingService,
    pub exercises: ExerciseService,
    pub tags: TagService,
    pub media: Arc<dyn MediaStorage>,
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Wire every service over the shared database and media storage
    pub fn new(database: Database, media: Arc<dyn MediaStorage>, config: Arc<ServerConfig>) -> Self {
        let database = Arc::new(database);
        Self {
            sessions: SessionManager::new(database.clone()),
            blocks: BlockService::new(database.clone()),
            trainings: TrainingService::new(database.clone()),
            exercises: ExerciseService::new(database.clone(), media.clone()),
            tags: TagService::new(database.clone()),
            media,
            config,
            database,
        }
    }
}
