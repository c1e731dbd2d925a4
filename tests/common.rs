// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database, media storage, and resource container helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `blockfit_server`
//!
//! Common setup helpers to reduce duplication across integration tests.

use std::sync::{Arc, Once};

use anyhow::Result;
use bytes::Bytes;
use tempfile::TempDir;

use blockfit_server::config::{LogLevel, ServerConfig};
use blockfit_server::database::Database;
use blockfit_server::models::{BlockDetail, BlockPayload, ExerciseView, TrainingPayload};
use blockfit_server::resources::ServerResources;
use blockfit_server::services::exercises::NewExercise;
use blockfit_server::storage::LocalMediaStorage;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG raises the level when a test needs more detail
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Everything a test needs: wired resources plus the media tempdir
///
/// The tempdir handle must stay alive for as long as the storage is used.
pub struct TestHarness {
    pub resources: Arc<ServerResources>,
    pub media_dir: TempDir,
}

/// Standard test setup: in-memory database and tempdir-backed media storage
pub async fn create_test_resources() -> Result<TestHarness> {
    init_test_logging();

    let database = Database::new("sqlite::memory:").await?;
    let media_dir = tempfile::tempdir()?;
    let media = Arc::new(LocalMediaStorage::new(media_dir.path()).await?);

    let config = Arc::new(ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".into(),
        media_root: media_dir.path().to_path_buf(),
        log_level: LogLevel::Info,
        cors_allowed_origins: "*".into(),
    });

    let resources = Arc::new(ServerResources::new(database, media, config));
    Ok(TestHarness {
        resources,
        media_dir,
    })
}

/// Block payload with explicit timing
pub fn block_payload(title: &str, total_duration: u8, on_time: u8, relax_time: u8) -> BlockPayload {
    BlockPayload {
        title_en: title.to_string(),
        title_ru: format!("{title} (ru)"),
        total_duration,
        on_time,
        relax_time,
    }
}

/// Training payload with both locale titles filled in
pub fn training_payload(title: &str) -> TrainingPayload {
    TrainingPayload {
        title_en: title.to_string(),
        title_ru: format!("{title} (ru)"),
    }
}

/// Upload request for a small fake video clip
pub fn new_exercise(title: &str, tag_ids: Vec<i64>) -> NewExercise {
    NewExercise {
        title_en: title.to_string(),
        title_ru: format!("{title} (ru)"),
        tag_ids,
        file_name: "clip.mp4".to_string(),
        content_type: "video/mp4".to_string(),
        data: Bytes::from_static(b"not really mp4 frames"),
    }
}

/// Create an exercise through the service and return its view
pub async fn create_exercise(resources: &ServerResources, title: &str) -> Result<ExerciseView> {
    Ok(resources.exercises.create(new_exercise(title, vec![])).await?)
}

/// Create a block with a consistent 30min / 30s / 30s grid
pub async fn create_block(resources: &ServerResources, title: &str) -> Result<BlockDetail> {
    Ok(resources
        .blocks
        .create(block_payload(title, 30, 30, 30))
        .await?)
}
