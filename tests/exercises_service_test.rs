// ABOUTME: Integration tests for exercise creation, media lifecycle, and filtering
// ABOUTME: Covers sanitized uploads, tag attachment, list precedence, and safe deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use blockfit_server::errors::ErrorCode;
use blockfit_server::models::{ExerciseListFilter, ExercisePayload, Side, TagPayload};

use common::{create_block, create_exercise, create_test_resources, new_exercise};

#[tokio::test]
async fn test_create_stores_media_under_sanitized_name() {
    let harness = create_test_resources().await.unwrap();

    let view = harness
        .resources
        .exercises
        .create(new_exercise("Morning Stretch", vec![]))
        .await
        .unwrap();

    assert_eq!(view.filename, "morning_stretch.mp4");
    let stored = harness.media_dir.path().join("morning_stretch.mp4");
    assert_eq!(
        std::fs::read(stored).unwrap(),
        b"not really mp4 frames"
    );
}

#[tokio::test]
async fn test_create_attaches_tags() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let strength = resources
        .tags
        .create(TagPayload {
            title_en: "Strength".to_string(),
            title_ru: "Сила".to_string(),
        })
        .await
        .unwrap();
    let mobility = resources
        .tags
        .create(TagPayload {
            title_en: "Mobility".to_string(),
            title_ru: "Подвижность".to_string(),
        })
        .await
        .unwrap();

    let view = resources
        .exercises
        .create(new_exercise("Deep Squat", vec![strength.id, mobility.id]))
        .await
        .unwrap();

    assert_eq!(view.tag_ids, vec![strength.id, mobility.id]);

    let fetched = resources.exercises.find(view.id).await.unwrap();
    assert_eq!(fetched.tag_ids, vec![strength.id, mobility.id]);
}

#[tokio::test]
async fn test_create_with_unknown_tag_rolls_back_media() {
    let harness = create_test_resources().await.unwrap();

    let err = harness
        .resources
        .exercises
        .create(new_exercise("Ghost Tagged", vec![12345]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
    // The aborted create must not leave the uploaded file behind
    assert!(!harness
        .media_dir
        .path()
        .join("ghost_tagged.mp4")
        .exists());
}

#[tokio::test]
async fn test_create_duplicate_title_is_validation_error() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    create_exercise(resources, "Unique Move").await.unwrap();
    let err = resources
        .exercises
        .create(new_exercise("Unique Move", vec![]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_list_block_filter_beats_suggestion() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let inside = create_exercise(resources, "Inside Move").await.unwrap();
    create_exercise(resources, "Outside Move").await.unwrap();
    let block = create_block(resources, "Container").await.unwrap();
    resources
        .blocks
        .add_exercise(block.id, inside.id, Side::None)
        .await
        .unwrap();

    // The suggestion would match both; block membership wins
    let listed = resources
        .exercises
        .list(&ExerciseListFilter {
            block_ids: vec![block.id],
            suggestion: "move".to_string(),
            ..ExerciseListFilter::default()
        })
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, inside.id);
}

#[tokio::test]
async fn test_list_suggestion_matches_either_locale() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let matched = create_exercise(resources, "Bear Crawl").await.unwrap();
    create_exercise(resources, "Crab Walk").await.unwrap();

    let by_en = resources
        .exercises
        .list(&ExerciseListFilter {
            suggestion: "bear".to_string(),
            ..ExerciseListFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(by_en.len(), 1);
    assert_eq!(by_en[0].id, matched.id);

    // The helper fills title_ru with a "(ru)" suffix; match on that locale
    let by_ru = resources
        .exercises
        .list(&ExerciseListFilter {
            suggestion: "bear crawl (RU)".to_string(),
            ..ExerciseListFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(by_ru.len(), 1);
    assert_eq!(by_ru[0].id, matched.id);
}

#[tokio::test]
async fn test_update_merges_titles_and_tips() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let exercise = create_exercise(resources, "Coached Move").await.unwrap();

    let updated = resources
        .exercises
        .update(
            exercise.id,
            ExercisePayload {
                title_en: String::new(),
                title_ru: String::new(),
                tips: vec!["keep the back straight".to_string()],
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title_en, "Coached Move");
    assert_eq!(updated.tips, vec!["keep the back straight".to_string()]);

    // An empty payload keeps everything, including the tips
    let unchanged = resources
        .exercises
        .update(exercise.id, ExercisePayload::default())
        .await
        .unwrap();
    assert_eq!(unchanged.tips, vec!["keep the back straight".to_string()]);
}

#[tokio::test]
async fn test_update_missing_exercise_is_not_found() {
    let harness = create_test_resources().await.unwrap();

    let err = harness
        .resources
        .exercises
        .update(404, ExercisePayload::default())
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_delete_removes_media_file() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let exercise = create_exercise(resources, "Disposable").await.unwrap();
    let stored = harness.media_dir.path().join(&exercise.filename);
    assert!(stored.exists());

    resources.exercises.delete(exercise.id).await.unwrap();

    assert!(!stored.exists());
    let err = resources.exercises.find(exercise.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_delete_refuses_while_block_references_exercise() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let exercise = create_exercise(resources, "Anchored").await.unwrap();
    let block = create_block(resources, "Anchor").await.unwrap();
    resources
        .blocks
        .add_exercise(block.id, exercise.id, Side::None)
        .await
        .unwrap();

    let err = resources.exercises.delete(exercise.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ReferencedEntity);
    assert!(err.message.contains(&format!("block {}", block.id)));

    // A soft-deleted block no longer counts as a live referrer
    resources.blocks.delete(block.id).await.unwrap();
    resources.exercises.delete(exercise.id).await.unwrap();
}

#[tokio::test]
async fn test_deleted_exercise_disappears_from_listings() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let keep = create_exercise(resources, "Kept Move").await.unwrap();
    let gone = create_exercise(resources, "Gone Move").await.unwrap();
    resources.exercises.delete(gone.id).await.unwrap();

    let listed = resources
        .exercises
        .list(&ExerciseListFilter::default())
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);
}
