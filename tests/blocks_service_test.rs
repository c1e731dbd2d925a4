// ABOUTME: Integration tests for block composition rules
// ABOUTME: Covers timing fit, slot capacity, draft gating, ordering, and safe deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use blockfit_server::errors::ErrorCode;
use blockfit_server::models::{ListFilter, Side, SortDirection};

use common::{block_payload, create_block, create_exercise, create_test_resources};

#[tokio::test]
async fn test_create_fits_inconsistent_timing() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    // 33 min of 37s + 11s cycles does not divide evenly
    let block = resources
        .blocks
        .create(block_payload("Morning Flow", 33, 37, 11))
        .await
        .unwrap();

    assert_eq!(block.total_duration, 33);
    assert_eq!(block.on_time, 40);
    assert_eq!(block.relax_time, 20);
    assert!(block.draft);
    assert!(block.exercises.is_empty());
    assert!(block.exercises_ids.is_empty());
}

#[tokio::test]
async fn test_create_keeps_consistent_timing() {
    let harness = create_test_resources().await.unwrap();

    let block = harness
        .resources
        .blocks
        .create(block_payload("Tabata", 20, 40, 20))
        .await
        .unwrap();

    assert_eq!(block.total_duration, 20);
    assert_eq!(block.on_time, 40);
    assert_eq!(block.relax_time, 20);
}

#[tokio::test]
async fn test_create_clamps_out_of_range_timing() {
    let harness = create_test_resources().await.unwrap();

    let block = harness
        .resources
        .blocks
        .create(block_payload("Extremes", 0, 0, 200))
        .await
        .unwrap();

    // 10 min of 20s + 30s cycles is exactly 12 slots
    assert_eq!(block.total_duration, 10);
    assert_eq!(block.on_time, 20);
    assert_eq!(block.relax_time, 30);
}

#[tokio::test]
async fn test_create_duplicate_title_is_validation_error() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    create_block(resources, "Core").await.unwrap();
    let err = resources
        .blocks
        .create(block_payload("Core", 15, 30, 30))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_find_missing_block_is_not_found() {
    let harness = create_test_resources().await.unwrap();

    let err = harness.resources.blocks.find(42).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(err.message.contains("block 42"));
}

#[tokio::test]
async fn test_update_merges_and_refits() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let block = create_block(resources, "Strength A").await.unwrap();

    // Empty title and zero total keep stored values; on and relax change
    let mut payload = block_payload("", 0, 45, 13);
    payload.title_ru = "Сила".to_string();
    let updated = resources.blocks.update(block.id, payload).await.unwrap();

    assert_eq!(updated.title_en, "Strength A");
    assert_eq!(updated.title_ru, "Сила");
    assert_eq!(updated.total_duration, 30);
    // 45s + 13s does not divide 30 min: on rounds up to 50, relax becomes 10
    assert_eq!(updated.on_time, 50);
    assert_eq!(updated.relax_time, 10);
}

#[tokio::test]
async fn test_update_applies_zero_relax_time() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let block = resources
        .blocks
        .create(block_payload("Intervals", 10, 20, 10))
        .await
        .unwrap();
    assert_eq!(block.relax_time, 10);

    // An all-default payload still carries relax_time = 0, which is applied
    let updated = resources
        .blocks
        .update(block.id, block_payload("", 0, 0, 0))
        .await
        .unwrap();

    assert_eq!(updated.total_duration, 10);
    assert_eq!(updated.on_time, 20);
    assert_eq!(updated.relax_time, 0);
}

#[tokio::test]
async fn test_toggle_draft_flips_both_ways() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let block = create_block(resources, "Cycle").await.unwrap();
    assert!(block.draft);

    let ready = resources.blocks.toggle_draft(block.id).await.unwrap();
    assert!(!ready.draft);

    let draft_again = resources.blocks.toggle_draft(block.id).await.unwrap();
    assert!(draft_again.draft);
}

#[tokio::test]
async fn test_add_exercise_keeps_insertion_order() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let block = create_block(resources, "Full Body").await.unwrap();
    let squat = create_exercise(resources, "Squat").await.unwrap();
    let plank = create_exercise(resources, "Plank").await.unwrap();
    let lunge = create_exercise(resources, "Lunge").await.unwrap();

    resources
        .blocks
        .add_exercise(block.id, squat.id, Side::None)
        .await
        .unwrap();
    resources
        .blocks
        .add_exercise(block.id, plank.id, Side::Left)
        .await
        .unwrap();
    let detail = resources
        .blocks
        .add_exercise(block.id, lunge.id, Side::None)
        .await
        .unwrap();

    assert_eq!(detail.exercises_ids, vec![squat.id, plank.id, lunge.id]);
    let orders: Vec<i64> = detail.exercises.iter().map(|slot| slot.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert_eq!(detail.exercises[1].side, Side::Left);
    assert_eq!(detail.exercises[0].title_en, "Squat");
}

#[tokio::test]
async fn test_add_exercise_to_ready_block_is_invalid_state() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let block = create_block(resources, "Published").await.unwrap();
    let exercise = create_exercise(resources, "Burpee").await.unwrap();
    resources.blocks.toggle_draft(block.id).await.unwrap();

    let err = resources
        .blocks
        .add_exercise(block.id, exercise.id, Side::None)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidState);
}

#[tokio::test]
async fn test_add_duplicate_exercise_is_validation_error() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let block = create_block(resources, "Repeats").await.unwrap();
    let exercise = create_exercise(resources, "Row").await.unwrap();

    resources
        .blocks
        .add_exercise(block.id, exercise.id, Side::None)
        .await
        .unwrap();
    let err = resources
        .blocks
        .add_exercise(block.id, exercise.id, Side::None)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_add_exercise_to_full_block_is_refused() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    // 10 min of 60s + 0s cycles: exactly 10 slots
    let block = resources
        .blocks
        .create(block_payload("Dense", 10, 60, 0))
        .await
        .unwrap();

    for i in 0..10 {
        let exercise = create_exercise(resources, &format!("Filler {i}")).await.unwrap();
        resources
            .blocks
            .add_exercise(block.id, exercise.id, Side::None)
            .await
            .unwrap();
    }

    let extra = create_exercise(resources, "One Too Many").await.unwrap();
    let err = resources
        .blocks
        .add_exercise(block.id, extra.id, Side::None)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Full);
}

#[tokio::test]
async fn test_remove_unlinked_exercise_is_not_found() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let block = create_block(resources, "Sparse").await.unwrap();
    let exercise = create_exercise(resources, "Dip").await.unwrap();

    let err = resources
        .blocks
        .remove_exercise(block.id, exercise.id)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(err
        .message
        .contains(&format!("exercise {} in block {}", exercise.id, block.id)));

    // The failed removal leaves the block untouched
    let detail = resources.blocks.find(block.id).await.unwrap();
    assert!(detail.exercises.is_empty());
}

#[tokio::test]
async fn test_remove_and_readd_resequences_slot_views() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let block = create_block(resources, "Rotation").await.unwrap();
    let a = create_exercise(resources, "A Hold").await.unwrap();
    let b = create_exercise(resources, "B Hold").await.unwrap();
    let c = create_exercise(resources, "C Hold").await.unwrap();

    for exercise in [&a, &b, &c] {
        resources
            .blocks
            .add_exercise(block.id, exercise.id, Side::None)
            .await
            .unwrap();
    }

    // Drop the middle slot, then append a new one over the gap
    resources.blocks.remove_exercise(block.id, b.id).await.unwrap();
    let d = create_exercise(resources, "D Hold").await.unwrap();
    let detail = resources
        .blocks
        .add_exercise(block.id, d.id, Side::None)
        .await
        .unwrap();

    assert_eq!(detail.exercises_ids, vec![a.id, c.id, d.id]);
    let orders: Vec<i64> = detail.exercises.iter().map(|slot| slot.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);

    // Stored orders keep the gap and never reuse the removed slot
    let stored: Vec<i64> = sqlx::query_scalar(
        "SELECT exercise_order FROM exercises_blocks WHERE block_id = $1 ORDER BY exercise_order",
    )
    .bind(block.id)
    .fetch_all(resources.database.pool())
    .await
    .unwrap();
    assert_eq!(stored, vec![0, 2, 3]);
}

#[tokio::test]
async fn test_remove_exercise_from_ready_block_is_invalid_state() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let block = create_block(resources, "Sealed").await.unwrap();
    let exercise = create_exercise(resources, "Held Move").await.unwrap();
    resources
        .blocks
        .add_exercise(block.id, exercise.id, Side::None)
        .await
        .unwrap();
    resources.blocks.toggle_draft(block.id).await.unwrap();

    let err = resources
        .blocks
        .remove_exercise(block.id, exercise.id)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidState);
}

#[tokio::test]
async fn test_delete_refuses_while_training_references_block() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let block = create_block(resources, "Shared").await.unwrap();
    let training = resources
        .trainings
        .create(common::training_payload("Monday"))
        .await
        .unwrap();
    resources
        .trainings
        .add_block(training.id, block.id)
        .await
        .unwrap();

    let err = resources.blocks.delete(block.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ReferencedEntity);
    assert!(err.message.contains(&format!("training {}", training.id)));

    // Releasing the reference unblocks deletion
    resources
        .trainings
        .remove_block(training.id, block.id)
        .await
        .unwrap();
    resources.blocks.delete(block.id).await.unwrap();

    let err = resources.blocks.find(block.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_delete_twice_is_not_found() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let block = create_block(resources, "Ephemeral").await.unwrap();
    resources.blocks.delete(block.id).await.unwrap();

    let err = resources.blocks.delete(block.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_list_state_filter_splits_draft_and_ready() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let legs = create_block(resources, "Leg Day").await.unwrap();
    let arms = create_block(resources, "Arm Day").await.unwrap();
    resources.blocks.toggle_draft(arms.id).await.unwrap();

    let drafts = resources
        .blocks
        .list(&ListFilter {
            state: "draft".to_string(),
            ..ListFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].id, legs.id);

    let ready = resources
        .blocks
        .list(&ListFilter {
            state: "ready".to_string(),
            ..ListFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].id, arms.id);

    // Unknown state strings fall back to the unfiltered listing
    let all = resources
        .blocks
        .list(&ListFilter {
            state: "archived".to_string(),
            ..ListFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_list_suggestion_beats_state_filter() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let arms = create_block(resources, "Arm Day").await.unwrap();
    create_block(resources, "Leg Day").await.unwrap();
    resources.blocks.toggle_draft(arms.id).await.unwrap();

    // The suggestion matches the ready block even though state says draft
    let found = resources
        .blocks
        .list(&ListFilter {
            suggestion: "ARM".to_string(),
            state: "draft".to_string(),
            updated_at: SortDirection::Desc,
        })
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, arms.id);
}

#[tokio::test]
async fn test_list_orders_by_updated_at() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let old = create_block(resources, "Older").await.unwrap();
    let new = create_block(resources, "Newer").await.unwrap();

    // CURRENT_TIMESTAMP has second resolution; pin distinct values directly
    for (id, stamp) in [(old.id, "2024-01-01 08:00:00"), (new.id, "2024-06-01 08:00:00")] {
        sqlx::query("UPDATE blocks SET updated_at = $1 WHERE id = $2")
            .bind(stamp)
            .bind(id)
            .execute(resources.database.pool())
            .await
            .unwrap();
    }

    let desc = resources.blocks.list(&ListFilter::default()).await.unwrap();
    assert_eq!(
        desc.iter().map(|block| block.id).collect::<Vec<_>>(),
        vec![new.id, old.id]
    );

    let asc = resources
        .blocks
        .list(&ListFilter {
            updated_at: SortDirection::Asc,
            ..ListFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(
        asc.iter().map(|block| block.id).collect::<Vec<_>>(),
        vec![old.id, new.id]
    );
}

#[tokio::test]
async fn test_list_excludes_deleted_and_carries_member_ids() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let keep = create_block(resources, "Keeper").await.unwrap();
    let gone = create_block(resources, "Goner").await.unwrap();
    let exercise = create_exercise(resources, "Bridge").await.unwrap();
    resources
        .blocks
        .add_exercise(keep.id, exercise.id, Side::None)
        .await
        .unwrap();
    resources.blocks.delete(gone.id).await.unwrap();

    let listed = resources.blocks.list(&ListFilter::default()).await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);
    assert_eq!(listed[0].exercises_ids, vec![exercise.id]);
}
