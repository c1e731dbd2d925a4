// ABOUTME: Integration tests for tag creation and listing
// ABOUTME: Covers title uniqueness and the newest-first listing order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use blockfit_server::errors::ErrorCode;
use blockfit_server::models::TagPayload;

use common::create_test_resources;

fn tag_payload(title: &str) -> TagPayload {
    TagPayload {
        title_en: title.to_string(),
        title_ru: format!("{title} (ru)"),
    }
}

#[tokio::test]
async fn test_create_and_list_round_trip() {
    let harness = create_test_resources().await.unwrap();
    let tags = &harness.resources.tags;

    let cardio = tags.create(tag_payload("Cardio")).await.unwrap();
    let balance = tags.create(tag_payload("Balance")).await.unwrap();

    let listed = tags.list().await.unwrap();

    assert_eq!(listed.len(), 2);
    let ids: Vec<i64> = listed.iter().map(|tag| tag.id).collect();
    assert!(ids.contains(&cardio.id));
    assert!(ids.contains(&balance.id));
    let cardio_view = listed.iter().find(|tag| tag.id == cardio.id).unwrap();
    assert_eq!(cardio_view.title_en, "Cardio");
    assert_eq!(cardio_view.title_ru, "Cardio (ru)");
}

#[tokio::test]
async fn test_create_duplicate_title_is_validation_error() {
    let harness = create_test_resources().await.unwrap();
    let tags = &harness.resources.tags;

    tags.create(tag_payload("Strength")).await.unwrap();
    let err = tags.create(tag_payload("Strength")).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_list_orders_newest_first() {
    let harness = create_test_resources().await.unwrap();
    let resources = &harness.resources;

    let old = resources.tags.create(tag_payload("Older")).await.unwrap();
    let new = resources.tags.create(tag_payload("Newer")).await.unwrap();

    // CURRENT_TIMESTAMP has second resolution; pin distinct values directly
    for (id, stamp) in [(old.id, "2024-01-01 08:00:00"), (new.id, "2024-06-01 08:00:00")] {
        sqlx::query("UPDATE tags SET updated_at = $1 WHERE id = $2")
            .bind(stamp)
            .bind(id)
            .execute(resources.database.pool())
            .await
            .unwrap();
    }

    let listed = resources.tags.list().await.unwrap();

    assert_eq!(
        listed.iter().map(|tag| tag.id).collect::<Vec<_>>(),
        vec![new.id, old.id]
    );
}
