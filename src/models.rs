// ABOUTME: Core data models for the workout composition domain
// ABOUTME: Defines Exercise, Block, Training, association entities, and hydrated read models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Data Models
//!
//! Core data structures used throughout the BlockFit server.
//!
//! Entities (`Exercise`, `Block`, `Training`, `Tag`, `User`, `Session`) map
//! one-to-one onto database rows. Association entities (`ExerciseBlock`,
//! `TrainingBlock`) carry the insertion order that the composition engine
//! maintains. Read models (`BlockDetail`, `TrainingDetail`, `ExerciseView`)
//! are the stable presentation shapes handed to the route layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Which side of the body an exercise slot targets
///
/// Unrecognized values normalize to [`Side::None`] rather than failing, so a
/// client sending an unexpected tag simply gets an unsided slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    Left,
    Right,
    #[default]
    None,
}

impl Side {
    /// Wire and storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::None => "",
        }
    }

    /// Lenient parse: anything outside {"left","right"} becomes `None`
    pub fn parse(raw: &str) -> Self {
        match raw {
            "left" => Side::Left,
            "right" => Side::Right,
            _ => Side::None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Side {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Side {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Side::parse(&raw))
    }
}

/// An atomic exercise with localized titles and stored media
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Database identifier
    pub id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; `Some` means logically removed
    pub deleted_at: Option<DateTime<Utc>>,
    /// English title (unique)
    pub title_en: String,
    /// Russian title (unique)
    pub title_ru: String,
    /// Opaque storage path of the uploaded media
    pub filename: String,
    /// Free-text coaching tips
    pub tips: Vec<String>,
}

impl Exercise {
    /// Whether the row is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A timed unit composed of an ordered list of exercise slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Database identifier
    pub id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; `Some` means logically removed
    pub deleted_at: Option<DateTime<Utc>>,
    /// English title (unique)
    pub title_en: String,
    /// Russian title (unique)
    pub title_ru: String,
    /// Total block duration in minutes
    pub total_duration: u8,
    /// Active time per exercise slot in seconds
    pub on_time: u8,
    /// Rest time between slots in seconds
    pub relax_time: u8,
    /// Draft state; child edits are only allowed while true
    pub draft: bool,
}

impl Block {
    /// Whether the row is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Membership of an exercise in a block, with insertion order and side tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseBlock {
    /// Owning block id (composite key part)
    pub block_id: i64,
    /// Member exercise id (composite key part)
    pub exercise_id: i64,
    /// Insertion order; monotone per block, gaps permitted after removals
    pub exercise_order: i64,
    /// Optional side tag for the slot
    pub side: Side,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// An ordered list of blocks forming a full workout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Training {
    /// Database identifier
    pub id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; `Some` means logically removed
    pub deleted_at: Option<DateTime<Utc>>,
    /// English title
    pub title_en: String,
    /// Russian title
    pub title_ru: String,
    /// Draft state; child edits are only allowed while true
    pub draft: bool,
}

impl Training {
    /// Whether the row is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Membership of a block in a training, with insertion order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingBlock {
    /// Owning training id (composite key part)
    pub training_id: i64,
    /// Member block id (composite key part)
    pub block_id: i64,
    /// Insertion order; monotone per training, gaps permitted after removals
    pub block_order: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A label attachable to exercises
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Database identifier
    pub id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// English title (unique)
    pub title_en: String,
    /// Russian title (unique)
    pub title_ru: String,
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Database identifier
    pub id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Unique login name
    pub login: String,
    /// bcrypt password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// An authenticated session; the id doubles as the bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session token
    pub id: Uuid,
    /// Owning user
    pub user_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Read models (presentation boundary)
// ============================================================================

/// One hydrated exercise slot inside a block
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockExerciseView {
    /// Member exercise id
    pub exercise_id: i64,
    /// Display position, re-sequenced 0..n-1 over any stored-order gaps
    pub order: i64,
    /// Side tag for the slot
    pub side: Side,
    /// English title of the exercise
    pub title_en: String,
    /// Russian title of the exercise
    pub title_ru: String,
    /// Media storage path of the exercise
    pub filename: String,
}

/// Block summary: the block row plus its ordered member exercise ids
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title_en: String,
    pub title_ru: String,
    /// Minutes
    pub total_duration: u8,
    /// Seconds
    pub on_time: u8,
    /// Seconds
    pub relax_time: u8,
    pub draft: bool,
    /// Member exercise ids sorted by insertion order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub exercises_ids: Vec<i64>,
}

impl BlockSummary {
    /// Build the summary shape from an entity and its ordered member ids
    pub fn from_entity(block: Block, exercises_ids: Vec<i64>) -> Self {
        Self {
            id: block.id,
            created_at: block.created_at,
            title_en: block.title_en,
            title_ru: block.title_ru,
            total_duration: block.total_duration,
            on_time: block.on_time,
            relax_time: block.relax_time,
            draft: block.draft,
            exercises_ids,
        }
    }
}

/// Fully hydrated block: summary fields plus per-slot exercise views
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDetail {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title_en: String,
    pub title_ru: String,
    /// Minutes
    pub total_duration: u8,
    /// Seconds
    pub on_time: u8,
    /// Seconds
    pub relax_time: u8,
    pub draft: bool,
    /// Member exercise ids sorted by insertion order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub exercises_ids: Vec<i64>,
    /// Ordered slot views with titles and media paths
    pub exercises: Vec<BlockExerciseView>,
}

impl BlockDetail {
    /// Drop the per-slot views, keeping the summary shape
    pub fn into_summary(self) -> BlockSummary {
        BlockSummary {
            id: self.id,
            created_at: self.created_at,
            title_en: self.title_en,
            title_ru: self.title_ru,
            total_duration: self.total_duration,
            on_time: self.on_time,
            relax_time: self.relax_time,
            draft: self.draft,
            exercises_ids: self.exercises_ids,
        }
    }
}

/// Hydrated training: the training row plus its ordered block summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingDetail {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title_en: String,
    pub title_ru: String,
    pub draft: bool,
    /// Member block ids sorted by insertion order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub block_ids: Vec<i64>,
    /// Ordered block summaries
    pub blocks: Vec<BlockSummary>,
}

/// Exercise as presented to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseView {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title_en: String,
    pub title_ru: String,
    /// Media storage path
    pub filename: String,
    pub tips: Vec<String>,
    /// Attached tag ids
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tag_ids: Vec<i64>,
}

impl ExerciseView {
    /// Build the presentation shape from an entity and its tag ids
    pub fn from_entity(exercise: Exercise, tag_ids: Vec<i64>) -> Self {
        Self {
            id: exercise.id,
            created_at: exercise.created_at,
            title_en: exercise.title_en,
            title_ru: exercise.title_ru,
            filename: exercise.filename,
            tips: exercise.tips,
            tag_ids,
        }
    }
}

/// Tag as presented to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagView {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title_en: String,
    pub title_ru: String,
}

impl From<Tag> for TagView {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            created_at: tag.created_at,
            title_en: tag.title_en,
            title_ru: tag.title_ru,
        }
    }
}

/// Session token handed back by register/login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: Uuid,
}

// ============================================================================
// Request payloads
// ============================================================================

/// Sort direction for `updated_at` ordering in list operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// The SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Create/update payload for blocks; empty or zero fields mean "no change"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockPayload {
    pub title_en: String,
    pub title_ru: String,
    /// Minutes; zero means "keep existing"
    pub total_duration: u8,
    /// Seconds; zero means "keep existing"
    pub on_time: u8,
    /// Seconds; always applied, zero is a valid rest time
    pub relax_time: u8,
}

/// Create/update payload for trainings; empty fields mean "no change"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingPayload {
    pub title_en: String,
    pub title_ru: String,
}

/// Update payload for exercises; empty fields mean "no change"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExercisePayload {
    pub title_en: String,
    pub title_ru: String,
    pub tips: Vec<String>,
}

/// Body of the add-exercise-to-block operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddExercisePayload {
    /// Requested side tag; unrecognized values normalize to none
    pub side: Side,
}

/// List filter for blocks and trainings
///
/// Precedence: `suggestion` beats `state`, which beats the plain
/// `updated_at`-ordered listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListFilter {
    /// Case-insensitive substring matched against both locale titles
    pub suggestion: String,
    /// "draft" or "ready"; anything else is ignored
    pub state: String,
    /// Sort direction on `updated_at`
    pub updated_at: SortDirection,
}

/// List filter for exercises
///
/// Precedence: `block_ids` beats `suggestion`, which beats the plain
/// `updated_at`-ordered listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseListFilter {
    /// Restrict to exercises appearing in any of these blocks
    pub block_ids: Vec<i64>,
    /// Case-insensitive substring matched against both locale titles
    pub suggestion: String,
    /// Sort direction on `updated_at`
    pub updated_at: SortDirection,
}

/// Payload for tag creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagPayload {
    pub title_en: String,
    pub title_ru: String,
}

/// Register/login credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsPayload {
    pub login: String,
    pub password: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_side_lenient_parse() {
        assert_eq!(Side::parse("left"), Side::Left);
        assert_eq!(Side::parse("right"), Side::Right);
        assert_eq!(Side::parse(""), Side::None);
        assert_eq!(Side::parse("upside-down"), Side::None);
    }

    #[test]
    fn test_side_serde_round_trip() {
        let json = serde_json::to_string(&Side::Left).unwrap();
        assert_eq!(json, "\"left\"");

        let parsed: Side = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(parsed, Side::Right);

        // Unknown tags deserialize to None instead of erroring
        let parsed: Side = serde_json::from_str("\"sideways\"").unwrap();
        assert_eq!(parsed, Side::None);

        let json = serde_json::to_string(&Side::None).unwrap();
        assert_eq!(json, "\"\"");
    }

    #[test]
    fn test_sort_direction_defaults_to_desc() {
        let filter: ListFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(filter.updated_at, SortDirection::Desc);
        assert_eq!(filter.updated_at.as_sql(), "DESC");

        let filter: ListFilter = serde_json::from_str(r#"{"updatedAt":"ASC"}"#).unwrap();
        assert_eq!(filter.updated_at.as_sql(), "ASC");
    }

    #[test]
    fn test_block_payload_defaults() {
        let payload: BlockPayload = serde_json::from_str(r#"{"titleEn":"Legs"}"#).unwrap();
        assert_eq!(payload.title_en, "Legs");
        assert_eq!(payload.total_duration, 0);
        assert_eq!(payload.relax_time, 0);
    }
}
