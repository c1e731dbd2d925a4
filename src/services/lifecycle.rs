// ABOUTME: Shared lifecycle rules for soft-deleted and draft-gated entities
// ABOUTME: Presence checks treat deleted rows as missing; the draft gate guards child edits

use crate::errors::{AppError, AppResult};
use crate::models::{Block, Exercise, Training};

/// An entity with an id and a soft-delete marker
pub trait Resource {
    /// Name used in error messages
    const NAME: &'static str;

    fn id(&self) -> i64;
    fn is_deleted(&self) -> bool;
}

/// A resource with a draft/ready lifecycle
pub trait Publishable: Resource {
    fn is_draft(&self) -> bool;
}

impl Resource for Exercise {
    const NAME: &'static str = "exercise";

    fn id(&self) -> i64 {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted()
    }
}

impl Resource for Block {
    const NAME: &'static str = "block";

    fn id(&self) -> i64 {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted()
    }
}

impl Publishable for Block {
    fn is_draft(&self) -> bool {
        self.draft
    }
}

impl Resource for Training {
    const NAME: &'static str = "training";

    fn id(&self) -> i64 {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted()
    }
}

impl Publishable for Training {
    fn is_draft(&self) -> bool {
        self.draft
    }
}

/// Unwrap a lookup result, treating missing and soft-deleted rows alike
///
/// # Errors
///
/// Returns a not-found error when the entity is absent or soft-deleted
pub fn ensure_present<T: Resource>(entity: Option<T>, id: i64) -> AppResult<T> {
    match entity {
        Some(entity) if !entity.is_deleted() => Ok(entity),
        _ => Err(AppError::not_found(format!("{} {id}", T::NAME))
            .with_resource_id(id.to_string())),
    }
}

/// Reject membership edits on published parents
///
/// # Errors
///
/// Returns an invalid-state error when the entity has left draft state
pub fn ensure_draft<T: Publishable>(entity: &T) -> AppResult<()> {
    if entity.is_draft() {
        Ok(())
    } else {
        Err(
            AppError::invalid_state(format!("{} {} is not in draft state", T::NAME, entity.id()))
                .with_resource_id(entity.id().to_string()),
        )
    }
}
