// ABOUTME: Media storage abstraction for exercise video and image files
// ABOUTME: Unifies upload, deletion, and liveness checks behind one async trait

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use regex::Regex;

use crate::constants::media::{FALLBACK_FILENAME, MAX_FILENAME_LENGTH};

pub mod local;

pub use local::LocalMediaStorage;

/// Backend-agnostic media store
///
/// Stored names are opaque to callers: `upload` returns the path under which
/// the payload lives and `delete` takes that same path back.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn upload(&self, name: &str, data: Bytes, content_type: &str) -> Result<String>;

    async fn delete(&self, path: &str) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}

/// Characters that never appear in a stored media name
static UNSAFE_CHARS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_.-]").ok());

/// Reduce arbitrary text to a safe storage name
///
/// Unsupported characters become underscores, the result is lowercased and
/// capped at [`MAX_FILENAME_LENGTH`], and an empty result falls back to
/// [`FALLBACK_FILENAME`].
pub fn sanitize_filename(raw: &str) -> String {
    let replaced = match UNSAFE_CHARS.as_ref() {
        Some(re) => re.replace_all(raw, "_").into_owned(),
        None => raw.replace(
            |c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')),
            "_",
        ),
    };

    let mut sanitized = replaced.to_lowercase().trim().to_string();
    if sanitized.len() > MAX_FILENAME_LENGTH {
        sanitized.truncate(MAX_FILENAME_LENGTH);
    }
    if sanitized.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }
    sanitized
}

/// Build the storage name for an upload: the sanitized title plus the
/// original file's extension
pub fn make_filename(title: &str, original_name: &str) -> String {
    let sanitized = sanitize_filename(title);
    match Path::new(original_name)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
    {
        Some(ext) => format!("{sanitized}.{ext}"),
        None => sanitized,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_and_lowercases() {
        assert_eq!(sanitize_filename("Push Ups!"), "push_ups_");
        assert_eq!(sanitize_filename("Приседания"), "__________");
        assert_eq!(sanitize_filename("squat-2.v1"), "squat-2.v1");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename(""), FALLBACK_FILENAME);
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "a".repeat(400);
        assert_eq!(sanitize_filename(&long).len(), MAX_FILENAME_LENGTH);
    }

    #[test]
    fn test_make_filename_keeps_extension() {
        assert_eq!(make_filename("Push Ups", "clip.MP4"), "push_ups.MP4");
        assert_eq!(make_filename("Push Ups", "clip"), "push_ups");
        assert_eq!(make_filename("Plank", "demo.tar.gz"), "plank.gz");
    }
}
