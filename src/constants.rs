// ABOUTME: System-wide constants for timing arithmetic, media handling, and server defaults
// ABOUTME: Provides named constants to eliminate magic numbers in the composition engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Constants Module
//!
//! Named constants shared across the composition engine and its plumbing.

/// Block timing-fit bounds and cycle arithmetic
pub mod timing {
    /// Seconds per minute
    pub const SECONDS_PER_MINUTE: u32 = 60;

    /// Lower clamp for a block's total duration, in minutes
    pub const TOTAL_DURATION_MIN: u8 = 10;

    /// Upper clamp for a block's total duration, in minutes
    pub const TOTAL_DURATION_MAX: u8 = 60;

    /// Lower clamp for per-slot rest time, in seconds
    pub const RELAX_TIME_MIN: u8 = 0;

    /// Upper clamp for per-slot rest time, in seconds
    pub const RELAX_TIME_MAX: u8 = 30;

    /// Lower clamp for per-slot active time, in seconds
    pub const ON_TIME_MIN: u8 = 20;

    /// Upper clamp for per-slot active time, in seconds
    pub const ON_TIME_MAX: u8 = 60;

    /// Slot cycle length the rebalance step normalizes to, in seconds
    pub const REBALANCED_CYCLE: u8 = 60;

    /// Rounding step applied to active time during rebalance, in seconds
    pub const ON_TIME_ROUNDING_STEP: u8 = 10;
}

/// Media filename and upload limits
pub mod media {
    /// Maximum length of a sanitized media filename, in characters
    pub const MAX_FILENAME_LENGTH: usize = 255;

    /// Filename used when sanitization leaves nothing usable
    pub const FALLBACK_FILENAME: &str = "unnamed_file";

    /// Maximum accepted upload body size, in bytes
    pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;
}

/// Session and registration limits
pub mod auth {
    /// Authorization header scheme prefix for session tokens
    pub const TOKEN_SCHEME_PREFIX: &str = "Token token=";

    /// Registration is refused once this many users exist
    pub const MAX_REGISTERED_USERS: i64 = 2;
}

/// Server defaults applied when environment variables are absent
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8080;

    /// Default database connection string
    pub const DATABASE_URL: &str = "sqlite:data/blockfit.db";

    /// Default root directory for locally stored media
    pub const MEDIA_ROOT: &str = "data/media";
}
