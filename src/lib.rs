// ABOUTME: Main library entry point for the Blockfit workout composition API
// ABOUTME: Exposes exercises, blocks, trainings, tags, and session auth over REST
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Blockfit Server
//!
//! A workout composition backend. Coaches assemble a library of exercises,
//! group them into timed blocks, and chain blocks into trainings; the server
//! keeps the timing arithmetic honest and the references safe.
//!
//! ## Features
//!
//! - **Composition model**: exercises join blocks in explicit order, blocks
//!   join trainings the same way
//! - **Timing fit**: block timing is normalized so the interval grid always
//!   divides the total duration
//! - **Draft lifecycle**: membership edits require the parent to be a draft
//! - **Safe deletion**: soft deletes that refuse while live referrers remain
//! - **Session auth**: bearer session tokens with a capped user count
//!
//! ## Architecture
//!
//! - **Models**: entities, read models, and request payloads
//! - **Database**: `SQLite` persistence with transaction guards
//! - **Services**: composition rules between the routes and the database
//! - **Routes**: axum handlers, one module per resource
//! - **Storage**: media files behind an async trait
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use blockfit_server::config::ServerConfig;
//! use blockfit_server::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     // Load configuration
//!     let config = ServerConfig::from_env()?;
//!
//!     println!("Blockfit server configured with port: HTTP={}", config.http_port);
//!
//!     Ok(())
//! }
//! ```

/// Session registration, login, and token verification
pub mod auth;

/// Configuration loaded from environment variables
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// `SQLite` persistence layer
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Production logging and structured output
pub mod logging;

/// HTTP middleware for cross-origin request handling
pub mod middleware;

/// Entities, read models, and request payloads
pub mod models;

/// Shared dependency container handed to every route
pub mod resources;

/// `HTTP` routes for the REST API
pub mod routes;

/// Domain service layer holding the composition rules
pub mod services;

/// Media file storage behind an async trait
pub mod storage;
