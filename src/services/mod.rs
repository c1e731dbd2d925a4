// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Owns composition rules: timing fit, draft gating, ordering, and safe deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Domain service layer
//!
//! Business logic for the composition engine, kept out of the route handlers.
//! Services decide error codes, run multi-step flows under transactions, and
//! hand hydrated read models back to the HTTP layer.

/// Block operations: timing fit on write, capacity-gated membership, hydration
pub mod blocks;

/// Exercise operations: media-backed creation, merge updates, safe deletion
pub mod exercises;

/// Shared lifecycle rules: presence checks and the draft gate
pub mod lifecycle;

/// Tag operations: creation and listing
pub mod tags;

/// Timing arithmetic: clamping, consistency, and slot capacity
pub mod timing;

/// Training operations: ordered block membership and hydration
pub mod trainings;
