//! StudyHub Core - Shared types library.
//!
//! This crate provides common types used across all StudyHub components:
//! - `catalog` - Session and catalog synchronization core
//! - `integration-tests` - End-to-end scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no async, no store access.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, prices, statuses, and the domain records
//!   (courses, resources, profiles, entitlements)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
