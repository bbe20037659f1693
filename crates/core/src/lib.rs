//! ClipJoint Core - Shared domain types.
//!
//! This crate provides common types used across all ClipJoint components:
//! - `site` - Public booking site and staff order pages
//! - `admin` - Staff console for orders, reviews, masters, and services
//! - `cli` - Command-line tools for migrations, staff accounts, and seed data
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, phone numbers, ratings,
//!   emails, and the order/review/staff status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
