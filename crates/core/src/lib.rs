//! Harbor Core - Shared types library.
//!
//! This crate provides the value types used by the Harbor components:
//! - `storefront` - Customer-facing e-commerce site
//! - `cli` - Command-line tools for session storage and API checks
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. The remote commerce API owns every entity; these types
//! only give its loosely typed JSON values a checked shape.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, money, emails, phone numbers and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
