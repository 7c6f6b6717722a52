//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across all Bazaar components:
//! - `dashboard` - Admin back-office and vendor dashboard API
//! - `cli` - Command-line tools for migrations and user provisioning
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Database encoding for IDs and enums is available behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, slugs, statuses and the dashboard [`Mode`]
//! - [`table`] - The list-view fetch contract and mutation state
//! - [`validation`] - Per-field validation errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod table;
pub mod types;
pub mod validation;

pub use table::{
    ColumnFilter, FetchRequest, FetchResponse, MutationKind, MutationState, PageWindow,
    SortDirection, SortSpec, TableRequestError,
};
pub use types::*;
pub use validation::FieldErrors;
