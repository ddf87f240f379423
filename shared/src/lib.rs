//! Shared types for Chanthana
//!
//! Raw table-record wire types, the field reader/writer used by the record
//! mappers, typed view models for every table, and the ordering, event and
//! dashboard logic that sits on top of them.

pub mod cart;
pub mod dashboard;
pub mod draft;
pub mod error;
pub mod fields;
pub mod models;
pub mod record;

// Re-exports
pub use error::{ValidationError, ValidationResult};
pub use fields::{Fields, FieldsBuilder};
pub use record::{AirtableRecord, ListResponse};
pub use serde::{Deserialize, Serialize};
