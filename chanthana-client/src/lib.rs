//! Chanthana Client - Airtable access for the restaurant
//!
//! Configuration storage, the REST client, the query cache and the
//! [`Store`] facade the front-ends read and write through.

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod store;

pub use cache::{QueryCache, QueryKey};
pub use config::{AirtableConfig, ClientConfig, ConfigStore};
pub use error::{ClientError, ClientResult};
pub use http::{AirtableClient, ListOptions};
pub use store::{PlacedOrder, Store};

// Re-export shared types for convenience
pub use shared;
