//! Data models
//!
//! Typed views of the rows in each table. Every model has an infallible
//! `from_record` mapper that applies defaults for missing columns, and the
//! create/update payloads expose `to_fields` for the write path.

pub mod client;
pub mod dish;
pub mod event;
pub mod menu_type;
pub mod order;
pub mod status;

// Re-exports
pub use client::*;
pub use dish::*;
pub use event::*;
pub use menu_type::*;
pub use order::*;
pub use status::*;

/// Table names of the restaurant base
pub mod tables {
    pub const CLIENTS: &str = "Client DB";
    pub const DISHES: &str = "Plats DB";
    pub const ORDERS: &str = "Commandes DB";
    pub const ORDER_LINES: &str = "Passage Commande DB";
    pub const EVENTS: &str = "Événements DB";
    pub const EVENT_MENU_TYPES: &str = "Menus Événementiels Types DB";

    /// Every table the client knows about
    pub const ALL: &[&str] = &[
        CLIENTS,
        DISHES,
        ORDERS,
        ORDER_LINES,
        EVENTS,
        EVENT_MENU_TYPES,
    ];
}

/// Parse the record's creation timestamp, if present
pub(crate) fn created_at(record: &crate::AirtableRecord) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(&record.created_time)
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Utc))
}
