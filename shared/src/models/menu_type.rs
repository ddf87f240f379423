//! Event Menu Template Model (`Menus Événementiels Types DB`)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EventType;
use crate::AirtableRecord;

/// Column names of `Menus Événementiels Types DB`
pub mod columns {
    pub const NAME: &str = "Nom menu type";
    pub const DESCRIPTION: &str = "Description";
    pub const DISHES: &str = "Suggestion plats inclus R";
    pub const SUITED_FOR: &str = "Adapté pour types d'événement";
    pub const PRICE_PER_PERSON: &str = "Prix indicatif par personne";
    /// Free text, e.g. `10-20 pers.`
    pub const GUEST_RANGE: &str = "Nombre de convives suggéré";
    pub const PHOTO: &str = "Photo ambiance menu";
    pub const INTERNAL_NOTES: &str = "Notes internes menu type";
    pub const EVENTS: &str = "Événements associés R";
}

use columns as col;

/// Event menu template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMenuType {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub dishes: Vec<String>,
    #[serde(default)]
    pub suited_for: Vec<EventType>,
    pub price_per_person: Option<Decimal>,
    pub guest_range: Option<String>,
    pub photo_url: Option<String>,
    pub internal_notes: Option<String>,
    #[serde(default)]
    pub events: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl EventMenuType {
    pub fn from_record(record: &AirtableRecord) -> Self {
        let f = record.reader();
        Self {
            id: record.id.clone(),
            name: f.text_or_default(&[col::NAME]),
            description: f.text(&[col::DESCRIPTION]),
            dishes: f.links(&[col::DISHES]),
            suited_for: f
                .strings(&[col::SUITED_FOR])
                .into_iter()
                .map(EventType::from)
                .collect(),
            price_per_person: f.decimal(&[col::PRICE_PER_PERSON]),
            guest_range: f.text(&[col::GUEST_RANGE]),
            photo_url: f.attachment_url(&[col::PHOTO]),
            internal_notes: f.text(&[col::INTERNAL_NOTES]),
            events: f.links(&[col::EVENTS]),
            created_at: super::created_at(record),
        }
    }

    pub fn suits(&self, event_type: &EventType) -> bool {
        self.suited_for.contains(event_type)
    }

    /// Indicative price for a headcount
    pub fn estimate(&self, guests: u32) -> Option<Decimal> {
        self.price_per_person.map(|p| p * Decimal::from(guests))
    }
}
