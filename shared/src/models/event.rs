//! Event Request Model (`Événements DB`)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{DepositStatus, EventStatus, EventType};
use crate::{AirtableRecord, FieldsBuilder};

/// Column names of `Événements DB`
pub mod columns {
    /// Formula: `EVT-{autonumber}`
    pub const NUMBER: &str = "N° Événement";
    pub const AUTONUMBER: &str = "ID Autonum Événement";
    pub const NAME: &str = "Nom événement";
    pub const CLIENT: &str = "Contact client R";
    pub const DATE: &str = "Date événement";
    pub const EVENT_TYPE: &str = "Type d'événement";
    pub const GUESTS: &str = "Nombre de personnes";
    pub const BUDGET: &str = "Budget client";
    pub const SPECIAL_REQUESTS: &str = "Demandes spéciales événement";
    pub const DISHES: &str = "Plats pré-sélectionnés R";
    pub const FINAL_MENU: &str = "Menu final convenu";
    pub const STATUS: &str = "Statut événement";
    pub const QUOTED_TOTAL: &str = "Prix total devisé";
    pub const QUOTE_PDF: &str = "Lien devis PDF";
    pub const DEPOSIT_REQUESTED: &str = "Acompte demandé";
    pub const DEPOSIT_RECEIVED: &str = "Acompte reçu";
    pub const DEPOSIT_RECEIVED_ON: &str = "Date acompte reçu";
    pub const DEPOSIT_STATUS: &str = "Statut acompte";
    pub const INTERNAL_NOTES: &str = "Notes internes événement";
    pub const MENU_TYPE: &str = "Menu type suggéré R";
}

use columns as col;

/// Event request entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    pub id: String,
    pub number: Option<String>,
    pub autonumber: Option<i64>,
    pub name: String,
    /// Client record id
    pub client: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub event_type: Option<EventType>,
    pub guests: Option<u32>,
    pub budget: Option<Decimal>,
    pub special_requests: Option<String>,
    /// Pre-selected dish record ids
    #[serde(default)]
    pub dishes: Vec<String>,
    pub final_menu: Option<String>,
    pub status: Option<EventStatus>,
    pub quoted_total: Option<Decimal>,
    pub quote_pdf: Option<String>,
    pub deposit_requested: Option<Decimal>,
    pub deposit_received: Option<Decimal>,
    pub deposit_received_on: Option<NaiveDate>,
    pub deposit_status: Option<DepositStatus>,
    pub internal_notes: Option<String>,
    pub menu_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl EventRequest {
    pub fn from_record(record: &AirtableRecord) -> Self {
        let f = record.reader();
        Self {
            id: record.id.clone(),
            number: f.text(&[col::NUMBER]),
            autonumber: f.integer(&[col::AUTONUMBER]),
            name: f.text_or_default(&[col::NAME]),
            client: f.first_link(&[col::CLIENT]),
            date: f.date_time(&[col::DATE]),
            event_type: f.text(&[col::EVENT_TYPE]).map(EventType::from),
            guests: f
                .integer(&[col::GUESTS])
                .and_then(|n| u32::try_from(n).ok()),
            budget: f.decimal(&[col::BUDGET]),
            special_requests: f.text(&[col::SPECIAL_REQUESTS]),
            dishes: f.links(&[col::DISHES]),
            final_menu: f.text(&[col::FINAL_MENU]),
            status: f.text(&[col::STATUS]).map(EventStatus::from),
            quoted_total: f.decimal(&[col::QUOTED_TOTAL]),
            quote_pdf: f.text(&[col::QUOTE_PDF]),
            deposit_requested: f.decimal(&[col::DEPOSIT_REQUESTED]),
            deposit_received: f.decimal(&[col::DEPOSIT_RECEIVED]),
            deposit_received_on: f.date(&[col::DEPOSIT_RECEIVED_ON]),
            deposit_status: f.text(&[col::DEPOSIT_STATUS]).map(DepositStatus::from),
            internal_notes: f.text(&[col::INTERNAL_NOTES]),
            menu_type: f.first_link(&[col::MENU_TYPE]),
            created_at: super::created_at(record),
        }
    }

    /// Deposit still owed, if one was requested
    pub fn deposit_outstanding(&self) -> Option<Decimal> {
        let requested = self.deposit_requested?;
        let received = self.deposit_received.unwrap_or_default();
        Some((requested - received).max(Decimal::ZERO))
    }
}

/// Create event request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRequestCreate {
    pub client: String,
    pub name: String,
    pub event_type: Option<EventType>,
    pub date: Option<DateTime<Utc>>,
    pub guests: Option<u32>,
    pub budget: Option<Decimal>,
    pub special_requests: Option<String>,
    #[serde(default)]
    pub dishes: Vec<String>,
    pub status: EventStatus,
}

impl EventRequestCreate {
    pub fn to_fields(&self) -> Map<String, Value> {
        FieldsBuilder::new()
            .link(col::CLIENT, Some(self.client.as_str()))
            .text(col::NAME, Some(self.name.as_str()))
            .text(col::EVENT_TYPE, self.event_type.as_ref().map(EventType::label))
            .date_time(col::DATE, self.date)
            .integer(col::GUESTS, self.guests.map(i64::from))
            .decimal(col::BUDGET, self.budget)
            .text(col::SPECIAL_REQUESTS, self.special_requests.as_deref())
            .links(col::DISHES, &self.dishes)
            .text(col::STATUS, Some(self.status.label()))
            .build()
    }
}
