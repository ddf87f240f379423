//! Order Models (`Commandes DB`, `Passage Commande DB`)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{OrderStatus, PaymentStatus};
use crate::{AirtableRecord, FieldsBuilder};

/// Column names of `Commandes DB`
pub mod columns {
    /// Formula: `CMD : {counter}`
    pub const NUMBER: &str = "N° Commande";
    pub const COUNTER: &str = "Compteur commande";
    pub const CLIENT: &str = "Client R";
    pub const PICKUP_AT: &str = "Date & Heure de retrait souhaitées";
    pub const TAKEN_AT: &str = "Date de prise de commande";
    pub const STATUS: &str = "Statut commande";
    pub const LINES: &str = "Passage Commande R";
    pub const SPECIAL_REQUEST: &str = "Demande spéciale commande";
    pub const PAYMENT_STATUS: &str = "Statut paiement";
    /// Rollup of the line subtotals
    pub const TOTAL: &str = "Total commande";
    pub const TOTAL_DISPLAY: &str = "Total commande vu";
    pub const INTERNAL_NOTES: &str = "Notes internes";
}

/// Column names of `Passage Commande DB`
pub mod line_columns {
    pub const LABEL: &str = "N° Passage Commande";
    /// Lookup through the order
    pub const CLIENT: &str = "Client Commande R";
    pub const ORDER: &str = "Commande R";
    pub const DISH: &str = "Plat R";
    pub const QUANTITY: &str = "Quantité plat commandé";
    /// Lookup of the dish price
    pub const UNIT_PRICE: &str = "Prix du plat";
    /// Formula: quantity * price
    pub const SUBTOTAL: &str = "Sous-total plat commandé";
}

use columns as col;
use line_columns as line_col;

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub number: Option<String>,
    pub counter: Option<i64>,
    /// Client record id
    pub client: Option<String>,
    pub pickup_at: Option<DateTime<Utc>>,
    pub taken_at: Option<DateTime<Utc>>,
    pub status: Option<OrderStatus>,
    /// Line record ids
    #[serde(default)]
    pub lines: Vec<String>,
    pub special_request: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    /// Total in euros, 0 when the rollup is empty
    pub total: Decimal,
    pub total_display: Option<String>,
    pub internal_notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn from_record(record: &AirtableRecord) -> Self {
        let f = record.reader();
        Self {
            id: record.id.clone(),
            number: f.text(&[col::NUMBER]),
            counter: f.integer(&[col::COUNTER]),
            client: f.first_link(&[col::CLIENT]),
            pickup_at: f.date_time(&[col::PICKUP_AT]),
            taken_at: f.date_time(&[col::TAKEN_AT]),
            status: f.text(&[col::STATUS]).map(OrderStatus::from),
            lines: f.links(&[col::LINES]),
            special_request: f.text(&[col::SPECIAL_REQUEST]),
            payment_status: f.text(&[col::PAYMENT_STATUS]).map(PaymentStatus::from),
            total: f.decimal(&[col::TOTAL]).unwrap_or_default(),
            total_display: f.text(&[col::TOTAL_DISPLAY]),
            internal_notes: f.text(&[col::INTERNAL_NOTES]),
            created_at: super::created_at(record),
        }
    }

    /// Number for display, falling back to the record id
    pub fn display_number(&self) -> &str {
        self.number.as_deref().unwrap_or(&self.id)
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub client: String,
    pub pickup_at: DateTime<Utc>,
    pub special_request: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

impl OrderCreate {
    pub fn to_fields(&self) -> Map<String, Value> {
        FieldsBuilder::new()
            .link(col::CLIENT, Some(self.client.as_str()))
            .date_time(col::PICKUP_AT, Some(self.pickup_at))
            .text(col::SPECIAL_REQUEST, self.special_request.as_deref())
            .text(col::STATUS, Some(self.status.label()))
            .text(col::PAYMENT_STATUS, Some(self.payment_status.label()))
            .build()
    }
}

/// Admin status change; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub internal_notes: Option<String>,
}

impl OrderStatusUpdate {
    pub fn to_fields(&self) -> Map<String, Value> {
        FieldsBuilder::new()
            .text(col::STATUS, self.status.as_ref().map(OrderStatus::label))
            .text(
                col::PAYMENT_STATUS,
                self.payment_status.as_ref().map(PaymentStatus::label),
            )
            .text(col::INTERNAL_NOTES, self.internal_notes.as_deref())
            .build()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none() && self.internal_notes.is_none()
    }
}

/// Order line entity (one dish and its quantity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub label: Option<String>,
    pub client: Option<String>,
    pub order: Option<String>,
    pub dish: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}

impl OrderLine {
    pub fn from_record(record: &AirtableRecord) -> Self {
        let f = record.reader();
        let quantity = f
            .integer(&[line_col::QUANTITY])
            .map(|q| q.clamp(0, u32::MAX as i64) as u32)
            .unwrap_or(0);
        let unit_price = f.decimal(&[line_col::UNIT_PRICE]).unwrap_or_default();
        let subtotal = f
            .decimal(&[line_col::SUBTOTAL])
            .unwrap_or_else(|| unit_price * Decimal::from(quantity));

        Self {
            id: record.id.clone(),
            label: f.text(&[line_col::LABEL]),
            client: f.first_link(&[line_col::CLIENT]),
            order: f.first_link(&[line_col::ORDER]),
            dish: f.first_link(&[line_col::DISH]),
            quantity,
            unit_price,
            subtotal,
            created_at: super::created_at(record),
        }
    }
}

/// Create order line payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineCreate {
    pub order: String,
    pub dish: String,
    pub quantity: u32,
}

impl OrderLineCreate {
    pub fn to_fields(&self) -> Map<String, Value> {
        FieldsBuilder::new()
            .link(line_col::ORDER, Some(self.order.as_str()))
            .link(line_col::DISH, Some(self.dish.as_str()))
            .integer(line_col::QUANTITY, Some(i64::from(self.quantity)))
            .build()
    }
}
