//! Order and event request drafts
//!
//! A draft collects what the ordering and event forms gather before anything
//! is written. `validate` is the last gate before the write path builds the
//! create payloads.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{ValidationError, ValidationResult};
use crate::models::{
    EventRequestCreate, EventStatus, EventType, OrderCreate, OrderLineCreate, OrderStatus,
    PaymentStatus,
};

/// Maximum portions of one dish in a single order
pub const MAX_LINE_QUANTITY: u32 = 50;

/// Order being put together in the ordering flow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    pub client_id: Option<String>,
    pub cart: Cart,
    /// Requested pickup, restaurant local time
    pub pickup: Option<NaiveDateTime>,
    pub special_request: Option<String>,
}

impl OrderDraft {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        if self.pickup.is_none() {
            return Err(ValidationError::MissingPickup);
        }
        if self.client_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
            return Err(ValidationError::MissingClient);
        }
        if let Some(line) = self
            .cart
            .lines()
            .iter()
            .find(|l| l.quantity > MAX_LINE_QUANTITY)
        {
            return Err(ValidationError::InvalidQuantity {
                dish: line.name.clone(),
                quantity: line.quantity,
            });
        }
        Ok(())
    }

    /// Order payload, pickup interpreted in `tz`; new orders start pending
    pub fn order_create<Tz: TimeZone>(&self, tz: &Tz) -> ValidationResult<OrderCreate> {
        self.validate()?;
        let (Some(client), Some(pickup)) = (&self.client_id, self.pickup) else {
            return Err(ValidationError::MissingPickup);
        };
        let pickup_at = tz
            .from_local_datetime(&pickup)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| ValidationError::invalid("pickup", "time does not exist locally"))?;

        Ok(OrderCreate {
            client: client.clone(),
            pickup_at,
            special_request: self
                .special_request
                .clone()
                .filter(|s| !s.trim().is_empty()),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::PendingOnSite,
        })
    }

    /// Line payloads linked to the created order
    pub fn line_creates(&self, order_id: &str) -> Vec<OrderLineCreate> {
        self.cart
            .lines()
            .iter()
            .map(|line| OrderLineCreate {
                order: order_id.to_string(),
                dish: line.dish_id.clone(),
                quantity: line.quantity,
            })
            .collect()
    }
}

/// Event request being put together in the event form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRequestDraft {
    pub client_id: Option<String>,
    pub name: String,
    pub event_type: Option<EventType>,
    pub date: Option<DateTime<Utc>>,
    pub guests: Option<u32>,
    pub budget: Option<Decimal>,
    pub special_requests: Option<String>,
    /// Pre-selected dish record ids, in selection order
    #[serde(default)]
    pub dishes: Vec<String>,
}

impl EventRequestDraft {
    /// Select a dish, or unselect it when already selected
    pub fn toggle_dish(&mut self, dish_id: &str) {
        if let Some(pos) = self.dishes.iter().position(|d| d == dish_id) {
            self.dishes.remove(pos);
        } else {
            self.dishes.push(dish_id.to_string());
        }
    }

    pub fn is_selected(&self, dish_id: &str) -> bool {
        self.dishes.iter().any(|d| d == dish_id)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.client_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
            return Err(ValidationError::MissingClient);
        }
        if self.guests == Some(0) {
            return Err(ValidationError::invalid("guests", "must be at least 1"));
        }
        if self.budget.is_some_and(|b| b.is_sign_negative()) {
            return Err(ValidationError::invalid("budget", "must not be negative"));
        }
        Ok(())
    }

    /// Event payload; new requests start as `Demande initiale`
    pub fn event_create(&self) -> ValidationResult<EventRequestCreate> {
        self.validate()?;
        let client = self.client_id.clone().unwrap_or_default();
        Ok(EventRequestCreate {
            client,
            name: self.name.trim().to_string(),
            event_type: self.event_type.clone(),
            date: self.date,
            guests: self.guests,
            budget: self.budget,
            special_requests: self
                .special_requests
                .clone()
                .filter(|s| !s.trim().is_empty()),
            dishes: self.dishes.clone(),
            status: EventStatus::InitialRequest,
        })
    }
}
