//! Ordering cart and pickup slots

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::models::Dish;

/// Pickup times offered at the counter
pub const PICKUP_SLOTS: &[&str] = &[
    "11:30", "12:00", "12:30", "13:00", "13:30", "14:00", "18:30", "19:00", "19:30", "20:00",
    "20:30", "21:00",
];

/// Combine a date and one of [`PICKUP_SLOTS`] into a pickup time
pub fn pickup_at(date: NaiveDate, slot: &str) -> ValidationResult<NaiveDateTime> {
    let slot = slot.trim();
    if !PICKUP_SLOTS.contains(&slot) {
        return Err(ValidationError::UnknownSlot(slot.to_string()));
    }
    let time = NaiveTime::parse_from_str(slot, "%H:%M")
        .map_err(|_| ValidationError::UnknownSlot(slot.to_string()))?;
    Ok(date.and_time(time))
}

/// One dish in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub dish_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Cart of the ordering flow, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one portion of a dish
    pub fn add(&mut self, dish: &Dish) {
        self.add_quantity(dish, 1);
    }

    /// Add `quantity` portions of a dish, merging with an existing line
    pub fn add_quantity(&mut self, dish: &Dish, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.lines.iter_mut().find(|l| l.dish_id == dish.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine {
                dish_id: dish.id.clone(),
                name: dish.name.clone(),
                unit_price: dish.price,
                quantity,
            }),
        }
    }

    /// Set the quantity of a line; 0 removes it. Unknown dishes are ignored.
    pub fn set_quantity(&mut self, dish_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(dish_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.dish_id == dish_id) {
            line.quantity = quantity;
        }
    }

    pub fn remove(&mut self, dish_id: &str) {
        self.lines.retain(|l| l.dish_id != dish_id);
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn quantity_of(&self, dish_id: &str) -> u32 {
        self.lines
            .iter()
            .find(|l| l.dish_id == dish_id)
            .map_or(0, |l| l.quantity)
    }

    /// Sum of line subtotals, rounded to cents
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLine::subtotal)
            .sum::<Decimal>()
            .round_dp(2)
    }

    /// Number of portions
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, l| count.saturating_add(l.quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
