//! Validation errors for order and event drafts

use thiserror::Error;

/// Reasons a draft cannot be submitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Order has no items
    #[error("Cart is empty")]
    EmptyCart,

    /// Order has no pickup date or time
    #[error("Pickup date and time are required")]
    MissingPickup,

    /// Pickup time is not one of the offered slots
    #[error("Unknown pickup slot: {0}")]
    UnknownSlot(String),

    /// Draft is not linked to a client record
    #[error("A client is required")]
    MissingClient,

    /// Quantity outside the accepted range
    #[error("Invalid quantity {quantity} for {dish}")]
    InvalidQuantity { dish: String, quantity: u32 },

    /// Free-form field failed a check
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

impl ValidationError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for draft validation
pub type ValidationResult<T> = Result<T, ValidationError>;
