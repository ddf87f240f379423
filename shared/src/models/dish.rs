//! Dish Model (`Plats DB`)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AirtableRecord;

/// Column names of `Plats DB`
pub mod columns {
    pub const NAME: &str = "Plat";
    pub const DESCRIPTION: &str = "Description";
    /// Currency number column
    pub const PRICE: &str = "Prix";
    /// Formatted price formula
    pub const PRICE_DISPLAY: &str = "Prix vu";
    pub const AVAILABILITY_SCORE: &str = "Score disponibilité";
    pub const PHOTO: &str = "Photo du Plat";
    pub const STOCK: &str = "Stock";
    pub const ORDER_LINES: &str = "Passage Commande R";
    pub const MENU_TYPES: &str = "Menus Événementiels R";
    pub const EVENTS: &str = "Événements R";
    /// Older single availability checkbox
    pub const LEGACY_AVAILABLE: &str = "Disponible";
}

use columns as col;

/// Day of the week, with the French labels used by the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Display label, e.g. `Lundi`
    pub fn label(self) -> &'static str {
        match self {
            Self::Monday => "Lundi",
            Self::Tuesday => "Mardi",
            Self::Wednesday => "Mercredi",
            Self::Thursday => "Jeudi",
            Self::Friday => "Vendredi",
            Self::Saturday => "Samedi",
            Self::Sunday => "Dimanche",
        }
    }

    /// Availability column of this day, e.g. `Lundi dispo`
    pub fn column(self) -> &'static str {
        match self {
            Self::Monday => "Lundi dispo",
            Self::Tuesday => "Mardi dispo",
            Self::Wednesday => "Mercredi dispo",
            Self::Thursday => "Jeudi dispo",
            Self::Friday => "Vendredi dispo",
            Self::Saturday => "Samedi dispo",
            Self::Sunday => "Dimanche dispo",
        }
    }

    /// Column spelling of the first schema version, e.g. `lundi_dispo`
    fn legacy_column(self) -> String {
        format!("{}_dispo", self.label().to_lowercase())
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Self::ALL[day.num_days_from_monday() as usize]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrecognised day name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown weekday: {0}")]
pub struct ParseWeekdayError(pub String);

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    /// Accepts French (`lundi`) and English (`monday`, `mon`) names, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let day = match s.trim().to_lowercase().as_str() {
            "lundi" | "monday" | "mon" => Self::Monday,
            "mardi" | "tuesday" | "tue" => Self::Tuesday,
            "mercredi" | "wednesday" | "wed" => Self::Wednesday,
            "jeudi" | "thursday" | "thu" => Self::Thursday,
            "vendredi" | "friday" | "fri" => Self::Friday,
            "samedi" | "saturday" | "sat" => Self::Saturday,
            "dimanche" | "sunday" | "sun" => Self::Sunday,
            _ => return Err(ParseWeekdayError(s.to_string())),
        };
        Ok(day)
    }
}

/// Dish entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in euros, 0 when unset
    pub price: Decimal,
    pub price_display: Option<String>,
    /// Availability per weekday, Monday first
    pub availability: [bool; 7],
    pub availability_score: Option<i64>,
    pub photo_url: Option<String>,
    /// Remaining portions, `None` when stock is not tracked
    pub stock: Option<i64>,
    #[serde(default)]
    pub order_lines: Vec<String>,
    #[serde(default)]
    pub menu_types: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Dish {
    pub fn from_record(record: &AirtableRecord) -> Self {
        let f = record.reader();

        // Without per-day columns the legacy checkbox applies to every day,
        // and a dish with no availability data at all is treated as available.
        let fallback = f.flag(&[col::LEGACY_AVAILABLE]).unwrap_or(true);
        let mut availability = [fallback; 7];
        for day in Weekday::ALL {
            let legacy = day.legacy_column();
            if let Some(open) = f.flag(&[day.column(), legacy.as_str()]) {
                availability[day.index()] = open;
            }
        }

        Self {
            id: record.id.clone(),
            name: f.text_or_default(&[col::NAME, "Nom"]),
            description: f.text(&[col::DESCRIPTION]),
            price: f.decimal(&[col::PRICE]).unwrap_or_default(),
            price_display: f.text(&[col::PRICE_DISPLAY]),
            availability,
            availability_score: f.integer(&[col::AVAILABILITY_SCORE]),
            photo_url: f.attachment_url(&[col::PHOTO, "Photo"]),
            stock: f.integer(&[col::STOCK]),
            order_lines: f.links(&[col::ORDER_LINES]),
            menu_types: f.links(&[col::MENU_TYPES]),
            events: f.links(&[col::EVENTS]),
            created_at: super::created_at(record),
        }
    }

    /// Offered on that day and not out of stock
    pub fn is_available_on(&self, day: Weekday) -> bool {
        self.availability[day.index()] && !self.is_sold_out()
    }

    pub fn is_sold_out(&self) -> bool {
        matches!(self.stock, Some(n) if n <= 0)
    }

    /// Days the dish is offered
    pub fn available_days(&self) -> Vec<Weekday> {
        Weekday::ALL
            .into_iter()
            .filter(|day| self.availability[day.index()])
            .collect()
    }
}

/// Dishes offered on the given day, in input order
pub fn dishes_available_on(dishes: &[Dish], day: Weekday) -> Vec<&Dish> {
    dishes.iter().filter(|d| d.is_available_on(day)).collect()
}
