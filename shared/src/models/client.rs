//! Client Model (`Client DB`)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{AirtableRecord, FieldsBuilder};

/// Column names of `Client DB`
pub mod columns {
    /// Primary formula: first name + last name
    pub const CLIENT: &str = "Client";
    pub const LAST_NAME: &str = "Nom";
    pub const FIRST_NAME: &str = "Prénom";
    /// Allergies, vegan, favourite dish...
    pub const PREFERENCE: &str = "Préférence client";
    pub const PHONE: &str = "Numéro de téléphone";
    pub const EMAIL: &str = "E-mail";
    pub const STREET: &str = "Adresse (numéro et rue)";
    pub const POSTAL_CODE: &str = "Code postal";
    pub const CITY: &str = "Ville";
    pub const HOW_HEARD: &str = "Comment avez-vous connu ChanthanaThaiCook ?";
    pub const NEWSLETTER: &str = "Newsletter";
    pub const BIRTH_DATE: &str = "Date de naissance";
    pub const PHOTO: &str = "Photo Client";
    pub const ORDERS: &str = "Commandes R";
    pub const EVENTS: &str = "Événements R";
}

use columns as col;

/// Client entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    /// Display name
    pub name: String,
    pub last_name: String,
    pub first_name: String,
    pub preference: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    #[serde(default)]
    pub how_heard: Vec<String>,
    pub newsletter: bool,
    pub birth_date: Option<NaiveDate>,
    pub photo_url: Option<String>,
    /// Order record ids
    #[serde(default)]
    pub orders: Vec<String>,
    /// Event request record ids
    #[serde(default)]
    pub events: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Client {
    pub fn from_record(record: &AirtableRecord) -> Self {
        let f = record.reader();
        let last_name = f.text_or_default(&[col::LAST_NAME]);
        let first_name = f.text_or_default(&[col::FIRST_NAME, "Prenom"]);
        let name = f
            .text(&[col::CLIENT])
            .unwrap_or_else(|| format!("{first_name} {last_name}").trim().to_string());

        Self {
            id: record.id.clone(),
            name,
            last_name,
            first_name,
            preference: f.text(&[col::PREFERENCE, "Preferences"]),
            phone: f.text(&[col::PHONE, "Telephone"]),
            email: f.text_or_default(&[col::EMAIL, "Email"]),
            street: f.text(&[col::STREET, "Adresse"]),
            postal_code: f.text(&[col::POSTAL_CODE]),
            city: f.text(&[col::CITY]),
            how_heard: f.strings(&[col::HOW_HEARD]),
            newsletter: f.flag(&[col::NEWSLETTER]).unwrap_or(false),
            birth_date: f.date(&[col::BIRTH_DATE]),
            photo_url: f.attachment_url(&[col::PHOTO]),
            orders: f.links(&[col::ORDERS]),
            events: f.links(&[col::EVENTS]),
            created_at: super::created_at(record),
        }
    }
}

/// Create client payload (profile form)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientCreate {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub preference: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    #[serde(default)]
    pub how_heard: Vec<String>,
    pub newsletter: Option<bool>,
    pub birth_date: Option<NaiveDate>,
}

impl ClientCreate {
    pub fn to_fields(&self) -> Map<String, Value> {
        FieldsBuilder::new()
            .text(col::LAST_NAME, Some(self.last_name.as_str()))
            .text(col::FIRST_NAME, Some(self.first_name.as_str()))
            .text(col::EMAIL, Some(self.email.as_str()))
            .text(col::PREFERENCE, self.preference.as_deref())
            .text(col::PHONE, self.phone.as_deref())
            .text(col::STREET, self.street.as_deref())
            .postal_code(self.postal_code.as_deref())
            .text(col::CITY, self.city.as_deref())
            .strings(col::HOW_HEARD, &self.how_heard)
            .flag(col::NEWSLETTER, self.newsletter)
            .date(col::BIRTH_DATE, self.birth_date)
            .build()
    }
}

/// Update client payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub preference: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub how_heard: Option<Vec<String>>,
    pub newsletter: Option<bool>,
    pub birth_date: Option<NaiveDate>,
}

impl ClientUpdate {
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut builder = FieldsBuilder::new()
            .text(col::LAST_NAME, self.last_name.as_deref())
            .text(col::FIRST_NAME, self.first_name.as_deref())
            .text(col::EMAIL, self.email.as_deref())
            .text(col::PREFERENCE, self.preference.as_deref())
            .text(col::PHONE, self.phone.as_deref())
            .text(col::STREET, self.street.as_deref())
            .postal_code(self.postal_code.as_deref())
            .text(col::CITY, self.city.as_deref())
            .flag(col::NEWSLETTER, self.newsletter)
            .date(col::BIRTH_DATE, self.birth_date);
        // An explicit empty list clears the multi-select
        if let Some(values) = &self.how_heard {
            let items = values.iter().cloned().map(Value::String).collect();
            builder = builder.raw(col::HOW_HEARD, Value::Array(items));
        }
        builder.build()
    }

    pub fn is_empty(&self) -> bool {
        self.to_fields().is_empty()
    }
}

impl FieldsBuilder {
    /// `Code postal` is a number column; non-numeric input is sent as text
    /// and left to the service to reject.
    fn postal_code(self, value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(code) => match code.parse::<i64>() {
                Ok(n) => self.integer(col::POSTAL_CODE, Some(n)),
                Err(_) => self.text(col::POSTAL_CODE, Some(code)),
            },
            None => self,
        }
    }
}
