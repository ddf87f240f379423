//! Raw record wire types
//!
//! Shapes of the tabular-database REST payloads, untyped on the field side.
//! Mapping into view models happens in [`crate::models`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw field dictionary of a single row, keyed by column name
pub type FieldMap = Map<String, Value>;

/// One row as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirtableRecord {
    pub id: String,
    #[serde(default)]
    pub fields: FieldMap,
    #[serde(rename = "createdTime", default)]
    pub created_time: String,
}

impl AirtableRecord {
    pub fn new(id: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            fields,
            created_time: String::new(),
        }
    }

    /// Field reader over this record
    pub fn reader(&self) -> crate::Fields<'_> {
        crate::Fields::new(&self.fields)
    }
}

/// One page of a table listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub records: Vec<AirtableRecord>,
    /// Cursor of the next page, absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

/// Body of a single create or update call: `{"fields": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldsBody {
    pub fields: FieldMap,
}

/// Body of a batch create call: `{"records": [{"fields": {...}}, ...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchBody {
    pub records: Vec<FieldsBody>,
}

/// Response of a batch create call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub records: Vec<AirtableRecord>,
}

/// Error body returned on non-2xx responses
///
/// The service sends either `{"error": {"type": "...", "message": "..."}}`
/// or `{"error": "NOT_FOUND"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Typed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        message: Option<String>,
    },
    Code(String),
}

impl ErrorDetail {
    /// Human-readable message, falling back to the error type
    pub fn message(&self) -> String {
        match self {
            Self::Typed {
                kind,
                message: Some(message),
            } => format!("{kind}: {message}"),
            Self::Typed { kind, message: None } => kind.clone(),
            Self::Code(code) => code.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_response_with_offset() {
        let body = json!({
            "records": [
                {"id": "rec1", "fields": {"Plat": "Pad Thaï"}, "createdTime": "2025-06-01T10:00:00.000Z"},
                {"id": "rec2", "createdTime": "2025-06-01T10:00:00.000Z"}
            ],
            "offset": "itr123/rec2"
        });

        let page: ListResponse = serde_json::from_value(body).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].fields["Plat"], "Pad Thaï");
        assert!(page.records[1].fields.is_empty());
        assert_eq!(page.offset.as_deref(), Some("itr123/rec2"));
    }

    #[test]
    fn test_error_body_variants() {
        let typed: ErrorBody = serde_json::from_value(json!({
            "error": {"type": "INVALID_VALUE_FOR_COLUMN", "message": "Field \"Prix\" cannot accept the provided value"}
        }))
        .unwrap();
        assert!(typed.error.message().starts_with("INVALID_VALUE_FOR_COLUMN: Field"));

        let code: ErrorBody = serde_json::from_value(json!({"error": "NOT_FOUND"})).unwrap();
        assert_eq!(code.error.message(), "NOT_FOUND");
    }
}
