//! Data models for the phonebook backend.
//!
//! `Person` is the only entity. Request payloads are kept separate so that
//! missing fields can be detected before anything is written.

use serde::{Deserialize, Serialize};

/// A phonebook entry as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Storage-assigned identifier (24 hex digits)
    pub id: String,
    pub name: String,
    pub number: String,
}

/// Validated name/number pair, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonFields {
    pub name: String,
    pub number: String,
}

// === API Request/Response Models ===

/// Body of `POST /api/persons` and `PUT /api/persons/:id`
///
/// Both fields are optional at the wire level; presence is checked by
/// [`PersonPayload::into_fields`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PersonPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
}

impl PersonPayload {
    /// Returns the fields if both are present and non-empty
    pub fn into_fields(self) -> Option<PersonFields> {
        let name = self.name.filter(|n| !n.is_empty())?;
        let number = self.number.filter(|n| !n.is_empty())?;
        Some(PersonFields { name, number })
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
