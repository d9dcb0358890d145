//! Status-plus-body result of every PetFriends call.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::AuthKey;

/// Response body: JSON when it parses, the raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    /// Parses `text` as JSON, keeping it verbatim when that fails.
    pub fn parse(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(text),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Json(_) => None,
            Body::Text(text) => Some(text),
        }
    }
}

/// What the service answered: the HTTP status and the parsed body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Body,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Top-level field of a JSON object body.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.as_json()?.as_object()?.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name)?.as_str()
    }

    /// Decodes a JSON body into `T`. Text bodies are reported with their content.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        match &self.body {
            Body::Json(value) => serde_json::from_value(value.clone())
                .map_err(|e| ApiError::Deserialization(e.to_string())),
            Body::Text(text) => Err(ApiError::Deserialization(format!(
                "HTTP {} body is not JSON: {}",
                self.status,
                truncate(text, 200)
            ))),
        }
    }

    /// The key issued by a successful `api/key` call.
    pub fn auth_key(&self) -> Option<AuthKey> {
        if self.status != 200 {
            return None;
        }
        self.str_field("key").map(AuthKey::new)
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
