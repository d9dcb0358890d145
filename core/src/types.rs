//! Domain types for the PetFriends API.
//!
//! # Design
//! Pets are owned by the remote service; these types only mirror what it
//! sends back. The service encodes "no photo" as an empty string and has
//! been seen returning `age` both as a string and as a number, so both are
//! normalised on the way in.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Login credentials. Supplied per call, never retained by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Opaque key issued by `api/key`, sent as the `auth_key` header.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthKey(String);

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.0.chars().take(6).collect();
        write!(f, "AuthKey({visible}...)")
    }
}

/// A pet record as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub animal_type: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub age: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub pet_photo: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<String>,
}

/// Body of `GET api/pets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

impl PetList {
    pub fn find(&self, id: &str) -> Option<&Pet> {
        self.pets.iter().find(|pet| pet.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }
}

/// Editable fields of a pet. Empty strings are sent as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetFields {
    pub name: String,
    pub animal_type: String,
    pub age: String,
}

impl PetFields {
    pub fn new(name: impl Into<String>, animal_type: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            animal_type: animal_type.into(),
            age: age.into(),
        }
    }

    pub(crate) fn to_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("name".to_string(), self.name.clone()),
            ("animal_type".to_string(), self.animal_type.clone()),
            ("age".to_string(), self.age.clone()),
        ]
    }
}

/// Value of the `filter` query parameter of `GET api/pets`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PetFilter {
    #[default]
    All,
    MyPets,
}

impl PetFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_with_empty_photo_has_none() {
        let pet: Pet = serde_json::from_str(
            r#"{"id":"p1","name":"Bataty","animal_type":"Snail","age":"7","pet_photo":"","user_id":"u1","created_at":"1700000000.1"}"#,
        )
        .unwrap();
        assert_eq!(pet.id, "p1");
        assert_eq!(pet.age, "7");
        assert!(pet.pet_photo.is_none());
        assert_eq!(pet.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn pet_accepts_numeric_age_and_missing_optionals() {
        let pet: Pet = serde_json::from_str(r#"{"id":"p2","name":"Rex","animal_type":"dog","age":3}"#).unwrap();
        assert_eq!(pet.age, "3");
        assert!(pet.pet_photo.is_none());
        assert!(pet.user_id.is_none());
    }

    #[test]
    fn pet_list_lookup_by_id() {
        let list: PetList = serde_json::from_str(
            r#"{"pets":[{"id":"a","name":"A","animal_type":"x","age":"1","pet_photo":"data:image/jpeg;base64,AA=="}]}"#,
        )
        .unwrap();
        assert!(list.contains("a"));
        assert!(!list.contains("b"));
        assert_eq!(
            list.find("a").unwrap().pet_photo.as_deref(),
            Some("data:image/jpeg;base64,AA==")
        );
    }

    #[test]
    fn filter_values() {
        assert_eq!(PetFilter::All.as_str(), "");
        assert_eq!(PetFilter::MyPets.as_str(), "my_pets");
        assert_eq!(PetFilter::default(), PetFilter::All);
    }

    #[test]
    fn auth_key_debug_does_not_leak_whole_key() {
        let key = AuthKey::new("ea738148a1f19838e1c5d1413877f3691a3731380e733e877b0ae729");
        let shown = format!("{key:?}");
        assert_eq!(shown, "AuthKey(ea7381...)");
        assert!(shown.is_ascii());
    }
}
