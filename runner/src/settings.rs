//! Runner configuration read from the environment.
//!
//! Valid credentials are required. Invalid variants are optional; the
//! negative scenarios that need them are skipped when they are absent.

use std::path::PathBuf;

use petfriends_core::{Credentials, DEFAULT_BASE_URL};
use thiserror::Error;

pub const BASE_URL_VAR: &str = "PETFRIENDS_BASE_URL";
pub const EMAIL_VAR: &str = "PETFRIENDS_EMAIL";
pub const PASSWORD_VAR: &str = "PETFRIENDS_PASSWORD";
pub const INVALID_EMAIL_VAR: &str = "PETFRIENDS_INVALID_EMAIL";
pub const INVALID_PASSWORD_VAR: &str = "PETFRIENDS_INVALID_PASSWORD";
pub const PHOTO_VAR: &str = "PETFRIENDS_PHOTO";

pub const DEFAULT_PHOTO: &str = "images/giantsnail.jpg";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub credentials: Credentials,
    pub invalid_email: Option<String>,
    pub invalid_password: Option<String>,
    pub photo: PathBuf,
}

impl Settings {
    /// Settings with defaults for everything but the valid credentials.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            invalid_email: None,
            invalid_password: None,
            photo: PathBuf::from(DEFAULT_PHOTO),
        }
    }

    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from any key/value source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let email = get(EMAIL_VAR).ok_or(SettingsError::Missing(EMAIL_VAR))?;
        let password = get(PASSWORD_VAR).ok_or(SettingsError::Missing(PASSWORD_VAR))?;

        Ok(Self {
            base_url: get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            credentials: Credentials::new(email, password),
            invalid_email: get(INVALID_EMAIL_VAR),
            invalid_password: get(INVALID_PASSWORD_VAR),
            photo: get(PHOTO_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PHOTO)),
        })
    }
}
