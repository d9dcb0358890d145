//! Blocking PetFriends API: one method per remote operation.
//!
//! Each call builds its request with `PetFriendsClient`, sends it through
//! the reqwest client, and returns the `ApiResponse`. Only transport failures and
//! unreadable photos surface as `Err`; everything the server says is data.

use std::fmt;
use std::path::Path;

use reqwest::blocking::Client;
use tracing::debug;

use crate::client::PetFriendsClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::response::ApiResponse;
use crate::transport;
use crate::types::{AuthKey, Credentials, PetFields, PetFilter};

/// Base URL of the public PetFriends deployment.
pub const DEFAULT_BASE_URL: &str = "https://petfriends.skillfactory.ru/";

#[derive(Clone)]
pub struct PetFriends {
    client: PetFriendsClient,
    http: Client,
}

impl fmt::Debug for PetFriends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PetFriends")
            .field("base_url", &self.client.base_url())
            .finish_non_exhaustive()
    }
}

impl PetFriends {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: PetFriendsClient::new(base_url),
            http: transport::client(),
        }
    }

    pub fn client(&self) -> &PetFriendsClient {
        &self.client
    }

    pub fn get_api_key(&self, credentials: &Credentials) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_get_api_key(credentials))
    }

    pub fn list_pets(&self, key: &AuthKey, filter: PetFilter) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_list_pets(key, filter))
    }

    pub fn create_pet_simple(&self, key: &AuthKey, fields: &PetFields) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_create_pet_simple(key, fields))
    }

    pub fn create_pet(&self, key: &AuthKey, fields: &PetFields, photo: &Path) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_create_pet(key, fields, photo)?)
    }

    pub fn set_photo(&self, key: &AuthKey, pet_id: &str, photo: &Path) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_set_photo(key, pet_id, photo)?)
    }

    pub fn update_pet(&self, key: &AuthKey, pet_id: &str, fields: &PetFields) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_update_pet(key, pet_id, fields))
    }

    pub fn delete_pet(&self, key: &AuthKey, pet_id: &str) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_delete_pet(key, pet_id))
    }

    fn send(&self, request: HttpRequest) -> Result<ApiResponse, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        let response = transport::execute(&self.http, request)?;
        debug!(method = method.as_str(), %url, status = response.status, "petfriends call");
        Ok(self.client.parse_response(response))
    }
}
