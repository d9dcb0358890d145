//! Stateless HTTP request builder and response parser for the PetFriends API.
//!
//! # Design
//! `PetFriendsClient` holds only a `base_url` and carries no mutable state
//! between calls. Each remote operation has a `build_*` method producing an
//! `HttpRequest`; every response goes through the same `parse_response`,
//! which never fails: status codes stay data and non-JSON bodies are kept as
//! text. The caller executes the round-trip in between.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartBody, RequestBody};
use crate::response::{ApiResponse, Body};
use crate::types::{AuthKey, Credentials, PetFields, PetFilter};

pub const AUTH_HEADER: &str = "auth_key";
pub const PHOTO_FIELD: &str = "pet_photo";

#[derive(Debug, Clone)]
pub struct PetFriendsClient {
    base_url: String,
}

impl PetFriendsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_get_api_key(&self, credentials: &Credentials) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url("api/key"),
            headers: vec![
                ("email".to_string(), credentials.email.clone()),
                ("password".to_string(), credentials.password.clone()),
            ],
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn build_list_pets(&self, key: &AuthKey, filter: PetFilter) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url("api/pets"),
            headers: auth(key),
            query: vec![("filter".to_string(), filter.as_str().to_string())],
            body: RequestBody::Empty,
        }
    }

    pub fn build_create_pet_simple(&self, key: &AuthKey, fields: &PetFields) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: self.url("api/create_pet_simple"),
            headers: auth(key),
            query: Vec::new(),
            body: RequestBody::Form(fields.to_pairs()),
        }
    }

    /// Fails with `ApiError::Photo` if `photo` is not a readable file.
    pub fn build_create_pet(
        &self,
        key: &AuthKey,
        fields: &PetFields,
        photo: &Path,
    ) -> Result<HttpRequest, ApiError> {
        check_photo(photo)?;
        let body = MultipartBody {
            fields: fields.to_pairs(),
            file_field: PHOTO_FIELD.to_string(),
            file: photo.to_path_buf(),
        };
        Ok(self.multipart_request(self.url("api/pets"), key, body))
    }

    /// Fails with `ApiError::Photo` if `photo` is not a readable file.
    pub fn build_set_photo(&self, key: &AuthKey, pet_id: &str, photo: &Path) -> Result<HttpRequest, ApiError> {
        check_photo(photo)?;
        let body = MultipartBody {
            fields: Vec::new(),
            file_field: PHOTO_FIELD.to_string(),
            file: photo.to_path_buf(),
        };
        Ok(self.multipart_request(self.url(&format!("api/pets/set_photo/{pet_id}")), key, body))
    }

    pub fn build_update_pet(&self, key: &AuthKey, pet_id: &str, fields: &PetFields) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Put,
            url: self.url(&format!("api/pets/{pet_id}")),
            headers: auth(key),
            query: Vec::new(),
            body: RequestBody::Form(fields.to_pairs()),
        }
    }

    pub fn build_delete_pet(&self, key: &AuthKey, pet_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.url(&format!("api/pets/{pet_id}")),
            headers: auth(key),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn parse_response(&self, response: HttpResponse) -> ApiResponse {
        ApiResponse {
            status: response.status,
            body: Body::parse(response.body),
        }
    }

    fn multipart_request(&self, url: String, key: &AuthKey, body: MultipartBody) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: auth(key),
            query: Vec::new(),
            body: RequestBody::Multipart(body),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

fn auth(key: &AuthKey) -> Vec<(String, String)> {
    vec![(AUTH_HEADER.to_string(), key.as_str().to_string())]
}

/// The photo must open and be a regular file before a request is built.
fn check_photo(path: &Path) -> Result<(), ApiError> {
    let photo_error = |source: io::Error| ApiError::Photo {
        path: path.to_path_buf(),
        source,
    };
    let meta = File::open(path).and_then(|f| f.metadata()).map_err(photo_error)?;
    if !meta.is_file() {
        return Err(photo_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn client() -> PetFriendsClient {
        PetFriendsClient::new("https://petfriends.example")
    }

    fn key() -> AuthKey {
        AuthKey::new("k-123")
    }

    fn snail() -> PetFields {
        PetFields::new("Bataty", "Snail", "7")
    }

    fn photo_fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")
    }

    #[test]
    fn build_get_api_key_sends_credentials_as_headers() {
        let req = client().build_get_api_key(&Credentials::new("a@b.c", "secret"));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://petfriends.example/api/key");
        assert_eq!(req.header("email"), Some("a@b.c"));
        assert_eq!(req.header("password"), Some("secret"));
        assert!(req.header(AUTH_HEADER).is_none());
        assert_eq!(req.body, RequestBody::Empty);
    }

    #[test]
    fn build_list_pets_always_sends_filter() {
        let req = client().build_list_pets(&key(), PetFilter::All);
        assert_eq!(req.url, "https://petfriends.example/api/pets");
        assert_eq!(req.query, vec![("filter".to_string(), String::new())]);
        assert_eq!(req.header("auth_key"), Some("k-123"));

        let req = client().build_list_pets(&key(), PetFilter::MyPets);
        assert_eq!(req.query, vec![("filter".to_string(), "my_pets".to_string())]);
    }

    #[test]
    fn build_create_pet_simple_is_url_encoded_form() {
        let req = client().build_create_pet_simple(&key(), &snail());
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://petfriends.example/api/create_pet_simple");
        assert_eq!(
            req.body,
            RequestBody::Form(vec![
                ("name".to_string(), "Bataty".to_string()),
                ("animal_type".to_string(), "Snail".to_string()),
                ("age".to_string(), "7".to_string()),
            ])
        );
    }

    #[test]
    fn build_create_pet_is_multipart_with_photo() {
        let photo = photo_fixture();
        let req = client().build_create_pet(&key(), &snail(), &photo).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://petfriends.example/api/pets");
        let RequestBody::Multipart(body) = &req.body else {
            panic!("expected multipart body");
        };
        // The transport sets the boundary, so no content-type is fixed here.
        assert!(req.header("content-type").is_none());
        let names: Vec<&str> = body.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["name", "animal_type", "age"]);
        assert_eq!(body.file_field, "pet_photo");
        assert_eq!(body.file, photo);
    }

    #[test]
    fn build_create_pet_with_missing_photo_fails() {
        let err = client()
            .build_create_pet(&key(), &snail(), Path::new("no/such/photo.jpg"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Photo { .. }));
    }

    #[test]
    fn directory_is_not_a_photo() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let err = client().build_set_photo(&key(), "pet-9", dir).unwrap_err();
        assert!(matches!(err, ApiError::Photo { ref path, .. } if path == dir));
    }

    #[test]
    fn build_set_photo_targets_pet() {
        let req = client().build_set_photo(&key(), "pet-9", &photo_fixture()).unwrap();
        assert_eq!(req.url, "https://petfriends.example/api/pets/set_photo/pet-9");
        let RequestBody::Multipart(body) = &req.body else {
            panic!("expected multipart body");
        };
        assert!(body.fields.is_empty());
        assert_eq!(body.file_field, PHOTO_FIELD);
    }

    #[test]
    fn build_update_pet_is_put_form() {
        let req = client().build_update_pet(&key(), "pet-9", &snail());
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "https://petfriends.example/api/pets/pet-9");
        assert!(matches!(req.body, RequestBody::Form(ref f) if f.len() == 3));
    }

    #[test]
    fn build_delete_pet_has_no_body() {
        let req = client().build_delete_pet(&key(), "pet-9");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "https://petfriends.example/api/pets/pet-9");
        assert_eq!(req.body, RequestBody::Empty);
    }

    #[test]
    fn parse_response_falls_back_to_text() {
        let r = client().parse_response(HttpResponse {
            status: 403,
            headers: Vec::new(),
            body: "This user wasn't found in database".to_string(),
        });
        assert_eq!(r.status, 403);
        assert_eq!(r.body.as_text(), Some("This user wasn't found in database"));
    }

    #[test]
    fn parse_response_keeps_json() {
        let r = client().parse_response(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: r#"{"pets":[]}"#.to_string(),
        });
        assert!(r.field("pets").unwrap().as_array().unwrap().is_empty());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = PetFriendsClient::new("https://petfriends.skillfactory.ru/");
        let req = client.build_get_api_key(&Credentials::new("a", "b"));
        assert_eq!(req.url, "https://petfriends.skillfactory.ru/api/key");
    }
}
