//! Synchronous API client for the PetFriends pet-listing service.
//!
//! # Overview
//! `PetFriendsClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern);
//! `transport` runs them over blocking HTTP and `PetFriends` ties the two
//! together with one method per remote operation.
//!
//! # Design
//! - The client is stateless: it holds only `base_url`. Auth keys and
//!   credentials are passed into every call.
//! - Every call yields an `ApiResponse { status, body }`. Non-2xx statuses
//!   are data, and bodies that are not JSON are kept as raw text.
//! - Photo uploads are `multipart/form-data` streamed from disk.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;
pub mod types;

pub use api::{PetFriends, DEFAULT_BASE_URL};
pub use client::PetFriendsClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, MultipartBody, RequestBody};
pub use response::{ApiResponse, Body};
pub use types::{AuthKey, Credentials, Pet, PetFields, PetFilter, PetList};
