//! Error types for the PetFriends API client.
//!
//! # Design
//! Non-2xx statuses and non-JSON bodies are *not* errors: they come back as
//! data inside `ApiResponse`. What remains are the failures that prevent a
//! round-trip from happening at all (transport, unreadable photo) and typed
//! decoding requested explicitly by the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by `PetFriends` and the request builders.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed: DNS, connect, TLS, or a broken stream.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// A photo file could not be opened or is not a regular file.
    #[error("cannot read photo {}: {source}", path.display())]
    Photo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The response body could not be decoded into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}
