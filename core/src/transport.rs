//! Executes `HttpRequest` values over blocking HTTP with reqwest.
//!
//! reqwest never turns 4xx/5xx into errors unless asked to, so every status
//! comes back as data; only failures to complete the exchange become
//! `ApiError`. Bodies are read in full with no size cap and decoded lossily.

use reqwest::blocking::{multipart::Form, Client};
use reqwest::Method;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartBody, RequestBody};

/// Builds the client used for all PetFriends calls.
pub fn client() -> Client {
    Client::new()
}

pub fn execute(client: &Client, request: HttpRequest) -> Result<HttpResponse, ApiError> {
    let HttpRequest {
        method,
        url,
        headers,
        query,
        body,
    } = request;

    let mut builder = client.request(method_of(method), &url);
    for (name, value) in &headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if !query.is_empty() {
        builder = builder.query(&query);
    }
    builder = match body {
        RequestBody::Empty => builder,
        RequestBody::Form(fields) => builder.form(&fields),
        RequestBody::Multipart(multipart) => builder.multipart(form(multipart)?),
    };

    let response = builder.send()?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let bytes = response.bytes()?;
    let body = String::from_utf8_lossy(&bytes).into_owned();

    Ok(HttpResponse { status, headers, body })
}

fn method_of(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Text parts in order, then the file part. The photo is opened here.
fn form(body: MultipartBody) -> Result<Form, ApiError> {
    let MultipartBody {
        fields,
        file_field,
        file,
    } = body;
    let form = fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));
    form.file(file_field, &file)
        .map_err(|source| ApiError::Photo { path: file.clone(), source })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn methods_map_one_to_one() {
        assert_eq!(method_of(HttpMethod::Get), Method::GET);
        assert_eq!(method_of(HttpMethod::Post), Method::POST);
        assert_eq!(method_of(HttpMethod::Put), Method::PUT);
        assert_eq!(method_of(HttpMethod::Delete), Method::DELETE);
    }

    #[test]
    fn photo_removed_after_build_is_a_photo_error() {
        let err = form(MultipartBody {
            fields: vec![("name".to_string(), "Bataty".to_string())],
            file_field: "pet_photo".to_string(),
            file: PathBuf::from("no/such/snail.jpg"),
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Photo { ref path, .. } if path.ends_with("snail.jpg")));
    }
}
