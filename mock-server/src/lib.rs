//! In-memory stand-in for the PetFriends service.
//!
//! Serves the same five paths as the real deployment with the same header,
//! query, and body conventions: `email`/`password` headers for `api/key`, an
//! `auth_key` header everywhere else, URL-encoded forms for plain fields and
//! multipart for photos. Photos are stored as `data:` URLs, and rejections
//! carry plain-text bodies like the real service does.

use std::{
    net::SocketAddr,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, error, info};
use uuid::Uuid;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    /// `data:` URL of the photo, empty when none was uploaded.
    pub pet_photo: String,
    pub user_id: String,
    pub created_at: String,
}

/// A login the mock accepts.
#[derive(Clone, Debug)]
pub struct Account {
    pub email: String,
    pub password: String,
}

impl Account {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Deliberate deviations from the real service, for testing clients that
/// must notice them.
#[derive(Clone, Copy, Debug, Default)]
pub struct Behaviour {
    /// `filter=my_pets` returns every account's pets.
    pub ignore_my_pets_filter: bool,
}

#[derive(Default, Deserialize)]
pub struct PetForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub animal_type: String,
    #[serde(default)]
    pub age: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub filter: Option<String>,
}

struct Registered {
    account: Account,
    key: String,
    user_id: String,
}

#[derive(Default)]
struct Store {
    accounts: Vec<Registered>,
    /// Newest first, matching the real service's listing order.
    pets: Vec<Pet>,
    behaviour: Behaviour,
}

type Db = Arc<RwLock<Store>>;
type Rejection = (StatusCode, String);

pub fn app(accounts: Vec<Account>) -> Router {
    app_with(accounts, Behaviour::default())
}

pub fn app_with(accounts: Vec<Account>, behaviour: Behaviour) -> Router {
    let store = Store {
        accounts: accounts
            .into_iter()
            .map(|account| Registered {
                account,
                key: Uuid::new_v4().simple().to_string(),
                user_id: Uuid::new_v4().simple().to_string(),
            })
            .collect(),
        pets: Vec::new(),
        behaviour,
    };
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/key", get(get_api_key))
        .route("/api/pets", get(list_pets).post(create_pet))
        .route("/api/create_pet_simple", post(create_pet_simple))
        .route("/api/pets/set_photo/{id}", post(set_photo))
        .route("/api/pets/{id}", put(update_pet).delete(delete_pet))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(db)
}

pub async fn run(listener: TcpListener, accounts: Vec<Account>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(accounts)).await
}

/// Starts the mock on a random local port in a background thread.
pub fn spawn(accounts: Vec<Account>) -> Result<SocketAddr, std::io::Error> {
    spawn_with(accounts, Behaviour::default())
}

pub fn spawn_with(accounts: Vec<Account>, behaviour: Behaviour) -> Result<SocketAddr, std::io::Error> {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = std_listener.local_addr()?;
    std_listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                error!(error = %e, "mock server runtime failed to start");
                return;
            }
        };
        let result = rt.block_on(async {
            let listener = TcpListener::from_std(std_listener)?;
            axum::serve(listener, app_with(accounts, behaviour)).await
        });
        if let Err(e) = result {
            error!(error = %e, "mock server stopped");
        }
    });

    info!(%addr, "mock petfriends listening");
    Ok(addr)
}

async fn get_api_key(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, Rejection> {
    let email = header(&headers, "email").unwrap_or_default();
    let password = header(&headers, "password").unwrap_or_default();
    let store = db.read().await;
    store
        .accounts
        .iter()
        .find(|r| r.account.email == email && r.account.password == password)
        .map(|r| Json(json!({ "key": r.key })))
        .ok_or_else(|| reject(StatusCode::FORBIDDEN, "This user wasn't found in database"))
}

async fn list_pets(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, Rejection> {
    let store = db.read().await;
    let user_id = authenticate(&store, &headers)?;
    let pets: Vec<&Pet> = match query.filter.as_deref().unwrap_or("") {
        "" => store.pets.iter().collect(),
        "my_pets" if store.behaviour.ignore_my_pets_filter => store.pets.iter().collect(),
        "my_pets" => store.pets.iter().filter(|p| p.user_id == user_id).collect(),
        _ => return Err(reject(StatusCode::BAD_REQUEST, "Filter value is incorrect")),
    };
    Ok(Json(json!({ "pets": pets })))
}

async fn create_pet_simple(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(form): Form<PetForm>,
) -> Result<Json<Pet>, Rejection> {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    let pet = new_pet(user_id, form, String::new());
    store.pets.insert(0, pet.clone());
    Ok(Json(pet))
}

async fn create_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Pet>, Rejection> {
    {
        let store = db.read().await;
        authenticate(&store, &headers)?;
    }
    let upload = read_upload(multipart).await?;
    let photo = upload
        .photo
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Field 'pet_photo' is required"))?;

    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    let pet = new_pet(user_id, upload.fields, photo);
    store.pets.insert(0, pet.clone());
    Ok(Json(pet))
}

async fn set_photo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Pet>, Rejection> {
    {
        let store = db.read().await;
        authenticate(&store, &headers)?;
    }
    let upload = read_upload(multipart).await?;
    let photo = upload
        .photo
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Field 'pet_photo' is required"))?;

    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    let pet = owned_pet(&mut store, &user_id, &id)?;
    pet.pet_photo = photo;
    Ok(Json(pet.clone()))
}

async fn update_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<PetForm>,
) -> Result<Json<Pet>, Rejection> {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    let pet = owned_pet(&mut store, &user_id, &id)?;
    pet.name = form.name;
    pet.animal_type = form.animal_type;
    pet.age = form.age;
    Ok(Json(pet.clone()))
}

async fn delete_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, Rejection> {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    owned_pet(&mut store, &user_id, &id)?;
    store.pets.retain(|p| p.id != id);
    Ok(StatusCode::OK)
}

#[derive(Default)]
struct Upload {
    fields: PetForm,
    photo: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, Rejection> {
    let mut upload = Upload::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pet_photo" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                if bytes.is_empty() {
                    continue;
                }
                upload.photo = Some(format!("data:{content_type};base64,{}", STANDARD.encode(&bytes)));
            }
            "name" => upload.fields.name = field.text().await.map_err(bad_multipart)?,
            "animal_type" => upload.fields.animal_type = field.text().await.map_err(bad_multipart)?,
            "age" => upload.fields.age = field.text().await.map_err(bad_multipart)?,
            _ => {}
        }
    }
    Ok(upload)
}

fn authenticate(store: &Store, headers: &HeaderMap) -> Result<String, Rejection> {
    let key = header(headers, "auth_key")
        .ok_or_else(|| reject(StatusCode::FORBIDDEN, "Please provide 'auth_key' Header"))?;
    store
        .accounts
        .iter()
        .find(|r| r.key == key)
        .map(|r| r.user_id.clone())
        .ok_or_else(|| reject(StatusCode::FORBIDDEN, "Please provide correct 'auth_key' Header"))
}

fn owned_pet<'a>(store: &'a mut Store, user_id: &str, id: &str) -> Result<&'a mut Pet, Rejection> {
    let pet = store
        .pets
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Pet with this id wasn't found"))?;
    if pet.user_id != user_id {
        return Err(reject(StatusCode::FORBIDDEN, "This pet belongs to another user"));
    }
    Ok(pet)
}

fn new_pet(user_id: String, form: PetForm, pet_photo: String) -> Pet {
    let created_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    Pet {
        id: Uuid::new_v4().to_string(),
        name: form.name,
        animal_type: form.animal_type,
        age: form.age,
        pet_photo,
        user_id,
        created_at: format!("{created_at:.6}"),
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn reject(status: StatusCode, message: &str) -> Rejection {
    debug!(%status, reason = message, "request rejected");
    (status, message.to_string())
}

fn bad_multipart(e: impl std::fmt::Display) -> Rejection {
    reject(StatusCode::BAD_REQUEST, &format!("Malformed multipart body: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_serializes_like_the_service() {
        let pet = Pet {
            id: "p1".to_string(),
            name: "Bataty".to_string(),
            animal_type: "Snail".to_string(),
            age: "7".to_string(),
            pet_photo: String::new(),
            user_id: "u1".to_string(),
            created_at: "1700000000.000000".to_string(),
        };
        let json = serde_json::to_value(&pet).unwrap();
        assert_eq!(json["name"], "Bataty");
        assert_eq!(json["age"], "7");
        assert_eq!(json["pet_photo"], "");
        assert_eq!(json["user_id"], "u1");
    }

    #[test]
    fn pet_form_fields_default_to_empty() {
        let form: PetForm = serde_json::from_str(r#"{"name":"Only name"}"#).unwrap();
        assert_eq!(form.name, "Only name");
        assert!(form.animal_type.is_empty());
        assert!(form.age.is_empty());
    }

    #[test]
    fn list_query_filter_is_optional() {
        let query: ListQuery = serde_json::from_str(r#"{}"#).unwrap();
        assert!(query.filter.is_none());
    }

    #[test]
    fn new_pet_starts_without_photo_when_given_none() {
        let pet = new_pet(
            "u1".to_string(),
            PetForm {
                name: "A".to_string(),
                animal_type: "B".to_string(),
                age: "1".to_string(),
            },
            String::new(),
        );
        assert_eq!(pet.user_id, "u1");
        assert!(pet.pet_photo.is_empty());
        assert!(Uuid::parse_str(&pet.id).is_ok());
    }

    #[test]
    fn owned_pet_rejects_foreign_pets() {
        let mut store = Store::default();
        store.pets.push(new_pet("owner".to_string(), PetForm::default(), String::new()));
        let id = store.pets[0].id.clone();

        let err = owned_pet(&mut store, "someone-else", &id).unwrap_err();
        assert_eq!(err.0, StatusCode::FORBIDDEN);

        let err = owned_pet(&mut store, "owner", "missing").unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);

        assert!(owned_pet(&mut store, "owner", &id).is_ok());
    }
}
