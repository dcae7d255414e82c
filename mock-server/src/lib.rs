use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const TEST_API_KEY: &str = "live_test_key";
pub const TEST_PREMIUM_KEY: &str = "live_premium_key";

/// Images served without a key are capped at this many per request.
pub const PUBLIC_IMAGE_LIMIT: usize = 10;

const AUTH_ERROR: &str =
    "AUTHENTICATION_ERROR - you need to send your API Key as the 'x-api-key' header";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Weight {
    pub imperial: String,
    pub metric: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Breed {
    pub weight: Weight,
    pub id: String,
    pub name: String,
    pub temperament: String,
    pub origin: String,
    pub life_span: String,
    pub adaptability: u8,
    pub energy_level: u8,
    pub hypoallergenic: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikipedia_url: Option<String>,
    pub reference_image_id: String,
}

/// An image in the public search catalog.
#[derive(Clone, Debug)]
pub struct CatalogImage {
    pub id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub breed_ids: Vec<String>,
}

/// An image uploaded through `POST /images/upload`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Upload {
    pub id: String,
    pub url: String,
    pub original_filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed_ids: Option<String>,
    pub pending: u8,
    pub approved: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vote {
    pub id: u64,
    pub image_id: String,
    pub sub_id: Option<String>,
    pub value: i64,
    pub created_at: String,
    pub country_code: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    pub fact: String,
    pub breed_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateVote {
    pub image_id: String,
    pub sub_id: Option<String>,
    pub value: i64,
}

#[derive(Debug, Default)]
pub struct Store {
    pub breeds: Vec<Breed>,
    pub catalog: Vec<CatalogImage>,
    pub uploads: Vec<Upload>,
    pub votes: BTreeMap<u64, Vote>,
    pub facts: Vec<Fact>,
    next_vote_id: u64,
}

/// Keys the server accepts. The premium key also unlocks facts.
#[derive(Clone, Debug)]
pub struct Keys {
    pub api_key: String,
    pub premium_key: String,
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            api_key: TEST_API_KEY.to_string(),
            premium_key: TEST_PREMIUM_KEY.to_string(),
        }
    }
}

pub struct AppState {
    keys: Keys,
    store: RwLock<Store>,
}

pub type Db = Arc<AppState>;

type ApiResult<T> = Result<T, (StatusCode, String)>;

pub fn app() -> Router {
    app_with_keys(Keys::default())
}

pub fn app_with_keys(keys: Keys) -> Router {
    let db: Db = Arc::new(AppState {
        keys,
        store: RwLock::new(Store::seeded()),
    });
    Router::new()
        .route("/", get(version))
        .route("/images/search", get(search_images))
        .route("/images", get(list_uploads))
        .route("/images/upload", post(upload_image))
        .route("/images/{id}", delete(delete_image))
        .route("/breeds", get(list_breeds))
        .route("/breeds/search", get(search_breeds))
        .route("/breeds/{id}/facts", get(breed_facts))
        .route("/facts", get(random_facts))
        .route("/votes", get(list_votes).post(create_vote))
        .route("/votes/{id}", get(get_vote).delete(delete_vote))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_keys(listener: TcpListener, keys: Keys) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_keys(keys)).await
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Keyed,
    Premium,
}

/// Which access level the request's `x-api-key` grants.
fn access(headers: &HeaderMap, keys: &Keys) -> Access {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(key) if key == keys.premium_key => Access::Premium,
        Some(key) if key == keys.api_key => Access::Keyed,
        _ => Access::Public,
    }
}

fn require(headers: &HeaderMap, keys: &Keys, needed: Access) -> ApiResult<()> {
    let granted = access(headers, keys);
    let ok = match needed {
        Access::Public => true,
        Access::Keyed => granted != Access::Public,
        Access::Premium => granted == Access::Premium,
    };
    if ok {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, AUTH_ERROR.to_string()))
    }
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "NOT_FOUND".to_string())
}

/// Accepts the service's spellings of a boolean flag.
fn flag(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "True"))
}

fn page_of<T: Clone>(items: &[T], page: Option<usize>, limit: usize) -> Vec<T> {
    items
        .iter()
        .skip(page.unwrap_or(0) * limit)
        .take(limit)
        .cloned()
        .collect()
}

async fn version() -> Json<Value> {
    Json(json!({"message": "The Cat API", "version": "1.0.0"}))
}

#[derive(Deserialize)]
pub struct ImageSearchParams {
    pub limit: Option<usize>,
    pub page: Option<usize>,
    pub has_breeds: Option<String>,
    pub breed_ids: Option<String>,
}

async fn search_images(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<ImageSearchParams>,
) -> Json<Value> {
    let store = db.store.read().await;
    let keyed = access(&headers, &db.keys) != Access::Public;

    let mut limit = params.limit.unwrap_or(1).max(1);
    if !keyed {
        limit = limit.min(PUBLIC_IMAGE_LIMIT);
    }
    let wanted: Option<Vec<&str>> = params
        .breed_ids
        .as_deref()
        .map(|ids| ids.split(',').map(str::trim).collect());
    let has_breeds = keyed && flag(params.has_breeds.as_deref());

    let matching: Vec<CatalogImage> = store
        .catalog
        .iter()
        .filter(|img| !has_breeds || !img.breed_ids.is_empty())
        .filter(|img| match &wanted {
            Some(ids) => img.breed_ids.iter().any(|id| ids.contains(&id.as_str())),
            None => true,
        })
        .cloned()
        .collect();

    let images = page_of(&matching, params.page, limit)
        .into_iter()
        .map(|img| {
            let breeds: Vec<&Breed> = store
                .breeds
                .iter()
                .filter(|b| img.breed_ids.contains(&b.id))
                .collect();
            json!({
                "id": img.id,
                "url": img.url,
                "width": img.width,
                "height": img.height,
                "breeds": breeds,
            })
        })
        .collect();
    Json(Value::Array(images))
}

#[derive(Deserialize)]
pub struct UploadListParams {
    pub limit: Option<usize>,
    pub page: Option<usize>,
    pub sub_id: Option<String>,
    pub original_filename: Option<String>,
}

async fn list_uploads(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<UploadListParams>,
) -> ApiResult<Json<Vec<Upload>>> {
    require(&headers, &db.keys, Access::Keyed)?;
    let store = db.store.read().await;
    let matching: Vec<Upload> = store
        .uploads
        .iter()
        .rev()
        .filter(|u| params.sub_id.is_none() || u.sub_id == params.sub_id)
        .filter(|u| match &params.original_filename {
            Some(name) => &u.original_filename == name,
            None => true,
        })
        .cloned()
        .collect();
    Ok(Json(page_of(&matching, params.page, params.limit.unwrap_or(10))))
}

async fn upload_image(
    State(db): State<Db>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Upload>)> {
    require(&headers, &db.keys, Access::Keyed)?;

    let bad_request = |e: axum::extract::multipart::MultipartError| {
        (StatusCode::BAD_REQUEST, e.body_text())
    };
    let mut file_name = None;
    let mut sub_id = None;
    let mut breed_ids = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let upload_name = field.file_name().unwrap_or("upload.jpg").to_string();
                let bytes = field.bytes().await.map_err(bad_request)?;
                if bytes.is_empty() {
                    return Err((StatusCode::BAD_REQUEST, "empty file".to_string()));
                }
                file_name = Some(upload_name);
            }
            Some("sub_id") => sub_id = Some(field.text().await.map_err(bad_request)?),
            Some("breed_ids") => breed_ids = Some(field.text().await.map_err(bad_request)?),
            _ => {}
        }
    }
    let Some(original_filename) = file_name else {
        return Err((StatusCode::BAD_REQUEST, "file is required".to_string()));
    };

    let id = Uuid::new_v4().simple().to_string()[..9].to_string();
    let extension = original_filename.rsplit('.').next().unwrap_or("jpg");
    let upload = Upload {
        url: format!("https://cdn2.thecatapi.com/images/{id}.{extension}"),
        id,
        original_filename,
        sub_id,
        breed_ids,
        pending: 0,
        approved: 1,
    };
    db.store.write().await.uploads.push(upload.clone());
    Ok((StatusCode::CREATED, Json(upload)))
}

async fn delete_image(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require(&headers, &db.keys, Access::Keyed)?;
    let mut store = db.store.write().await;
    let before = store.uploads.len();
    store.uploads.retain(|u| u.id != id);
    if store.uploads.len() == before {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_breeds(State(db): State<Db>) -> Json<Vec<Breed>> {
    Json(db.store.read().await.breeds.clone())
}

#[derive(Deserialize)]
pub struct BreedSearchParams {
    pub q: Option<String>,
}

async fn search_breeds(
    State(db): State<Db>,
    Query(params): Query<BreedSearchParams>,
) -> Json<Vec<Breed>> {
    let needle = params.q.unwrap_or_default().to_lowercase();
    let store = db.store.read().await;
    Json(
        store
            .breeds
            .iter()
            .filter(|b| !needle.is_empty() && b.name.to_lowercase().contains(&needle))
            .cloned()
            .collect(),
    )
}

#[derive(Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub page: Option<usize>,
}

async fn random_facts(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Vec<Fact>>> {
    require(&headers, &db.keys, Access::Premium)?;
    let store = db.store.read().await;
    Ok(Json(page_of(&store.facts, params.page, params.limit.unwrap_or(1))))
}

async fn breed_facts(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(breed_id): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Vec<Fact>>> {
    require(&headers, &db.keys, Access::Premium)?;
    let store = db.store.read().await;
    if !store.breeds.iter().any(|b| b.id == breed_id) {
        return Err(not_found());
    }
    let facts: Vec<Fact> = store
        .facts
        .iter()
        .filter(|f| f.breed_id == breed_id)
        .cloned()
        .collect();
    Ok(Json(page_of(&facts, params.page, params.limit.unwrap_or(1))))
}

async fn create_vote(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateVote>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require(&headers, &db.keys, Access::Keyed)?;
    let mut store = db.store.write().await;
    store.next_vote_id += 1;
    let vote = Vote {
        id: store.next_vote_id,
        image_id: input.image_id,
        sub_id: input.sub_id,
        value: input.value,
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
        country_code: "US".to_string(),
    };
    store.votes.insert(vote.id, vote.clone());

    let mut body = serde_json::to_value(&vote).unwrap_or_default();
    body["message"] = json!("SUCCESS");
    Ok((StatusCode::CREATED, Json(body)))
}

#[derive(Deserialize)]
pub struct VoteListParams {
    pub attach_image: Option<String>,
    pub sub_id: Option<String>,
    pub limit: Option<usize>,
    pub page: Option<usize>,
}

fn vote_json(vote: &Vote, attach_image: bool) -> Value {
    let mut body = serde_json::to_value(vote).unwrap_or_default();
    if attach_image {
        body["image"] = json!({
            "id": vote.image_id,
            "url": format!("https://cdn2.thecatapi.com/images/{}.jpg", vote.image_id),
        });
    }
    body
}

async fn list_votes(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<VoteListParams>,
) -> ApiResult<Json<Vec<Value>>> {
    require(&headers, &db.keys, Access::Keyed)?;
    let store = db.store.read().await;
    let attach_image = flag(params.attach_image.as_deref());
    let matching: Vec<Value> = store
        .votes
        .values()
        .filter(|v| params.sub_id.is_none() || v.sub_id == params.sub_id)
        .map(|v| vote_json(v, attach_image))
        .collect();
    Ok(Json(page_of(&matching, params.page, params.limit.unwrap_or(100))))
}

async fn get_vote(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    require(&headers, &db.keys, Access::Keyed)?;
    let store = db.store.read().await;
    let vote = store.votes.get(&id).ok_or_else(not_found)?;
    Ok(Json(vote_json(vote, true)))
}

async fn delete_vote(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    require(&headers, &db.keys, Access::Keyed)?;
    let mut store = db.store.write().await;
    store.votes.remove(&id).ok_or_else(not_found)?;
    Ok(Json(json!({"message": "SUCCESS"})))
}

impl Store {
    /// The fixture data every fresh app starts with.
    pub fn seeded() -> Self {
        let breed = |id: &str, name: &str, origin: &str, temperament: &str, weight: (&str, &str)| {
            Breed {
                weight: Weight {
                    imperial: weight.0.to_string(),
                    metric: weight.1.to_string(),
                },
                id: id.to_string(),
                name: name.to_string(),
                temperament: temperament.to_string(),
                origin: origin.to_string(),
                life_span: "12 - 15".to_string(),
                adaptability: 5,
                energy_level: 5,
                hypoallergenic: 0,
                wikipedia_url: Some(format!("https://en.wikipedia.org/wiki/{}", name.replace(' ', "_"))),
                reference_image_id: format!("{id}-ref"),
            }
        };
        let mut breeds = vec![
            breed("abys", "Abyssinian", "Egypt", "Active, Energetic, Independent", ("7 - 10", "3 - 5")),
            breed("beng", "Bengal", "United States", "Alert, Agile, Energetic", ("6 - 12", "3 - 7")),
            breed("rblu", "Russian Blue", "Russia", "Active, Gentle, Quiet", ("5 - 11", "2 - 5")),
            breed("sibe", "Siberian", "Russia", "Curious, Intelligent, Loyal", ("8 - 16", "4 - 7")),
        ];
        breeds[1].hypoallergenic = 1;
        breeds[3].wikipedia_url = None;

        let catalog = (0..15)
            .map(|i| {
                let breed_ids = match i % 5 {
                    0 => vec!["beng".to_string()],
                    1 => vec!["abys".to_string(), "sibe".to_string()],
                    2 => vec!["rblu".to_string()],
                    _ => Vec::new(),
                };
                CatalogImage {
                    id: format!("img{i:03}"),
                    url: format!("https://cdn2.thecatapi.com/images/img{i:03}.jpg"),
                    width: 640 + i * 10,
                    height: 480,
                    breed_ids,
                }
            })
            .collect();

        let fact = |id: &str, breed_id: &str, text: &str| Fact {
            id: id.to_string(),
            fact: text.to_string(),
            breed_id: breed_id.to_string(),
            title: None,
        };
        let facts = vec![
            fact("f1", "beng", "Bengals are descended from the Asian leopard cat."),
            fact("f2", "beng", "Many Bengals enjoy playing in water."),
            fact("f3", "abys", "The Abyssinian is one of the oldest known breeds."),
            fact("f4", "sibe", "Siberians have a triple-layered coat."),
        ];

        Self {
            breeds,
            catalog,
            uploads: Vec::new(),
            votes: BTreeMap::new(),
            facts,
            next_vote_id: 0,
        }
    }
}
