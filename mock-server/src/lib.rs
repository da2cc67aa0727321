use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const WEBHOOK_EVENTS: [&str; 3] = ["resource_update", "new_resource", "new_author"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: i64,
    pub name: String,
    pub release_date: i64,
    pub downloads: u64,
    #[serde(skip)]
    pub file: Vec<u8>,
    #[serde(skip)]
    pub media_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub tag: String,
    pub author: IdRef,
    pub category: IdRef,
    pub version: IdRef,
    pub downloads: u64,
    pub external: bool,
    pub tested_versions: Vec<String>,
    pub release_date: i64,
    pub update_date: i64,
    #[serde(skip)]
    pub versions: Vec<Version>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rating {
    pub count: u64,
    pub average: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub resource: IdRef,
    pub author: IdRef,
    pub rating: Rating,
    pub message: String,
    pub version: String,
    pub date: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Update {
    pub id: i64,
    pub resource: IdRef,
    pub title: String,
    pub description: String,
    pub date: i64,
    pub likes: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    #[serde(skip_serializing)]
    pub secret: String,
    pub url: String,
    pub events: Vec<String>,
    pub failed_connections: i64,
}

/// In-memory catalog served by the mock.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub authors: Vec<Author>,
    pub categories: Vec<Category>,
    pub resources: Vec<Resource>,
    pub reviews: Vec<Review>,
    pub updates: Vec<Update>,
    pub webhooks: HashMap<String, Webhook>,
}

impl Catalog {
    /// Small fixed data set. Author 3's name contains a slash and a
    /// non-ASCII letter; resource 3's download is a JSON document.
    pub fn seeded() -> Self {
        let authors = vec![
            author(1, "md_5"),
            author(2, "sk89q"),
            author(3, "Zoë/Tools"),
        ];
        let categories = vec![
            category(2, "Bungee - Spigot"),
            category(17, "Tools and Utilities"),
        ];
        let resources = vec![
            resource(
                1,
                "BungeeCord Helper",
                (1, 2),
                &["1.20", "1.21"],
                1_600_000_000,
                vec![
                    version(10, "1.0", 1_600_000_000, b"PK\x03\x04bungee-helper-1.0", OCTET_STREAM),
                    version(11, "1.1", 1_610_000_000, b"PK\x03\x04bungee-helper-1.1", OCTET_STREAM),
                ],
            ),
            resource(
                2,
                "WorldEdit",
                (2, 17),
                &["1.20", "1.21"],
                1_650_000_000,
                vec![
                    version(20, "7.2.0", 1_650_000_000, b"PK\x03\x04worldedit-7.2.0", OCTET_STREAM),
                    version(21, "7.3.0", 1_690_000_000, b"PK\x03\x04worldedit-7.3.0", OCTET_STREAM),
                ],
            ),
            resource(
                3,
                "Webhook Relay",
                (3, 17),
                &["1.21"],
                1_700_000_000,
                vec![version(
                    30,
                    "0.1",
                    1_700_000_000,
                    br#"{"external":true,"url":"https://example.org/relay.jar"}"#,
                    "application/json",
                )],
            ),
        ];
        let reviews = vec![
            review(100, 2, 3, 5.0, "7.3.0"),
            review(101, 2, 1, 4.0, "7.2.0"),
            review(102, 1, 2, 3.0, "1.1"),
        ];
        let updates = vec![Update {
            id: 200,
            resource: IdRef { id: 2 },
            title: "7.3.0 released".to_string(),
            description: "U3VwcG9ydCBmb3IgMS4yMQ==".to_string(),
            date: 1_690_000_000,
            likes: 12,
        }];
        Self {
            authors,
            categories,
            resources,
            reviews,
            updates,
            webhooks: HashMap::new(),
        }
    }

    fn author(&self, key: &str) -> Result<&Author, ApiError> {
        let found = match key.parse::<i64>() {
            Ok(id) => self.authors.iter().find(|a| a.id == id),
            Err(_) => self.authors.iter().find(|a| a.name == key),
        };
        found.ok_or_else(|| ApiError::not_found("author"))
    }

    fn category(&self, key: &str) -> Result<&Category, ApiError> {
        let found = match key.parse::<i64>() {
            Ok(id) => self.categories.iter().find(|c| c.id == id),
            Err(_) => self.categories.iter().find(|c| c.name == key),
        };
        found.ok_or_else(|| ApiError::not_found("category"))
    }

    fn resource_index(&self, key: &str) -> Result<usize, ApiError> {
        let id: i64 = key.parse().map_err(|_| ApiError::not_found("resource"))?;
        self.resources
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ApiError::not_found("resource"))
    }

    fn resource(&self, key: &str) -> Result<&Resource, ApiError> {
        self.resource_index(key).map(|i| &self.resources[i])
    }
}

const OCTET_STREAM: &str = "application/octet-stream";

fn author(id: i64, name: &str) -> Author {
    Author {
        id,
        name: name.to_string(),
    }
}

fn category(id: i64, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
    }
}

/// `owner` is `(author id, category id)`.
fn resource(
    id: i64,
    name: &str,
    owner: (i64, i64),
    tested: &[&str],
    release_date: i64,
    versions: Vec<Version>,
) -> Resource {
    let (author, category) = owner;
    let latest = versions.last().map_or(0, |v| v.id);
    let update_date = versions.last().map_or(release_date, |v| v.release_date);
    Resource {
        id,
        name: name.to_string(),
        tag: format!("{name} for your server"),
        author: IdRef { id: author },
        category: IdRef { id: category },
        version: IdRef { id: latest },
        downloads: 0,
        external: false,
        tested_versions: tested.iter().map(|v| v.to_string()).collect(),
        release_date,
        update_date,
        versions,
    }
}

fn version(id: i64, name: &str, release_date: i64, file: &[u8], media_type: &str) -> Version {
    Version {
        id,
        name: name.to_string(),
        release_date,
        downloads: 0,
        file: file.to_vec(),
        media_type: media_type.to_string(),
    }
}

fn review(id: i64, resource: i64, author: i64, rating: f64, version: &str) -> Review {
    Review {
        id,
        resource: IdRef { id: resource },
        author: IdRef { id: author },
        rating: Rating {
            count: 1,
            average: rating,
        },
        message: "R3JlYXQgcGx1Z2luIQ==".to_string(),
        version: version.to_string(),
        date: 1_695_000_000 + id,
    }
}

pub type Db = Arc<RwLock<Catalog>>;

/// Error response body: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// `size` / `page` pagination shared by list endpoints. Pages start at 1.
#[derive(Debug, Default, Deserialize)]
pub struct Paging {
    pub size: Option<usize>,
    pub page: Option<usize>,
}

impl Paging {
    pub const DEFAULT_SIZE: usize = 10;

    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let size = self.size.unwrap_or(Self::DEFAULT_SIZE).max(1);
        let page = self.page.unwrap_or(1).max(1);
        items
            .iter()
            .skip((page - 1).saturating_mul(size))
            .take(size)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VersionMatch {
    pub method: Option<String>,
}

pub fn app() -> Router {
    app_with(Catalog::seeded())
}

pub fn app_with(catalog: Catalog) -> Router {
    let db: Db = Arc::new(RwLock::new(catalog));
    let v2 = Router::new()
        .route("/authors", get(list_authors))
        .route("/authors/{author}", get(get_author))
        .route("/authors/{author}/resources", get(author_resources))
        .route("/authors/{author}/reviews", get(author_reviews))
        .route("/categories", get(list_categories))
        .route("/categories/{category}", get(get_category))
        .route("/categories/{category}/resources", get(category_resources))
        .route("/resources", get(list_resources))
        .route("/resources/new", get(new_resources))
        .route("/resources/for/versions/{versions}", get(resources_for_versions))
        .route("/resources/{resource}", get(get_resource))
        .route("/resources/{resource}/author", get(resource_author))
        .route("/resources/{resource}/download", get(download_resource))
        .route("/resources/{resource}/reviews", get(resource_reviews))
        .route("/resources/{resource}/updates", get(resource_updates))
        .route("/resources/{resource}/versions", get(resource_versions))
        .route(
            "/resources/{resource}/versions/{version}/download",
            get(download_version),
        )
        .route("/search/authors/{query}", get(search_authors))
        .route("/search/resources/{query}", get(search_resources))
        .route("/status", get(status))
        .route("/webhook/events", get(webhook_events))
        .route("/webhook/status/{id}", get(webhook_status))
        .route("/webhook/register", post(register_webhook))
        .route("/webhook/delete/{id}/{secret}", delete(delete_webhook));
    Router::new().nest("/v2", v2).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// --- authors ---

async fn list_authors(State(db): State<Db>, Query(paging): Query<Paging>) -> Json<Vec<Author>> {
    let catalog = db.read().await;
    Json(paging.apply(&catalog.authors))
}

async fn get_author(State(db): State<Db>, Path(author): Path<String>) -> ApiResult<Author> {
    let catalog = db.read().await;
    catalog.author(&author).cloned().map(Json)
}

async fn author_resources(
    State(db): State<Db>,
    Path(author): Path<String>,
    Query(paging): Query<Paging>,
) -> ApiResult<Vec<Resource>> {
    let catalog = db.read().await;
    let id = catalog.author(&author)?.id;
    let owned: Vec<Resource> = catalog
        .resources
        .iter()
        .filter(|r| r.author.id == id)
        .cloned()
        .collect();
    Ok(Json(paging.apply(&owned)))
}

async fn author_reviews(
    State(db): State<Db>,
    Path(author): Path<String>,
    Query(paging): Query<Paging>,
) -> ApiResult<Vec<Review>> {
    let catalog = db.read().await;
    let id = catalog.author(&author)?.id;
    let written: Vec<Review> = catalog
        .reviews
        .iter()
        .filter(|r| r.author.id == id)
        .cloned()
        .collect();
    Ok(Json(paging.apply(&written)))
}

// --- categories ---

async fn list_categories(
    State(db): State<Db>,
    Query(paging): Query<Paging>,
) -> Json<Vec<Category>> {
    let catalog = db.read().await;
    Json(paging.apply(&catalog.categories))
}

async fn get_category(State(db): State<Db>, Path(category): Path<String>) -> ApiResult<Category> {
    let catalog = db.read().await;
    catalog.category(&category).cloned().map(Json)
}

async fn category_resources(
    State(db): State<Db>,
    Path(category): Path<String>,
    Query(paging): Query<Paging>,
) -> ApiResult<Vec<Resource>> {
    let catalog = db.read().await;
    let id = catalog.category(&category)?.id;
    let listed: Vec<Resource> = catalog
        .resources
        .iter()
        .filter(|r| r.category.id == id)
        .cloned()
        .collect();
    Ok(Json(paging.apply(&listed)))
}

// --- resources ---

async fn list_resources(
    State(db): State<Db>,
    Query(paging): Query<Paging>,
) -> Json<Vec<Resource>> {
    let catalog = db.read().await;
    Json(paging.apply(&catalog.resources))
}

async fn new_resources(State(db): State<Db>, Query(paging): Query<Paging>) -> Json<Vec<Resource>> {
    let catalog = db.read().await;
    let mut newest = catalog.resources.clone();
    newest.sort_by(|a, b| b.release_date.cmp(&a.release_date));
    Json(paging.apply(&newest))
}

async fn resources_for_versions(
    State(db): State<Db>,
    Path(versions): Path<String>,
    Query(matching): Query<VersionMatch>,
) -> Result<Json<Value>, ApiError> {
    let check: Vec<String> = versions
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    let method = matching.method.unwrap_or_else(|| "any".to_string());
    let require_all = match method.as_str() {
        "any" => false,
        "all" => true,
        other => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("unknown method {other}"),
            ))
        }
    };

    let catalog = db.read().await;
    let matched: Vec<&Resource> = catalog
        .resources
        .iter()
        .filter(|r| {
            let tested = |v: &String| r.tested_versions.contains(v);
            if require_all {
                check.iter().all(tested)
            } else {
                check.iter().any(tested)
            }
        })
        .collect();
    Ok(Json(json!({ "check": check, "method": method, "match": matched })))
}

async fn get_resource(State(db): State<Db>, Path(resource): Path<String>) -> ApiResult<Resource> {
    let catalog = db.read().await;
    catalog.resource(&resource).cloned().map(Json)
}

async fn resource_author(State(db): State<Db>, Path(resource): Path<String>) -> ApiResult<Author> {
    let catalog = db.read().await;
    let author_id = catalog.resource(&resource)?.author.id;
    catalog.author(&author_id.to_string()).cloned().map(Json)
}

async fn resource_reviews(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(paging): Query<Paging>,
) -> ApiResult<Vec<Review>> {
    let catalog = db.read().await;
    let id = catalog.resource(&resource)?.id;
    let reviews: Vec<Review> = catalog
        .reviews
        .iter()
        .filter(|r| r.resource.id == id)
        .cloned()
        .collect();
    Ok(Json(paging.apply(&reviews)))
}

async fn resource_updates(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(paging): Query<Paging>,
) -> ApiResult<Vec<Update>> {
    let catalog = db.read().await;
    let id = catalog.resource(&resource)?.id;
    let updates: Vec<Update> = catalog
        .updates
        .iter()
        .filter(|u| u.resource.id == id)
        .cloned()
        .collect();
    Ok(Json(paging.apply(&updates)))
}

async fn resource_versions(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(paging): Query<Paging>,
) -> ApiResult<Vec<Version>> {
    let catalog = db.read().await;
    let resource = catalog.resource(&resource)?;
    Ok(Json(paging.apply(&resource.versions)))
}

async fn download_resource(
    State(db): State<Db>,
    Path(resource): Path<String>,
) -> Result<Response, ApiError> {
    serve_file(db, &resource, "latest").await
}

async fn download_version(
    State(db): State<Db>,
    Path((resource, version)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    serve_file(db, &resource, &version).await
}

/// Serve a version's file and count the download. `latest` picks the newest version.
async fn serve_file(db: Db, resource: &str, version: &str) -> Result<Response, ApiError> {
    let mut catalog = db.write().await;
    let index = catalog.resource_index(resource)?;
    let entry = &mut catalog.resources[index];
    let picked = if version == "latest" {
        entry.versions.last_mut()
    } else {
        entry
            .versions
            .iter_mut()
            .find(|v| v.id.to_string() == version || v.name == version)
    };
    let picked = picked.ok_or_else(|| ApiError::not_found("version"))?;
    picked.downloads += 1;
    let body = picked.file.clone();
    let media_type = picked.media_type.clone();
    entry.downloads += 1;
    tracing::debug!(resource, version, bytes = body.len(), "serving download");
    Ok(([(header::CONTENT_TYPE, media_type)], body).into_response())
}

// --- search ---

async fn search_authors(
    State(db): State<Db>,
    Path(query): Path<String>,
    Query(paging): Query<Paging>,
) -> Json<Vec<Author>> {
    let needle = query.to_lowercase();
    let catalog = db.read().await;
    let hits: Vec<Author> = catalog
        .authors
        .iter()
        .filter(|a| a.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    Json(paging.apply(&hits))
}

async fn search_resources(
    State(db): State<Db>,
    Path(query): Path<String>,
    Query(paging): Query<Paging>,
) -> Json<Vec<Resource>> {
    let needle = query.to_lowercase();
    let catalog = db.read().await;
    let hits: Vec<Resource> = catalog
        .resources
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    Json(paging.apply(&hits))
}

// --- status & webhooks ---

async fn status(State(db): State<Db>) -> Json<Value> {
    let catalog = db.read().await;
    Json(json!({
        "status": { "server": { "name": "mock", "mode": "master" } },
        "stats": {
            "resources": catalog.resources.len(),
            "authors": catalog.authors.len(),
            "categories": catalog.categories.len(),
            "reviews": catalog.reviews.len(),
            "resource_updates": catalog.updates.len(),
        }
    }))
}

async fn webhook_events() -> Json<Value> {
    Json(json!({ "events": WEBHOOK_EVENTS }))
}

async fn webhook_status(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Value> {
    let catalog = db.read().await;
    let hook = catalog
        .webhooks
        .get(&id)
        .ok_or_else(|| ApiError::not_found("webhook"))?;
    Ok(Json(json!({ "status": 0, "failedConnections": hook.failed_connections })))
}

/// Accepts `url` (or `callbackUrl`) and a comma separated `events` (or `types`).
async fn register_webhook(
    State(db): State<Db>,
    Form(form): Form<HashMap<String, String>>,
) -> ApiResult<Value> {
    let url = form
        .get("url")
        .or_else(|| form.get("callbackUrl"))
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "missing url"))?
        .clone();
    let events: Vec<String> = form
        .get("events")
        .or_else(|| form.get("types"))
        .map(|e| e.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    let hook = Webhook {
        id: Uuid::new_v4().simple().to_string(),
        secret: Uuid::new_v4().simple().to_string(),
        url,
        events,
        failed_connections: 0,
    };
    tracing::info!(id = %hook.id, url = %hook.url, "webhook registered");
    let body = json!({ "id": hook.id, "secret": hook.secret });
    db.write().await.webhooks.insert(hook.id.clone(), hook);
    Ok(Json(body))
}

async fn delete_webhook(
    State(db): State<Db>,
    Path((id, secret)): Path<(String, String)>,
) -> ApiResult<Value> {
    let mut catalog = db.write().await;
    let hook = catalog
        .webhooks
        .get(&id)
        .ok_or_else(|| ApiError::not_found("webhook"))?;
    if hook.secret != secret {
        return Err(ApiError::new(StatusCode::FORBIDDEN, "invalid secret"));
    }
    catalog.webhooks.remove(&id);
    tracing::info!(%id, "webhook deleted");
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_catalog_references_resolve() {
        let catalog = Catalog::seeded();
        for resource in &catalog.resources {
            assert!(catalog.author(&resource.author.id.to_string()).is_ok());
            assert!(catalog.category(&resource.category.id.to_string()).is_ok());
            assert_eq!(
                resource.versions.last().map(|v| v.id),
                Some(resource.version.id)
            );
        }
        for review in &catalog.reviews {
            assert!(catalog.resource(&review.resource.id.to_string()).is_ok());
        }
    }

    #[test]
    fn author_lookup_by_id_or_name() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.author("2").unwrap().name, "sk89q");
        assert_eq!(catalog.author("Zoë/Tools").unwrap().id, 3);
        assert!(catalog.author("nobody").is_err());
    }

    #[test]
    fn paging_is_one_based() {
        let items = [1, 2, 3, 4, 5];
        let second = Paging { size: Some(2), page: Some(2) };
        assert_eq!(second.apply(&items), vec![3, 4]);
        let past_end = Paging { size: Some(2), page: Some(9) };
        assert!(past_end.apply(&items).is_empty());
        assert_eq!(Paging::default().apply(&items).len(), 5);
    }

    #[test]
    fn huge_page_offsets_are_empty() {
        let huge = Paging {
            size: Some(usize::MAX),
            page: Some(3),
        };
        assert!(huge.apply(&[1, 2, 3]).is_empty());
    }

    #[test]
    fn resource_serializes_camel_case_without_files() {
        let catalog = Catalog::seeded();
        let json = serde_json::to_value(&catalog.resources[1]).unwrap();
        assert_eq!(json["name"], "WorldEdit");
        assert_eq!(json["testedVersions"], json!(["1.20", "1.21"]));
        assert_eq!(json["version"]["id"], 21);
        assert!(json.get("versions").is_none());
    }

    #[test]
    fn webhook_secret_is_not_serialized() {
        let hook = Webhook {
            id: "abc".to_string(),
            secret: "hidden".to_string(),
            url: "https://x".to_string(),
            events: vec!["new_resource".to_string()],
            failed_connections: 0,
        };
        let json = serde_json::to_value(&hook).unwrap();
        assert!(json.get("secret").is_none());
        assert_eq!(json["failedConnections"], 0);
    }
}
