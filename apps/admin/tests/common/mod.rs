//! In-process fake of the rental backend for end-to-end tests.
//!
//! Serves the `/api/v1` endpoints the admin pages touch, backed by an
//! in-memory store, on an ephemeral port. Each test gets its own instance.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use rental_admin::{AdminApp, HistoryNavigator};
use rental_client::{ClientConfig, MemoryStorage, Storage};

pub const DEMO_EMAIL: &str = "admin@example.com";
pub const DEMO_PASSWORD: &str = "admin123";
pub const ACCESS_TOKEN: &str = "test-access-token";

// =============================================================================
// Backend State
// =============================================================================

#[derive(Default)]
struct Store {
    categories: Vec<Value>,
    brands: Vec<Value>,
    purchases: Vec<Value>,
    returns: Vec<Value>,
    units: Vec<Value>,
    unit_queries: Vec<String>,
    next_id: u64,
    fail_next_write: bool,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{:04}", prefix, self.next_id)
    }
}

#[derive(Clone, Default)]
struct Shared {
    store: Arc<Mutex<Store>>,
    category_lists: Arc<AtomicUsize>,
}

impl Shared {
    fn with_store<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        let mut guard = self.store.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut guard)
    }
}

/// A running fake backend.
pub struct Backend {
    pub base_url: String,
    shared: Shared,
}

impl Backend {
    pub async fn start() -> Self {
        let shared = Shared::default();
        let app = Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/me", get(me))
            .route("/api/v1/auth/logout", post(logout))
            .route("/api/v1/categories/", get(list_categories).post(create_category))
            .route(
                "/api/v1/categories/{id}",
                get(get_category).delete(delete_category),
            )
            .route("/api/v1/brands/", get(list_brands).post(create_brand))
            .route(
                "/api/v1/transactions/purchases",
                get(list_purchases).post(create_purchase),
            )
            .route("/api/v1/transactions/purchases/{id}", get(get_purchase))
            .route("/api/v1/transactions/purchase-returns", post(create_return))
            .route(
                "/api/v1/transactions/purchase-returns/purchase/{id}",
                get(returns_for_purchase),
            )
            .route("/api/v1/inventory/units", get(list_units))
            .route("/api/v1/inventory/units/{id}/status", put(set_unit_status))
            .route("/api/v1/inventory/units/{id}/transfer", post(transfer_unit))
            .with_state(shared.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Backend {
            base_url: format!("http://{}/api/v1", addr),
            shared,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_base_url(&self.base_url)
    }

    /// Seeds a category directly, bypassing the API.
    pub fn seed_category(&self, name: &str, parent_id: Option<&str>) -> Value {
        self.shared
            .with_store(|store| insert_category(store, name, parent_id))
            .unwrap_or_else(|_| panic!("could not seed category {}", name))
    }

    pub fn categories(&self) -> Vec<Value> {
        self.shared.with_store(|store| store.categories.clone())
    }

    pub fn purchases(&self) -> Vec<Value> {
        self.shared.with_store(|store| store.purchases.clone())
    }

    pub fn purchase_returns(&self) -> Vec<Value> {
        self.shared.with_store(|store| store.returns.clone())
    }

    pub fn units(&self) -> Vec<Value> {
        self.shared.with_store(|store| store.units.clone())
    }

    /// Raw query strings `GET /inventory/units` was called with.
    pub fn unit_queries(&self) -> Vec<String> {
        self.shared.with_store(|store| store.unit_queries.clone())
    }

    /// Seeds an inventory unit directly, bypassing the API.
    pub fn seed_unit(&self, code: &str, location_id: &str, status: &str) -> Value {
        self.shared.with_store(|store| {
            let id = store.next_id("unit");
            let unit = json!({
                "id": id,
                "sku_id": "sku-0001",
                "inventory_code": code,
                "location_id": location_id,
                "status": status,
                "condition_grade": "A",
                "is_active": true
            });
            store.units.push(unit.clone());
            unit
        })
    }

    /// The next create answers 500 with an empty body.
    pub fn fail_next_write(&self) {
        self.shared.with_store(|store| store.fail_next_write = true);
    }

    /// How many times `GET /categories/` was served.
    pub fn category_list_calls(&self) -> usize {
        self.shared.category_lists.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Mounting
// =============================================================================

pub async fn mount(backend: &Backend) -> (AdminApp, HistoryNavigator) {
    mount_with(backend, Arc::new(MemoryStorage::new())).await
}

pub async fn mount_with(backend: &Backend, storage: Arc<dyn Storage>) -> (AdminApp, HistoryNavigator) {
    mount_config(backend.config(), storage).await
}

pub async fn mount_config(config: ClientConfig, storage: Arc<dyn Storage>) -> (AdminApp, HistoryNavigator) {
    let nav = HistoryNavigator::new();
    let app = AdminApp::mount(config, storage, Arc::new(nav.clone()))
        .await
        .unwrap();
    (app, nav)
}

/// Mounts and signs in with the demo account.
pub async fn mount_signed_in(backend: &Backend) -> (AdminApp, HistoryNavigator) {
    let (app, nav) = mount(backend).await;
    sign_in(&app).await;
    (app, nav)
}

/// Like [`mount_signed_in`], with query results fresh for `stale_secs`.
pub async fn mount_signed_in_caching(backend: &Backend, stale_secs: u64) -> (AdminApp, HistoryNavigator) {
    let mut config = backend.config();
    config.cache.stale_secs = stale_secs;
    let (app, nav) = mount_config(config, Arc::new(MemoryStorage::new())).await;
    sign_in(&app).await;
    (app, nav)
}

async fn sign_in(app: &AdminApp) {
    let mut page = rental_admin::pages::LoginPage::new(app.context(), None);
    page.fill(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
    page.submit().await.unwrap();
}

// =============================================================================
// Handlers
// =============================================================================

fn demo_user() -> Value {
    json!({
        "id": "user-0001",
        "email": DEMO_EMAIL,
        "username": "admin",
        "first_name": "Demo",
        "last_name": "Admin",
        "user_type": "SUPERADMIN",
        "is_active": true,
        "is_superuser": true,
        "effective_permissions": { "all_permissions": [] }
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", ACCESS_TOKEN))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Not authenticated" })),
    )
        .into_response()
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == DEMO_EMAIL && body["password"] == DEMO_PASSWORD {
        Json(json!({
            "user": demo_user(),
            "access_token": ACCESS_TOKEN,
            "refresh_token": "test-refresh-token",
            "token_type": "bearer"
        }))
        .into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Incorrect email or password")
    }
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(demo_user()).into_response()
}

async fn logout() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    skip: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
}

fn page_of(rows: &[Value], name_field: &str, q: &ListQuery) -> Value {
    let matching: Vec<&Value> = rows
        .iter()
        .filter(|row| match q.search.as_deref() {
            Some(term) => row[name_field]
                .as_str()
                .is_some_and(|n| n.to_lowercase().contains(&term.to_lowercase())),
            None => true,
        })
        .filter(|row| match q.is_active {
            Some(active) => row["is_active"] == active,
            None => true,
        })
        .collect();
    let skip = q.skip.unwrap_or(0);
    let limit = q.limit.unwrap_or(100);
    let items: Vec<Value> = matching.iter().skip(skip).take(limit).map(|v| (*v).clone()).collect();
    json!({
        "items": items,
        "total": matching.len(),
        "skip": skip,
        "limit": limit
    })
}

async fn list_categories(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<ListQuery>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    shared.category_lists.fetch_add(1, Ordering::SeqCst);
    let body = shared.with_store(|store| page_of(&store.categories, "category_name", &q));
    Json(body).into_response()
}

/// Computes path, level and leaf flag the way the real backend does.
fn insert_category(store: &mut Store, name: &str, parent_id: Option<&str>) -> Result<Value, Response> {
    if store
        .categories
        .iter()
        .any(|c| c["category_name"].as_str().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    {
        return Err(detail(
            StatusCode::BAD_REQUEST,
            &format!("Category with name '{}' already exists", name),
        ));
    }

    let (path, level) = match parent_id {
        Some(pid) => {
            let Some(parent) = store.categories.iter_mut().find(|c| c["id"] == pid) else {
                return Err(detail(StatusCode::NOT_FOUND, "Parent category not found"));
            };
            parent["is_leaf"] = json!(false);
            let level = parent["category_level"].as_u64().unwrap_or(0) + 1;
            let path = format!("{}/{}", parent["category_path"].as_str().unwrap_or(""), name);
            (path, level)
        }
        None => (name.to_string(), 0),
    };

    let id = store.next_id("cat");
    let category = json!({
        "id": id,
        "category_name": name,
        "parent_category_id": parent_id,
        "category_path": path,
        "category_level": level,
        "display_order": 0,
        "is_leaf": true,
        "is_active": true,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    });
    store.categories.push(category.clone());
    Ok(category)
}

async fn create_category(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let name = body["category_name"].as_str().unwrap_or_default().to_string();
    let parent = body["parent_category_id"].as_str().map(str::to_string);

    shared.with_store(|store| {
        if std::mem::take(&mut store.fail_next_write) {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        match insert_category(store, &name, parent.as_deref()) {
            Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
            Err(response) => response,
        }
    })
}

async fn get_category(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    shared.with_store(|store| match store.categories.iter().find(|c| c["id"] == id.as_str()) {
        Some(c) => Json(c.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Category not found"),
    })
}

async fn delete_category(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    shared.with_store(|store| {
        if store
            .categories
            .iter()
            .any(|c| c["parent_category_id"] == id.as_str())
        {
            return detail(StatusCode::BAD_REQUEST, "Cannot delete category with children");
        }
        let before = store.categories.len();
        store.categories.retain(|c| c["id"] != id.as_str());
        if store.categories.len() == before {
            detail(StatusCode::NOT_FOUND, "Category not found")
        } else {
            StatusCode::NO_CONTENT.into_response()
        }
    })
}

async fn list_brands(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<ListQuery>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let body = shared.with_store(|store| page_of(&store.brands, "brand_name", &q));
    Json(body).into_response()
}

async fn create_brand(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    shared.with_store(|store| {
        let name = body["brand_name"].as_str().unwrap_or_default();
        let code = body["brand_code"].as_str();
        if let Some(code) = code {
            if store.brands.iter().any(|b| b["brand_code"] == code) {
                return detail(
                    StatusCode::CONFLICT,
                    &format!("Brand with code '{}' already exists", code),
                );
            }
        }
        let id = store.next_id("brand");
        let brand = json!({
            "id": id,
            "brand_name": name,
            "brand_code": code,
            "description": body["description"],
            "is_active": true
        });
        store.brands.push(brand.clone());
        (StatusCode::CREATED, Json(brand)).into_response()
    })
}

// =============================================================================
// Purchases
// =============================================================================

async fn list_purchases(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<ListQuery>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let body = shared.with_store(|store| page_of(&store.purchases, "reference_number", &q));
    Json(body).into_response()
}

/// Records the purchase and shelves one unit per purchased piece.
async fn create_purchase(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    shared.with_store(|store| {
        if std::mem::take(&mut store.fail_next_write) {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        let lines = body["items"].as_array().cloned().unwrap_or_default();
        let mut items = Vec::new();
        let mut total = 0.0;
        let mut pieces = 0;
        for line in &lines {
            let quantity = line["quantity"].as_u64().unwrap_or(0);
            let cost = line["unit_cost"].as_f64().unwrap_or(0.0);
            total += cost * quantity as f64;
            pieces += quantity;
            let item_id = store.next_id("pitem");
            items.push(json!({
                "id": item_id,
                "sku_id": line["sku_id"],
                "quantity": quantity,
                "unit_cost": cost,
                "total_cost": cost * quantity as f64,
                "condition": line["condition"],
                "location_id": line["location_id"]
            }));
            for _ in 0..quantity {
                let unit_id = store.next_id("unit");
                store.units.push(json!({
                    "id": unit_id,
                    "sku_id": line["sku_id"],
                    "location_id": line["location_id"].as_str().unwrap_or("loc-0001"),
                    "status": "AVAILABLE",
                    "condition_grade": line["condition"],
                    "purchase_price": cost,
                    "is_active": true
                }));
            }
        }
        let id = store.next_id("pur");
        let purchase = json!({
            "id": id,
            "supplier_id": body["supplier_id"],
            "purchase_date": body["purchase_date"],
            "reference_number": body["reference_number"],
            "notes": body["notes"],
            "total_amount": total,
            "total_items": pieces,
            "status": "COMPLETED",
            "payment_status": "PAID",
            "items": items
        });
        store.purchases.push(purchase.clone());
        (StatusCode::CREATED, Json(purchase)).into_response()
    })
}

async fn get_purchase(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    shared.with_store(|store| match store.purchases.iter().find(|p| p["id"] == id.as_str()) {
        Some(p) => Json(p.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Purchase not found"),
    })
}

fn returned_quantity(store: &Store, purchase_id: &str, sku_id: &str) -> u64 {
    store
        .returns
        .iter()
        .filter(|r| r["original_purchase_id"] == purchase_id && r["status"] != "CANCELLED")
        .flat_map(|r| r["items"].as_array().cloned().unwrap_or_default())
        .filter(|i| i["sku_id"] == sku_id)
        .map(|i| i["quantity"].as_u64().unwrap_or(0))
        .sum()
}

async fn create_return(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    shared.with_store(|store| {
        let purchase_id = body["original_purchase_id"].as_str().unwrap_or_default().to_string();
        let Some(purchase) = store.purchases.iter().find(|p| p["id"] == purchase_id.as_str()).cloned()
        else {
            return detail(StatusCode::NOT_FOUND, "Original purchase not found");
        };
        let lines = body["items"].as_array().cloned().unwrap_or_default();
        for line in &lines {
            let sku = line["sku_id"].as_str().unwrap_or_default();
            let bought: u64 = purchase["items"]
                .as_array()
                .into_iter()
                .flatten()
                .filter(|i| i["sku_id"] == sku)
                .map(|i| i["quantity"].as_u64().unwrap_or(0))
                .sum();
            let asked = line["quantity"].as_u64().unwrap_or(0);
            if asked + returned_quantity(store, &purchase_id, sku) > bought {
                return detail(
                    StatusCode::BAD_REQUEST,
                    &format!("Return quantity for SKU {} exceeds purchased quantity", sku),
                );
            }
        }
        let id = store.next_id("ret");
        let ret = json!({
            "id": id,
            "supplier_id": body["supplier_id"],
            "original_purchase_id": purchase_id,
            "return_date": body["return_date"],
            "refund_amount": body["refund_amount"],
            "status": "COMPLETED",
            "items": lines
        });
        store.returns.push(ret.clone());
        if let Some(p) = store.purchases.iter_mut().find(|p| p["id"] == purchase_id.as_str()) {
            p["status"] = json!("PARTIALLY_RETURNED");
        }
        (StatusCode::CREATED, Json(ret)).into_response()
    })
}

async fn returns_for_purchase(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let rows: Vec<Value> = shared.with_store(|store| {
        store
            .returns
            .iter()
            .filter(|r| r["original_purchase_id"] == id.as_str())
            .cloned()
            .collect()
    });
    Json(rows).into_response()
}

// =============================================================================
// Inventory
// =============================================================================

/// Honors repeated `statuses` and `location_ids` keys.
async fn list_units(
    State(shared): State<Shared>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let raw = raw.unwrap_or_default();
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect();
    let wanted = |key: &str| -> Vec<String> {
        pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    };
    let statuses = wanted("statuses");
    let locations = wanted("location_ids");
    let body = shared.with_store(|store| {
        store.unit_queries.push(raw.clone());
        let items: Vec<Value> = store
            .units
            .iter()
            .filter(|u| statuses.is_empty() || statuses.iter().any(|s| u["status"] == s.as_str()))
            .filter(|u| {
                locations.is_empty() || locations.iter().any(|l| u["location_id"] == l.as_str())
            })
            .cloned()
            .collect();
        json!({ "items": items, "total": items.len(), "skip": 0, "limit": 100 })
    });
    Json(body).into_response()
}

async fn set_unit_status(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    shared.with_store(|store| match store.units.iter_mut().find(|u| u["id"] == id.as_str()) {
        Some(unit) => {
            unit["status"] = body["status"].clone();
            unit["notes"] = body["notes"].clone();
            Json(unit.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Inventory unit not found"),
    })
}

async fn transfer_unit(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    shared.with_store(|store| match store.units.iter_mut().find(|u| u["id"] == id.as_str()) {
        Some(unit) => {
            unit["location_id"] = body["to_location_id"].clone();
            Json(unit.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Inventory unit not found"),
    })
}
