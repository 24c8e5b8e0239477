//! HTTP API for catalog display-order operations.
//!
//! Exposes auto-organize, fix-duplicates and reorder for an admin panel's
//! drag-and-drop product list, plus a read-only listing.

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use catalog_core::{
    CoreError, DedupeReport, OrderTarget, OrderingService, OrganizeReport, Product,
    ProductStore, RepositionReport,
};
use catalog_fs::Catalog;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Events written through the server are attributed to this actor.
const ACTOR: &str = "catalog-server";

/// Server state shared across handlers.
pub struct AppState<S = Catalog> {
    service: OrderingService<S>,
}

impl AppState {
    /// Wrap a catalog, honoring its ordering configuration.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        let serialize = catalog.config().ordering.serialize_group_writes;
        Self::from_service(OrderingService::with_serialization(
            catalog.with_actor(ACTOR),
            serialize,
        ))
    }
}

impl<S: ProductStore> AppState<S> {
    /// Serve an already configured ordering service.
    #[must_use]
    pub const fn from_service(service: OrderingService<S>) -> Self {
        Self { service }
    }

    /// Run a service call on the blocking pool. The service takes a
    /// per-category `std::sync::Mutex` and does file IO, neither of which may
    /// stall a runtime worker.
    async fn run<T, F>(self: &Arc<Self>, f: F) -> Result<T, AppError>
    where
        S: 'static,
        T: Send + 'static,
        F: FnOnce(&OrderingService<S>) -> catalog_core::Result<T> + Send + 'static,
    {
        let state = Arc::clone(self);
        let outcome = tokio::task::spawn_blocking(move || f(&state.service))
            .await
            .context("Ordering task failed")?;
        Ok(outcome?)
    }
}

/// Build the application router.
pub fn router<S: ProductStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/categories/{category_id}/products",
            get(list_products::<S>),
        )
        .route("/api/products/auto-organize", post(auto_organize::<S>))
        .route("/api/products/fix-duplicates", post(fix_duplicates::<S>))
        .route("/api/products/reorder", post(reorder::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server.
///
/// # Errors
/// Returns error if the catalog cannot be opened, binding fails, or the
/// server encounters an error.
pub async fn serve(catalog_path: &std::path::Path, host: &str, port: u16) -> Result<()> {
    let catalog = Catalog::open(catalog_path).context("Failed to open catalog")?;
    let app = router(Arc::new(AppState::new(catalog)));

    let addr = format!("{host}:{port}");
    info!(address = %addr, "Starting catalog server");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Request/Response types ---

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupRequest {
    #[serde(default, alias = "categoryId")]
    group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReorderRequest {
    #[serde(default, alias = "productId")]
    item_id: Option<String>,
    #[serde(default, alias = "categoryId")]
    group_id: Option<String>,
    /// `None` when the key is absent; `Some(Value::Null)` means clear.
    #[serde(default, deserialize_with = "present")]
    new_order: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Handlers ---

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_products<S: ProductStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(category_id): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.run(move |svc| svc.products(&category_id)).await?;
    Ok(Json(products))
}

async fn auto_organize<S: ProductStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<GroupRequest>, JsonRejection>,
) -> Result<Json<OrganizeReport>, AppError> {
    let req = body(payload)?;
    let group_id = req.group_id.unwrap_or_default();

    let report = state.run(move |svc| svc.auto_organize(&group_id)).await?;
    Ok(Json(report))
}

async fn fix_duplicates<S: ProductStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<GroupRequest>, JsonRejection>,
) -> Result<Json<DedupeReport>, AppError> {
    let req = body(payload)?;
    let group_id = req.group_id.unwrap_or_default();

    let report = state.run(move |svc| svc.fix_duplicates(&group_id)).await?;
    Ok(Json(report))
}

async fn reorder<S: ProductStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> Result<Json<RepositionReport>, AppError> {
    let req = body(payload)?;
    let item_id = req.item_id.unwrap_or_default();
    let group_id = req.group_id.unwrap_or_default();

    catalog_core::validate_id("itemId", &item_id)?;
    catalog_core::validate_id("groupId", &group_id)?;
    let target = OrderTarget::from_json(req.new_order.as_ref())?;

    let report = state
        .run(move |svc| svc.reorder(&item_id, &group_id, target))
        .await?;
    Ok(Json(report))
}

// --- Error handling ---

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self.0.downcast_ref::<CoreError>() {
            Some(CoreError::Validation(msg)) => {
                warn!(error = %msg, "Rejected invalid request");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Some(err @ CoreError::ItemNotFound { .. }) => {
                warn!(error = %err, "Product not found");
                (StatusCode::NOT_FOUND, err.to_string())
            }
            _ => {
                error!(error = ?self.0, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Treat an unreadable body as a validation failure rather than a 500.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, CoreError> {
    payload
        .map(|Json(req)| req)
        .map_err(|rejection| CoreError::Validation(rejection.body_text()))
}
