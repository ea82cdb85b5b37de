use axum::{
    extract::{Path, Query},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::catalog::{Catalog, CatalogEntry};
use crate::metrics::ApiMetrics;

pub const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ItemsQuery {
    pub min_stores: Option<usize>,
    pub limit: Option<usize>,
}

/// Health check endpoint
async fn health(Extension(catalog): Extension<Arc<Catalog>>) -> impl IntoResponse {
    ApiMetrics::record_request("/health", 200);
    Json(serde_json::json!({
        "status": "healthy",
        "service": "price-catalog",
        "version": env!("CARGO_PKG_VERSION"),
        "items": catalog.len(),
    }))
}

async fn list_items(
    Extension(catalog): Extension<Arc<Catalog>>,
    Query(query): Query<ItemsQuery>,
) -> Json<Vec<CatalogEntry>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let items = catalog
        .list(query.min_stores, limit)
        .into_iter()
        .cloned()
        .collect();
    ApiMetrics::record_request("/items", 200);
    Json(items)
}

async fn get_prices(Extension(catalog): Extension<Arc<Catalog>>, Path(id): Path<u64>) -> Response {
    match catalog.get(id) {
        Some(entry) => {
            ApiMetrics::record_request("/prices/:id", 200);
            Json(entry.clone()).into_response()
        }
        None => {
            ApiMetrics::record_request("/prices/:id", 404);
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "message": "Item not found" })),
            )
                .into_response()
        }
    }
}

async fn metrics_snapshot() -> Response {
    match crate::metrics::render() {
        Some(text) => text.into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

/// Create the HTTP router over an immutable catalog snapshot
pub fn create_server(catalog: Arc<Catalog>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/items", get(list_items))
        .route("/prices/:id", get(get_prices))
        .route("/metrics", get(metrics_snapshot))
        .layer(Extension(catalog))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(catalog: Catalog, port: u16) -> anyhow::Result<()> {
    ApiMetrics::record_catalog_loaded(catalog.len());
    let app = create_server(Arc::new(catalog));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    info!("Items:   http://localhost:{port}/items");
    info!("Metrics: http://localhost:{port}/metrics");

    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
