//! Request handlers
//!
//! Handlers only translate between HTTP and the facade; validation and
//! store selection happen behind it.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    routing::{get, post},
};

use duostore_core::{NewProduct, Product, UserRecord};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/test", get(list_users))
        .route("/test/{id}", get(get_user))
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .route("/test1", post(create_product))
        .route("/testA", get(cross_store_probe))
        .with_state(state)
}

async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserRecord>>> {
    Ok(Json(state.facade.list_secondary_users().await?))
}

async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<UserRecord>> {
    let Path(id) = id?;
    state
        .facade
        .find_secondary_user(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
}

async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.facade.list_products().await?))
}

async fn get_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Product>> {
    let Path(id) = id?;
    state
        .facade
        .find_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", id)))
}

/// Persist a draft; the created record is logged, the response has no body
async fn create_product(
    State(state): State<AppState>,
    draft: Result<Json<NewProduct>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(draft) = draft?;
    state.facade.create_product(draft).await?;
    Ok(StatusCode::OK)
}

async fn cross_store_probe(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.facade.diagnostic_cross_store_probe().await?;
    Ok(StatusCode::OK)
}
