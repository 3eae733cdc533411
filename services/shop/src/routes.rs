//! Shop service routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AdminUser, AuthUser, auth_middleware},
    models::{LoginRequest, RegisterRequest, RestockRequest, SearchQuery, SweetRequest},
    state::AppState,
    validation::validate_restock_amount,
};

/// JSON body whose parse failures are reported as validation errors
type JsonBody<T> = WithRejection<Json<T>, ApiError>;

/// Sweet id path segment, rejected as a validation error when not an integer
type SweetId = WithRejection<Path<i64>, ApiError>;

type SearchParams = WithRejection<Query<SearchQuery>, ApiError>;

/// Create the router for the shop service
pub fn create_router(state: AppState) -> Router {
    let sweet_routes = Router::new()
        .route("/api/sweets", get(list_sweets).post(create_sweet))
        .route("/api/sweets/search", get(search_sweets))
        .route(
            "/api/sweets/:id",
            get(get_sweet).put(update_sweet).delete(delete_sweet),
        )
        .route("/api/sweets/:id/purchase", post(purchase_sweet))
        .route("/api/sweets/:id/restock", post(restock_sweet))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .merge(sweet_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "sweet-shop"
    }))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Registration request for user: {}", payload.username);

    let response = state.auth_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Login attempt for user: {}", payload.username);

    let response = state.auth_service.login(payload).await?;
    Ok(Json(response))
}

/// List every sweet
pub async fn list_sweets(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.sweet_service.list_all().await?))
}

/// Search sweets by name, category and price range
pub async fn search_sweets(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Query(query), _): SearchParams,
) -> ApiResult<impl IntoResponse> {
    let sweets = state.sweet_service.search(&query.into()).await?;
    Ok(Json(sweets))
}

/// Get a sweet by ID
pub async fn get_sweet(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Path(id), _): SweetId,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.sweet_service.get_by_id(id).await?))
}

/// Add a sweet to the catalog
pub async fn create_sweet(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    WithRejection(Json(payload), _): JsonBody<SweetRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("{} creating sweet {}", admin.username, payload.name);

    let sweet = state.sweet_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(sweet)))
}

/// Replace a sweet's fields
pub async fn update_sweet(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    WithRejection(Path(id), _): SweetId,
    WithRejection(Json(payload), _): JsonBody<SweetRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("{} updating sweet {}", admin.username, id);

    Ok(Json(state.sweet_service.update(id, payload).await?))
}

/// Remove a sweet from the catalog
pub async fn delete_sweet(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    WithRejection(Path(id), _): SweetId,
) -> ApiResult<impl IntoResponse> {
    info!("{} deleting sweet {}", admin.username, id);

    state.sweet_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Buy one unit of a sweet
pub async fn purchase_sweet(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): SweetId,
) -> ApiResult<impl IntoResponse> {
    info!("{} purchasing sweet {}", user.username, id);

    Ok(Json(state.sweet_service.purchase(id).await?))
}

/// Add stock to a sweet
pub async fn restock_sweet(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    WithRejection(Path(id), _): SweetId,
    WithRejection(Json(payload), _): JsonBody<RestockRequest>,
) -> ApiResult<impl IntoResponse> {
    let amount = validate_restock_amount(payload.quantity)?;
    info!("{} restocking sweet {} by {}", admin.username, id, amount);

    Ok(Json(state.sweet_service.restock(id, amount).await?))
}
