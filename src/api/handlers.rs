use crate::{
    api::{
        models::{ApiError, CACHE_STATUS_HEADER, ErrorResponse, GetBalanceRequest, GetBalanceResponse},
        rate_limit::RateLimiter,
    },
    auth::ApiKeyRegistry,
    core::{errors::WalletGateError, services::DynBalanceService},
};
use axum::{
    Json, Router,
    extract::{ConnectInfo, Request, State, rejection::JsonRejection},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use http::header;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DynBalanceService>,
    pub api_keys: Arc<ApiKeyRegistry>,
    pub rate_limiter: Arc<RateLimiter>,
}

// Middleware to reject clients over their request budget
async fn rate_limit_middleware(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, ApiError> {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !state.rate_limiter.check(&client) {
        warn!(client, "rate limit exceeded");
        return Err(WalletGateError::RateLimited.into());
    }
    Ok(next.run(req).await)
}

// Middleware to validate the raw API key in the Authorization header
async fn auth_middleware(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, ApiError> {
    let api_key = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .filter(|k| !k.is_empty())
        .ok_or(WalletGateError::MissingApiKey)?;

    if !state.api_keys.is_valid_key(api_key).await {
        return Err(WalletGateError::InvalidApiKey.into());
    }
    Ok(next.run(req).await)
}

// Define API routes
pub fn api_routes(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/get-balance", post(get_balance))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(|| async { "OK" }))
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/get-balance",
    request_body = GetBalanceRequest,
    responses(
        (status = 200, description = "Balances resolved; failed addresses are listed in `errors`", body = GetBalanceResponse,
            headers(("x-cache" = String, description = "HIT when every balance came from cache, otherwise MISS"))),
        (status = 400, description = "Invalid request format or no wallets provided", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    ),
    security(("ApiKey" = []))
)]
pub(crate) async fn get_balance(
    State(state): State<AppState>,
    payload: Result<Json<GetBalanceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| WalletGateError::InvalidRequest(e.body_text()))?;
    if req.wallets.is_empty() {
        return Err(WalletGateError::EmptyBatch.into());
    }

    let result = state.service.resolve_batch(&req.wallets).await?;
    let cache_status = result.cache_status.as_header_value();
    Ok((
        [(CACHE_STATUS_HEADER, cache_status)],
        Json(GetBalanceResponse::from(result)),
    ))
}
