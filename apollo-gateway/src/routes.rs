//! Axum route handlers for the Apollo API.

use std::sync::Arc;

use apollo_backend::{unpack, Operation, TableBackend};
use apollo_core::{ApiInfo, Envelope};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use serde_json::Value;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::error::{panic_response, GatewayError, OperationFailure};

/// Value of the `format` parameter added to join and union requests.
pub const RESULT_FORMAT: &str = "dict";

// ── Shared state ─────────────────────────────────────────────────────────────

/// State shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn TableBackend>,
    info: Arc<ApiInfo>,
}

impl AppState {
    #[must_use]
    pub fn new(backend: Arc<dyn TableBackend>, info: ApiInfo) -> Self {
        Self { backend, info: Arc::new(info) }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", located("/about", get(root)))
        .route("/version", located("/version", get(version)))
        .route("/about", located("/about", get(about)))
        .route("/get-table", located("/get-table", guarded(post(get_table))))
        .route("/join", located("/join", guarded(post(join))))
        .route("/union", located("/union", guarded(post(union))))
        .route("/create-table", located("/create-table", guarded(post(create_table))))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Stamp every response of `route` with a fixed `Location` header, and
/// answer unsupported methods with the JSON 405 body.
fn located(path: &'static str, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(method_not_allowed).layer(SetResponseHeaderLayer::overriding(
        header::LOCATION,
        HeaderValue::from_static(path),
    ))
}

/// Turn a panic inside `route` into the 500 error envelope.
fn guarded(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.layer(CatchPanicLayer::custom(panic_response))
}

// ── Metadata handlers ─────────────────────────────────────────────────────────

/// `GET /` — 302 redirect to `/about`.
pub async fn root() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/about")])
}

/// `GET /version`
pub async fn version(State(state): State<AppState>) -> Json<Value> {
    Json(state.info.version_body())
}

/// `GET /about`
pub async fn about(State(state): State<AppState>) -> Json<Value> {
    Json(state.info.about_body())
}

/// Fallback for every path without a route.
pub async fn not_found(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(state.info.not_found_body()))
}

/// Fallback for a known path called with a method it does not serve.
pub async fn method_not_allowed(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, Json(state.info.method_not_allowed_body()))
}

// ── Data handlers ─────────────────────────────────────────────────────────────

/// `POST /get-table`
///
/// # Errors
/// Any failure is returned as an [`OperationFailure`] (HTTP 500 envelope).
pub async fn get_table(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, OperationFailure> {
    dispatch(&state, Operation::GetTable, body).await
}

/// `POST /join`
///
/// # Errors
/// Any failure is returned as an [`OperationFailure`] (HTTP 500 envelope).
pub async fn join(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, OperationFailure> {
    dispatch(&state, Operation::Join, body).await
}

/// `POST /union`
///
/// # Errors
/// Any failure is returned as an [`OperationFailure`] (HTTP 500 envelope).
pub async fn union(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, OperationFailure> {
    dispatch(&state, Operation::Union, body).await
}

/// `POST /create-table` — answers 201 on success.
///
/// # Errors
/// Any failure is returned as an [`OperationFailure`] (HTTP 500 envelope).
pub async fn create_table(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, OperationFailure> {
    dispatch(&state, Operation::CreateTable, body).await
}

// ── Envelope pipeline ─────────────────────────────────────────────────────────

/// Status code of a successful `operation`.
#[must_use]
pub fn success_status(operation: Operation) -> StatusCode {
    match operation {
        Operation::CreateTable => StatusCode::CREATED,
        _ => StatusCode::OK,
    }
}

/// Unpack, call the backend, and wrap the outcome in an envelope.
async fn dispatch(
    state: &AppState,
    operation: Operation,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, OperationFailure> {
    let request = parse_request(body)?;
    let mut params = unpack::for_operation(operation, &request).map_err(GatewayError::from)?;
    if matches!(operation, Operation::Join | Operation::Union) {
        params.insert("format".to_owned(), Value::from(RESULT_FORMAT));
    }

    let data = match state.backend.invoke(operation, &params).await {
        Ok(data) => data,
        Err(e) => return Err(OperationFailure::new(params, e)),
    };

    let status = success_status(operation);
    let envelope = Envelope::new(status.as_u16(), params, data);
    match envelope.encode() {
        Ok(body) => {
            tracing::debug!(%operation, status = status.as_u16(), "operation succeeded");
            Ok((status, Json(body)).into_response())
        }
        Err(e) => Err(OperationFailure::new(envelope.params, e)),
    }
}

fn parse_request(body: Result<Bytes, BytesRejection>) -> Result<Value, GatewayError> {
    let bytes = body.map_err(|e| GatewayError::MalformedBody(e.body_text()))?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::MalformedBody(e.to_string()))
}
