//! Integration test: the response envelope contract of every data endpoint.
//!
//! Drives the full router (CORS, tracing, header layers) against in-process
//! backends; no network access is needed.

use std::sync::{Arc, Mutex};

use apollo_backend::{BackendError, TableBackend};
use apollo_core::{ApiInfo, Datum, Params};
use apollo_gateway::routes::{create_router, AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde_json::{json, Value};
use tower::ServiceExt;

const DATA_ROUTES: [&str; 4] = ["/get-table", "/join", "/union", "/create-table"];

/// Answers every operation with a fixed result and remembers the last params.
struct RecordingBackend {
    result: Datum,
    last_params: Mutex<Option<Params>>,
}

impl RecordingBackend {
    fn new(result: Datum) -> Self {
        Self { result, last_params: Mutex::new(None) }
    }

    fn record(&self, params: &Params) -> Result<Datum, BackendError> {
        match self.last_params.lock() {
            Ok(mut slot) => *slot = Some(params.clone()),
            Err(e) => panic!("params lock poisoned: {e}"),
        }
        Ok(self.result.clone())
    }

    fn last_params(&self) -> Params {
        match self.last_params.lock() {
            Ok(slot) => slot.clone().unwrap_or_else(|| panic!("backend was never called")),
            Err(e) => panic!("params lock poisoned: {e}"),
        }
    }
}

#[async_trait]
impl TableBackend for RecordingBackend {
    async fn get_table(&self, params: &Params) -> Result<Datum, BackendError> {
        self.record(params)
    }

    async fn join(&self, params: &Params) -> Result<Datum, BackendError> {
        self.record(params)
    }

    async fn union(&self, params: &Params) -> Result<Datum, BackendError> {
        self.record(params)
    }

    async fn create_table(&self, params: &Params) -> Result<Datum, BackendError> {
        self.record(params)
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Fails every operation.
struct FailingBackend;

#[async_trait]
impl TableBackend for FailingBackend {
    async fn get_table(&self, _params: &Params) -> Result<Datum, BackendError> {
        Err(BackendError::Rejected("keyspace 'ks' does not exist".to_owned()))
    }

    async fn join(&self, _params: &Params) -> Result<Datum, BackendError> {
        Err(BackendError::Rejected("join keys missing".to_owned()))
    }

    async fn union(&self, _params: &Params) -> Result<Datum, BackendError> {
        Err(BackendError::Rejected("column sets differ".to_owned()))
    }

    async fn create_table(&self, _params: &Params) -> Result<Datum, BackendError> {
        Err(BackendError::Rejected("table already exists".to_owned()))
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Panics inside every operation.
struct PanickingBackend;

#[async_trait]
impl TableBackend for PanickingBackend {
    async fn get_table(&self, _params: &Params) -> Result<Datum, BackendError> {
        panic!("partition map exhausted")
    }

    async fn join(&self, _params: &Params) -> Result<Datum, BackendError> {
        panic!("partition map exhausted")
    }

    async fn union(&self, _params: &Params) -> Result<Datum, BackendError> {
        panic!("partition map exhausted")
    }

    async fn create_table(&self, _params: &Params) -> Result<Datum, BackendError> {
        panic!("partition map exhausted")
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

fn router_with(backend: Arc<dyn TableBackend>) -> Router {
    create_router(AppState::new(backend, ApiInfo::default()))
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn post(app: Router, uri: &str, body: &str) -> Reply {
    let req = match Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "https://dashboard.example")
        .body(Body::from(body.to_owned()))
    {
        Ok(r) => r,
        Err(e) => panic!("failed to build request: {e}"),
    };
    let resp = match app.oneshot(req).await {
        Ok(r) => r,
        Err(e) => panic!("handler error: {e}"),
    };
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = match axum::body::to_bytes(resp.into_body(), 256 * 1024).await {
        Ok(b) => b,
        Err(e) => panic!("failed to read body: {e}"),
    };
    let body = match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(e) => panic!("{uri}: response is not JSON ({e}): {}", String::from_utf8_lossy(&bytes)),
    };
    Reply { status, headers, body }
}

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn sample_rows() -> Datum {
    let day = NaiveDate::from_ymd_opt(2018, 5, 17).unwrap_or_default();
    let noon = NaiveTime::from_hms_opt(12, 30, 0).unwrap_or_default();
    Datum::List(vec![Datum::map([
        ("id", Datum::UInt(7)),
        ("opened", Datum::Date(day)),
        ("updated", Datum::DateTime(day.and_time(noon))),
        ("session", Datum::Duration(TimeDelta::minutes(90) + TimeDelta::seconds(5))),
        ("ratio", Datum::Float(0.5)),
    ])])
}

#[tokio::test]
async fn successful_operations_carry_status_success_and_data() {
    for uri in DATA_ROUTES {
        let app = router_with(Arc::new(RecordingBackend::new(sample_rows())));
        let reply = post(app, uri, r#"{"keyspace": "examples", "tablename": "people"}"#).await;

        assert!(reply.status.is_success(), "{uri}: got {}", reply.status);
        assert_eq!(reply.body["status"], reply.status.as_u16(), "{uri}: body status mirrors HTTP");
        assert_eq!(reply.body["success"], true, "{uri}");
        assert!(reply.body.get("data").is_some(), "{uri}: success implies data");
        assert!(reply.body.get("error_message").is_none(), "{uri}: no error on success");
        assert_eq!(
            header_str(&reply.headers, header::CONTENT_TYPE),
            Some("application/json"),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn create_table_answers_201_and_echoes_params() {
    let app = router_with(Arc::new(RecordingBackend::new(Datum::Bool(true))));
    let body = json!({
        "keyspace": "examples",
        "tablename": "people",
        "columns": [{"name": "id", "type": "int", "primary_key": true}],
    });
    let reply = post(app, "/create-table", &body.to_string()).await;

    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(
        reply.body,
        json!({
            "keyspace": "examples",
            "tablename": "people",
            "columns": [{"name": "id", "type": "int", "primary_key": true}],
            "data": true,
            "success": true,
            "status": 201,
        })
    );
}

#[tokio::test]
async fn temporal_values_are_encoded_as_iso_strings() {
    let app = router_with(Arc::new(RecordingBackend::new(sample_rows())));
    let reply = post(app, "/get-table", r#"{"keyspace": "examples", "tablename": "people"}"#).await;

    assert_eq!(reply.status, StatusCode::OK);
    let row = &reply.body["data"][0];
    assert_eq!(row["opened"], "2018-05-17");
    assert_eq!(row["updated"], "2018-05-17T12:30:00");
    assert_eq!(row["session"], "01:30:05");
    assert_eq!(row["id"], 7);
    assert_eq!(row["ratio"], 0.5);
}

#[tokio::test]
async fn join_and_union_pass_dict_format_to_backend() {
    for uri in ["/join", "/union"] {
        let backend = Arc::new(RecordingBackend::new(Datum::List(Vec::new())));
        let app = router_with(backend.clone());
        let reply = post(app, uri, r#"{"on": ["id"], "tables": []}"#).await;

        assert_eq!(reply.status, StatusCode::OK, "{uri}");
        assert_eq!(reply.body["format"], "dict", "{uri}: format echoed in envelope");
        assert_eq!(backend.last_params()["format"], "dict", "{uri}: format passed to backend");
    }
}

#[tokio::test]
async fn get_table_does_not_add_format() {
    let backend = Arc::new(RecordingBackend::new(Datum::Null));
    let app = router_with(backend.clone());
    let reply = post(app, "/get-table", "{}").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.get("format").is_none());
    let params = backend.last_params();
    assert_eq!(params["keyspace"], Value::Null, "missing fields reach the backend as null");
}

#[tokio::test]
async fn backend_failures_become_500_envelopes() {
    for uri in DATA_ROUTES {
        let app = router_with(Arc::new(FailingBackend));
        let reply = post(app, uri, r#"{"keyspace": "ks", "tablename": "t"}"#).await;

        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(reply.body["status"], 500, "{uri}");
        assert!(reply.body["error_message"].is_string(), "{uri}: error_message is a string");
        assert!(reply.body.get("data").is_none(), "{uri}: no data on failure");
        assert!(reply.body.get("success").is_none(), "{uri}: no success on failure");
        assert_eq!(reply.body["keyspace"], "ks", "{uri}: unpacked params are kept");
    }
}

#[tokio::test]
async fn malformed_and_non_object_bodies_share_the_error_shape() {
    let cases = [("/join", "{not json"), ("/union", "[1, 2, 3]"), ("/get-table", ""), ("/create-table", "\"text\"")];
    for (uri, body) in cases {
        let app = router_with(Arc::new(RecordingBackend::new(Datum::Null)));
        let reply = post(app, uri, body).await;

        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR, "{uri} {body:?}");
        assert_eq!(reply.body["status"], 500);
        assert!(reply.body["error_message"].is_string());
        assert!(reply.body.get("data").is_none());
        assert!(reply.body.get("keyspace").is_none(), "nothing was unpacked");
    }
}

#[tokio::test]
async fn unencodable_result_becomes_500_envelope() {
    let app = router_with(Arc::new(RecordingBackend::new(Datum::List(vec![Datum::Float(f64::NAN)]))));
    let reply = post(app, "/get-table", r#"{"tablename": "t"}"#).await;

    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(reply.body.get("data").is_none());
    assert_eq!(reply.body["tablename"], "t");
    let message = reply.body["error_message"].as_str().unwrap_or_default();
    assert!(message.contains("not finite"), "unexpected message: {message}");
}

#[tokio::test]
async fn every_data_response_names_its_route_in_location() {
    for uri in DATA_ROUTES {
        let ok = post(router_with(Arc::new(RecordingBackend::new(Datum::Null))), uri, "{}").await;
        assert_eq!(header_str(&ok.headers, header::LOCATION), Some(uri), "{uri} success");

        let failed = post(router_with(Arc::new(FailingBackend)), uri, "{}").await;
        assert_eq!(header_str(&failed.headers, header::LOCATION), Some(uri), "{uri} failure");
    }
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let reply = post(router_with(Arc::new(FailingBackend)), "/join", "{}").await;
    assert_eq!(header_str(&reply.headers, header::ACCESS_CONTROL_ALLOW_ORIGIN), Some("*"));
}

#[tokio::test]
async fn backend_panic_becomes_500_envelope() {
    for uri in DATA_ROUTES {
        let reply = post(router_with(Arc::new(PanickingBackend)), uri, r#"{"keyspace": "ks"}"#).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(reply.body["status"], 500, "{uri}");
        assert_eq!(reply.body["error_message"], "partition map exhausted", "{uri}");
        assert!(reply.body.get("data").is_none(), "{uri}: panic envelope must not carry data");
        assert_eq!(header_str(&reply.headers, header::LOCATION), Some(uri));
        assert_eq!(
            header_str(&reply.headers, header::CONTENT_TYPE),
            Some("application/json"),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn server_survives_a_panicking_request() {
    let app = router_with(Arc::new(PanickingBackend));
    let first = post(app.clone(), "/join", "{}").await;
    assert_eq!(first.status, StatusCode::INTERNAL_SERVER_ERROR);
    let second = post(app, "/union", "{}").await;
    assert_eq!(second.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(second.body["error_message"], "partition map exhausted");
}
