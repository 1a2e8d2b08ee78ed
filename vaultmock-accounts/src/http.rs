//! HTTP adapter mounting the accounts backend under `/v1/<mount>`

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use vaultmock_core::{BackendError, ErrorCode, RequestId};

use crate::backend::{self, Backend, Operation};
use crate::schema::RequestData;
use crate::storage::StorageGateway;

const TOKEN_HEADER: &str = "x-vault-token";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared state for one mounted backend
pub struct MountState {
    pub backend: Backend,
    pub storage: Arc<dyn StorageGateway>,
    /// Mount point with trailing slash, e.g. `mock/`
    pub mount_point: String,
}

impl MountState {
    pub fn new(backend: Backend, storage: Arc<dyn StorageGateway>, mount_point: &str) -> Self {
        let trimmed = mount_point.trim_matches('/');
        Self {
            backend,
            storage,
            mount_point: format!("{trimmed}/"),
        }
    }
}

/// Router serving the backend under `/v1/<mount>/...`
pub fn mount_router(state: Arc<MountState>) -> Router {
    let route = format!("/v1/{}*path", state.mount_point);
    Router::new()
        .route(&route, any(handle_request))
        .with_state(state)
}

#[derive(Serialize)]
struct SuccessBody<'a> {
    request_id: &'a str,
    data: Option<Map<String, Value>>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    request_id: &'a str,
    errors: Vec<String>,
}

/// Translate an HTTP request into a backend request and back
pub async fn handle_request(
    State(state): State<Arc<MountState>>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = RequestId::from_header(header_str(&headers, REQUEST_ID_HEADER));

    let Some(operation) = operation_for(&method, &query) else {
        warn!(method = %method, "Unsupported HTTP method");
        let err = BackendError::new(
            ErrorCode::UnsupportedOperation,
            format!("unsupported method '{method}'"),
        )
        .with_request_id(request_id.as_str());
        return error_response(&err);
    };

    let data = match request_data(operation, query, &body) {
        Ok(data) => data,
        Err(e) => {
            return error_response(
                &e.with_context(operation, path.as_str())
                    .with_request_id(request_id.as_str()),
            )
        }
    };

    let req = backend::Request::new(
        operation,
        path,
        header_str(&headers, TOKEN_HEADER).unwrap_or_default(),
        state.storage.clone(),
    )
    .with_mount_point(state.mount_point.as_str())
    .with_data(data)
    .with_request_id(request_id.clone());

    match state.backend.handle_request(req).await {
        Ok(resp) if resp.is_no_value() => {
            let message = resp.get_str("error").unwrap_or("No value").to_string();
            json_response(
                StatusCode::NOT_FOUND,
                &ErrorBody {
                    request_id: request_id.as_str(),
                    errors: vec![message],
                },
            )
        }
        Ok(resp) if resp.data.is_none() => StatusCode::NO_CONTENT.into_response(),
        Ok(resp) => json_response(
            StatusCode::OK,
            &SuccessBody {
                request_id: request_id.as_str(),
                data: resp.data,
            },
        ),
        Err(e) => {
            warn!(code = %e.code, error = %e.describe(), "Accounts request failed");
            error_response(&e)
        }
    }
}

fn operation_for(method: &Method, query: &HashMap<String, String>) -> Option<Operation> {
    let list_requested = query.get("list").is_some_and(|v| v == "true");
    match *method {
        Method::GET if list_requested => Some(Operation::List),
        Method::GET => Some(Operation::Read),
        Method::POST | Method::PUT => Some(Operation::Update),
        Method::DELETE => Some(Operation::Delete),
        _ if method.as_str() == "LIST" => Some(Operation::List),
        _ => None,
    }
}

/// Fields come from the JSON body on writes and from the query string otherwise
fn request_data(
    operation: Operation,
    query: HashMap<String, String>,
    body: &Bytes,
) -> Result<RequestData, BackendError> {
    if operation != Operation::Update {
        return Ok(query
            .into_iter()
            .filter(|(k, _)| k != "list")
            .map(|(k, v)| (k, Value::String(v)))
            .collect());
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RequestData::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(BackendError::invalid_argument("request body must be a JSON object")),
        Err(e) => Err(BackendError::invalid_argument(format!("failed to parse JSON input: {e}"))),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_string(body) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

fn error_response(err: &BackendError) -> Response {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], err.to_json()).into_response()
}
