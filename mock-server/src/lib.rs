use std::{collections::BTreeMap, collections::HashMap, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};

/// What `/echo` saw of a request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    /// Raw query string, exactly as received (not decoded).
    pub query: Option<String>,
    /// Header names lowercased.
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Deserialize)]
pub struct NewEntry {
    pub key: String,
    pub value: Value,
}

pub type Store = Arc<RwLock<HashMap<String, Value>>>;

pub fn app() -> Router {
    let store: Store = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/status/{code}", any(status))
        .route("/delay/{millis}", get(delay))
        .route("/bytes/{count}", get(bytes))
        .route("/kv", post(create_entry))
        .route("/kv/{key}", get(get_entry).put(put_entry))
        .with_state(store)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    tracing::debug!(%method, %uri, "echo");
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "invalid status").into_response(),
    }
}

async fn delay(Path(millis): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    "done"
}

/// `count` bytes of `x`, for exercising large bodies.
async fn bytes(Path(count): Path<usize>) -> Vec<u8> {
    vec![b'x'; count]
}

async fn create_entry(
    State(store): State<Store>,
    Json(input): Json<NewEntry>,
) -> (StatusCode, Json<Value>) {
    store.write().await.insert(input.key, input.value.clone());
    (StatusCode::CREATED, Json(input.value))
}

async fn get_entry(
    State(store): State<Store>,
    Path(key): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let entries = store.read().await;
    entries.get(&key).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn put_entry(
    State(store): State<Store>,
    Path(key): Path<String>,
    Json(value): Json<Value>,
) -> Json<Value> {
    store.write().await.insert(key, value.clone());
    Json(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "GET".to_string(),
            path: "/echo".to_string(),
            query: Some("a=1".to_string()),
            headers: BTreeMap::new(),
            body: String::new(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["query"], "a=1");
    }

    #[test]
    fn echo_without_query_roundtrips() {
        let echo = Echo {
            method: "PUT".to_string(),
            path: "/echo/x".to_string(),
            query: None,
            headers: BTreeMap::from([("content-type".to_string(), "text/plain".to_string())]),
            body: "hi".to_string(),
        };
        let back: Echo = serde_json::from_str(&serde_json::to_string(&echo).unwrap()).unwrap();
        assert_eq!(back, echo);
    }

    #[test]
    fn new_entry_requires_key() {
        let result: Result<NewEntry, _> = serde_json::from_str(r#"{"value":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn new_entry_accepts_any_value() {
        let input: NewEntry = serde_json::from_str(r#"{"key":"k","value":{"a":[1,2]}}"#).unwrap();
        assert_eq!(input.key, "k");
        assert_eq!(input.value["a"][1], 2);
    }
}
