use std::sync::atomic::{AtomicU64, Ordering};

use augur_core::{AbiError, EthereumValueError};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Node { code: i64, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("abi error: {0}")]
    Abi(#[from] AbiError),
    #[error("missing {0} address")]
    MissingAddress(&'static str),
    #[error(transparent)]
    Value(#[from] EthereumValueError),
}

/// Something that answers Ethereum JSON-RPC requests.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

#[derive(Debug, Deserialize)]
struct NodeError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<NodeError>,
}

impl RpcResponse {
    fn into_result(self) -> Result<Value, RpcError> {
        match self.error {
            Some(NodeError { code, message }) => Err(RpcError::Node { code, message }),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// JSON-RPC over HTTP POST.
pub struct HttpTransport {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: &str) -> Self {
        Self { url: url.to_string(), http: reqwest::Client::new(), next_id: AtomicU64::new(1) }
    }
}

impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        let response: RpcResponse =
            self.http.post(&self.url).json(&body).send().await?.error_for_status()?.json().await?;
        debug!(method, id, "rpc response");
        response.into_result()
    }
}

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn hex_to_bytes(value: &Value) -> Result<Vec<u8>, RpcError> {
    let text = value.as_str().ok_or_else(|| RpcError::Malformed(format!("expected hex string, got {value}")))?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| RpcError::Malformed(format!("{text}: {e}")))
}
