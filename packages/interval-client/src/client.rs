use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use interval_core::{Invocation, Snapshot, TransactionId, TransactionState, TransactionSummary};

use crate::error::{preview, ClientError, Result};
use crate::events::SnapshotEvents;

/// Client for an interval server's RPC and event endpoints.
#[derive(Debug, Clone)]
pub struct IntervalClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeParams<'a> {
    action_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionParams {
    transaction_id: TransactionId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RespondParams<'a> {
    transaction_id: TransactionId,
    body: &'a Value,
}

#[derive(Deserialize)]
struct StateResponse {
    #[serde(flatten)]
    snapshot: Snapshot<TransactionState>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    details: Option<Value>,
}

impl IntervalClient {
    /// `base_url` is the server root, e.g. `http://localhost:3001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a transaction. Returns as soon as it is registered.
    pub async fn invoke(&self, action_name: &str) -> Result<Invocation> {
        self.call("invoke_transaction", &InvokeParams { action_name })
            .await
    }

    pub async fn get_state(&self, id: TransactionId) -> Result<Snapshot<TransactionState>> {
        let response: StateResponse = self
            .call(
                "get_transaction_state",
                &TransactionParams { transaction_id: id },
            )
            .await?;
        Ok(response.snapshot)
    }

    /// Submit a response to the pending request of transaction `id`.
    ///
    /// A body that fails validation comes back as
    /// [`ClientError::Api`] with code `validation_failure`; the request is
    /// still pending and can be answered again.
    pub async fn respond(&self, id: TransactionId, body: &Value) -> Result<()> {
        let _: Value = self
            .call(
                "respond_to_io_request",
                &RespondParams {
                    transaction_id: id,
                    body,
                },
            )
            .await?;
        Ok(())
    }

    pub async fn list_actions(&self) -> Result<Vec<String>> {
        self.call("list_available_actions", &json!({})).await
    }

    pub async fn list_transactions(&self) -> Result<Vec<TransactionSummary>> {
        self.call("list_transactions", &json!({})).await
    }

    /// Open the snapshot event stream of transaction `id`.
    ///
    /// The first item is the current snapshot. Fails up front with
    /// `transaction_not_found` for an unknown id.
    pub async fn events(&self, id: TransactionId) -> Result<SnapshotEvents> {
        let url = format!("{}/api/events/{}", self.base_url, id);
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        let resp = check_status(resp).await?;
        Ok(SnapshotEvents::new(resp.bytes_stream()))
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/api/{}", self.base_url, method);
        let resp = self.client.post(&url).json(params).send().await?;

        let resp = check_status(resp).await?;
        let body = resp.text().await?;
        decode(method, &body)
    }
}

fn decode<R: DeserializeOwned>(method: &str, body: &str) -> Result<R> {
    serde_json::from_str(body).map_err(|e| {
        ClientError::Decode(format!(
            "Failed to parse {} response: {} (body: {})",
            method,
            e,
            preview(body)
        ))
    })
}

/// Turn a non-2xx response into [`ClientError::Api`].
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => ClientError::Api {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope.error.message,
            details: envelope.error.details,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            code: "http_error".to_string(),
            message: body,
            details: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = IntervalClient::new("http://localhost:3001/");
        assert_eq!(client.base_url(), "http://localhost:3001");
    }

    #[test]
    fn test_state_response_shape() {
        let response: StateResponse = serde_json::from_value(json!({
            "transactionId": 2,
            "value": {"status": "running", "pendingIORequest": null},
            "version": 7
        }))
        .unwrap();

        assert_eq!(response.snapshot.version, 7);
        assert_eq!(response.snapshot.value, TransactionState::running());
    }

    #[test]
    fn test_decode_error_with_multibyte_body() {
        let body = format!("x{}", "é".repeat(150));
        let err = decode::<Vec<String>>("list_available_actions", &body).unwrap_err();

        match err {
            ClientError::Decode(message) => {
                assert!(message.contains("list_available_actions"));
                assert!(message.contains('é'));
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_envelope_shape() {
        let envelope: ErrorEnvelope = serde_json::from_value(json!({
            "error": {"code": "transaction_not_found", "message": "transaction 9 not found"}
        }))
        .unwrap();

        assert_eq!(envelope.error.code, "transaction_not_found");
        assert!(envelope.error.details.is_none());
    }
}
