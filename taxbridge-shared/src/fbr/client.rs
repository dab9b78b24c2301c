/// HTTP client for the FBR Digital Invoicing API
///
/// The client is deliberately fire-once: one POST, no retries, no
/// backoff. Every outcome maps to a `SubmissionResult` so callers never
/// see a raised error from the remote call itself; transport failures
/// are a flavor of failure, not an exception path.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::tenant::FbrEndpoint;

use super::payload::FbrInvoicePayload;

/// Outcome of one submission attempt
#[derive(Debug, Clone)]
pub enum SubmissionResult {
    /// The authority accepted the invoice
    Success {
        /// Authority-assigned invoice number
        invoice_number: String,

        /// QR payload to render on the printed invoice
        qr_payload: String,

        /// Raw response body, logged for audit
        raw: Value,
    },

    /// The authority declined, or the call never completed
    Failure {
        /// Human-readable reason, surfaced to the tenant
        reason: String,

        /// True when the failure was network/TLS level rather than a
        /// decision by the authority
        transport: bool,
    },
}

/// Abstraction over the tax authority endpoint.
///
/// Production uses `FbrClient`; tests substitute a canned client so the
/// submission workflow can be exercised without a live endpoint.
#[async_trait]
pub trait TaxAuthorityClient: Send + Sync {
    /// Posts one invoice payload. Never errors; see `SubmissionResult`.
    async fn submit(&self, endpoint: &FbrEndpoint, payload: &FbrInvoicePayload)
        -> SubmissionResult;
}

/// Real client backed by reqwest
pub struct FbrClient {
    http: reqwest::Client,
}

impl FbrClient {
    /// Builds the client.
    ///
    /// Certificate validation is disabled: the government sandbox
    /// endpoints serve self-signed certificates.
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(FbrClient { http })
    }
}

#[async_trait]
impl TaxAuthorityClient for FbrClient {
    async fn submit(
        &self,
        endpoint: &FbrEndpoint,
        payload: &FbrInvoicePayload,
    ) -> SubmissionResult {
        let response = self
            .http
            .post(&endpoint.api_url)
            .bearer_auth(&endpoint.bearer_token)
            .json(payload)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "FBR call failed at transport level");
                return SubmissionResult::Failure {
                    reason: err.to_string(),
                    transport: true,
                };
            }
        };

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, %status, "FBR response body was not JSON");
                return SubmissionResult::Failure {
                    reason: format!("Invalid response from FBR (HTTP {})", status.as_u16()),
                    transport: true,
                };
            }
        };

        debug!(%status, "FBR responded");

        if !status.is_success() {
            return SubmissionResult::Failure {
                reason: extract_error_reason(&body)
                    .unwrap_or_else(|| format!("FBR returned HTTP {}", status.as_u16())),
                transport: false,
            };
        }

        match (
            body.get("InvoiceNumber").and_then(Value::as_str),
            body.get("QRLink").and_then(Value::as_str),
        ) {
            (Some(invoice_number), Some(qr_payload)) => SubmissionResult::Success {
                invoice_number: invoice_number.to_string(),
                qr_payload: qr_payload.to_string(),
                raw: body.clone(),
            },
            _ => SubmissionResult::Failure {
                reason: extract_error_reason(&body)
                    .unwrap_or_else(|| "FBR response missing InvoiceNumber".to_string()),
                transport: false,
            },
        }
    }
}

/// Pulls a rejection message out of the authority's error body.
///
/// Observed shapes: `{"Errors":[{"Message":"..."}]}`, `{"message":"..."}`
/// and `{"Message":"..."}`.
fn extract_error_reason(body: &Value) -> Option<String> {
    if let Some(message) = body
        .get("Errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|e| e.get("Message"))
        .and_then(Value::as_str)
    {
        return Some(message.to_string());
    }

    body.get("message")
        .or_else(|| body.get("Message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_reason_from_errors_array() {
        let body = json!({"Errors": [{"Message": "Bad HS Code"}, {"Message": "other"}]});
        assert_eq!(extract_error_reason(&body).as_deref(), Some("Bad HS Code"));
    }

    #[test]
    fn test_extract_reason_from_message_fields() {
        assert_eq!(
            extract_error_reason(&json!({"message": "invalid token"})).as_deref(),
            Some("invalid token")
        );
        assert_eq!(
            extract_error_reason(&json!({"Message": "Invalid NTN"})).as_deref(),
            Some("Invalid NTN")
        );
    }

    #[test]
    fn test_extract_reason_none_for_unknown_shape() {
        assert_eq!(extract_error_reason(&json!({"status": "failed"})), None);
        assert_eq!(extract_error_reason(&json!({"Errors": []})), None);
    }
}
