//! Gateway response parsing.
//!
//! Transport-independent: every parser takes the HTTP status and raw body
//! bytes, so the same code path serves the client and the tests.
//!
//! Encrypted endpoints answer `200 {"payload": "<base64>"}`; the decrypted
//! payload is a JSON object whose field names the gateway emits in either
//! camelCase or snake_case. Errors come back unencrypted as
//! `{"message": "..."}` with a non-200 status.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec;
use crate::constants::STATUS_SUCCESS;
use crate::error::PesepayError;
use crate::payment::EncryptedBody;

/// Outcome of `initiate` and `make-payment`.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionResponse {
    Success(TransactionDetails),
    Failure { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDetails {
    pub reference_number: String,
    pub poll_url: Option<String>,
    pub redirect_url: Option<String>,
    /// The whole decrypted response object.
    pub raw: Map<String, Value>,
}

impl TransactionResponse {
    pub fn success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { message, .. } => Some(message),
        }
    }

    pub fn details(&self) -> Option<&TransactionDetails> {
        match self {
            Self::Success(details) => Some(details),
            Self::Failure { .. } => None,
        }
    }

    pub fn reference_number(&self) -> Option<&str> {
        self.details().map(|d| d.reference_number.as_str())
    }

    pub fn poll_url(&self) -> Option<&str> {
        self.details().and_then(|d| d.poll_url.as_deref())
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.details().and_then(|d| d.redirect_url.as_deref())
    }

    /// Convert a `Failure` into [`PesepayError::Gateway`] for `?`-style callers.
    pub fn into_result(self) -> Result<TransactionDetails, PesepayError> {
        match self {
            Self::Success(details) => Ok(details),
            Self::Failure { status, message } => Err(PesepayError::Gateway { status, message }),
        }
    }
}

/// Settlement state reported by `transactionStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    Success,
    Pending,
    Processing,
    Initiated,
    Failed,
    Cancelled,
    Declined,
    Error,
    Reversed,
    TimedOut,
    AuthorizationFailed,
    /// Any value this crate does not know, kept verbatim.
    Unknown(String),
}

impl TransactionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            STATUS_SUCCESS => Self::Success,
            "PENDING" => Self::Pending,
            "PROCESSING" => Self::Processing,
            "INITIATED" => Self::Initiated,
            "FAILED" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            "DECLINED" => Self::Declined,
            "ERROR" => Self::Error,
            "REVERSED" => Self::Reversed,
            "TIME_OUT" => Self::TimedOut,
            "AUTHORIZATION_FAILED" => Self::AuthorizationFailed,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Only `SUCCESS` counts as paid.
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Outcome of `check-payment` or a poll-URL request.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusResponse {
    Status(PaymentStatus),
    Failure { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentStatus {
    pub reference_number: String,
    pub poll_url: Option<String>,
    pub paid: bool,
    /// `None` when the gateway omitted `transactionStatus`.
    pub transaction_status: Option<TransactionStatus>,
    pub raw: Map<String, Value>,
}

impl StatusResponse {
    /// `true` when the gateway answered the status request, paid or not.
    pub fn success(&self) -> bool {
        matches!(self, Self::Status(_))
    }

    pub fn paid(&self) -> bool {
        matches!(self, Self::Status(s) if s.paid)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Status(_) => None,
            Self::Failure { message, .. } => Some(message),
        }
    }

    pub fn status(&self) -> Option<&PaymentStatus> {
        match self {
            Self::Status(status) => Some(status),
            Self::Failure { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<PaymentStatus, PesepayError> {
        match self {
            Self::Status(status) => Ok(status),
            Self::Failure { status, message } => Err(PesepayError::Gateway { status, message }),
        }
    }
}

/// One entry of the payment-methods-for-currency listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub minimum_amount: Option<f64>,
    #[serde(default)]
    pub maximum_amount: Option<f64>,
    #[serde(default)]
    pub redirect_required: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parse the response to `initiate` or `make-payment`.
pub fn parse_transaction_response(
    status: u16,
    body: &[u8],
    key: &[u8],
) -> Result<TransactionResponse, PesepayError> {
    if status != 200 {
        let message = error_message(body)?;
        tracing::warn!(status, %message, "gateway rejected transaction request");
        return Ok(TransactionResponse::Failure { status, message });
    }

    let raw = open_payload(body, key)?;
    Ok(TransactionResponse::Success(TransactionDetails {
        reference_number: required_str(&raw, "referenceNumber", "reference_number")?,
        poll_url: optional_str(&raw, "pollUrl", "poll_url"),
        redirect_url: optional_str(&raw, "redirectUrl", "redirect_url"),
        raw,
    }))
}

/// Parse the response to `check-payment` or a poll-URL request.
pub fn parse_status_response(
    status: u16,
    body: &[u8],
    key: &[u8],
) -> Result<StatusResponse, PesepayError> {
    if status != 200 {
        let message = error_message(body)?;
        tracing::warn!(status, %message, "gateway rejected status request");
        return Ok(StatusResponse::Failure { status, message });
    }

    let raw = open_payload(body, key)?;
    let reference_number = required_str(&raw, "referenceNumber", "reference_number")?;
    let poll_url = optional_str(&raw, "pollUrl", "poll_url");
    let status_str = optional_str(&raw, "transactionStatus", "transaction_status");
    let paid = status_str.as_deref() == Some(STATUS_SUCCESS);
    let transaction_status = status_str.as_deref().map(TransactionStatus::parse);

    Ok(StatusResponse::Status(PaymentStatus {
        reference_number,
        poll_url,
        paid,
        transaction_status,
        raw,
    }))
}

/// Parse the (unencrypted) payment-methods-for-currency listing.
pub fn parse_payment_methods(status: u16, body: &[u8]) -> Result<Vec<PaymentMethod>, PesepayError> {
    check_listing_status(status, body)?;

    serde_json::from_slice(body).map_err(|e| {
        PesepayError::Protocol(format!("payment methods response is not a JSON array of methods: {e}"))
    })
}

/// The `code` of the first method in the listing.
///
/// Only the first element is inspected; later entries may have any shape.
pub fn parse_payment_method_code(status: u16, body: &[u8]) -> Result<String, PesepayError> {
    check_listing_status(status, body)?;

    let methods: Vec<Value> = serde_json::from_slice(body).map_err(|e| {
        PesepayError::Protocol(format!("payment methods response is not a JSON array: {e}"))
    })?;
    let first = methods
        .first()
        .ok_or_else(|| PesepayError::Protocol("no payment methods returned for currency".into()))?;
    first
        .get("code")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PesepayError::Protocol("first payment method has no string `code`".into()))
}

fn check_listing_status(status: u16, body: &[u8]) -> Result<(), PesepayError> {
    if status == 200 {
        return Ok(());
    }
    let message = error_message(body)?;
    tracing::warn!(status, %message, "payment method lookup rejected");
    Err(PesepayError::Gateway { status, message })
}

/// Extract `message` from an error body. No fallback message is invented.
pub fn error_message(body: &[u8]) -> Result<String, PesepayError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| PesepayError::Protocol(format!("error response is not valid JSON: {e}")))?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PesepayError::Protocol("error response has no `message` field".into()))
}

fn open_payload(body: &[u8], key: &[u8]) -> Result<Map<String, Value>, PesepayError> {
    let envelope: EncryptedBody = serde_json::from_slice(body).map_err(|e| {
        PesepayError::Protocol(format!("response is not a {{\"payload\": ...}} object: {e}"))
    })?;
    match codec::decrypt_json::<Value>(&envelope.payload, key)? {
        Value::Object(map) => Ok(map),
        other => Err(PesepayError::Protocol(format!(
            "decrypted payload is not a JSON object: {other}"
        ))),
    }
}

fn optional_str(map: &Map<String, Value>, camel: &str, snake: &str) -> Option<String> {
    map.get(camel)
        .or_else(|| map.get(snake))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn required_str(map: &Map<String, Value>, camel: &str, snake: &str) -> Result<String, PesepayError> {
    optional_str(map, camel, snake)
        .ok_or_else(|| PesepayError::Protocol(format!("response payload has no `{camel}` field")))
}
