// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StorageError;

/// Errors raised across the bridge core and its external boundaries.
///
/// Wallet and chain failures surface as `NotConnected`, `UserRejected` or
/// `NetworkError`; the confidentiality boundary adds `WrongNetwork` and
/// `ProtectionFailed`; `EncryptionFailed` and `Timeout` originate inside the
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("Wallet not connected")]
    NotConnected,

    #[error("Request rejected by the wallet owner")]
    UserRejected,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Wrong network: expected chain {expected}, wallet is on chain {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Data protection failed: {0}")]
    ProtectionFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Transaction {0} not found")]
    NotFound(String),

    #[error("Transaction {0} is already being processed")]
    AlreadyInFlight(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl BridgeError {
    /// Whether re-invoking the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeError::NetworkError(_) | BridgeError::Timeout(_))
    }
}

impl From<StorageError> for BridgeError {
    fn from(e: StorageError) -> Self {
        BridgeError::Storage(e.to_string())
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl From<BridgeError> for ApiError {
    fn from(e: BridgeError) -> Self {
        let status = match &e {
            BridgeError::Validation(_) => StatusCode::BAD_REQUEST,
            BridgeError::NotFound(_) => StatusCode::NOT_FOUND,
            BridgeError::NotConnected => StatusCode::UNAUTHORIZED,
            BridgeError::UserRejected
            | BridgeError::WrongNetwork { .. }
            | BridgeError::AlreadyInFlight(_)
            | BridgeError::InvalidTransition(_) => StatusCode::CONFLICT,
            BridgeError::NetworkError(_)
            | BridgeError::ProtectionFailed(_)
            | BridgeError::EncryptionFailed(_) => StatusCode::BAD_GATEWAY,
            BridgeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            BridgeError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let conflict = ApiError::conflict("busy");
        assert_eq!(conflict.status, StatusCode::CONFLICT);
    }

    #[test]
    fn bridge_errors_map_to_status_codes() {
        let cases = [
            (BridgeError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (BridgeError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (BridgeError::NotConnected, StatusCode::UNAUTHORIZED),
            (BridgeError::UserRejected, StatusCode::CONFLICT),
            (
                BridgeError::WrongNetwork {
                    expected: 134,
                    actual: 1,
                },
                StatusCode::CONFLICT,
            ),
            (BridgeError::NetworkError("rpc".into()), StatusCode::BAD_GATEWAY),
            (BridgeError::Timeout("stage".into()), StatusCode::GATEWAY_TIMEOUT),
            (BridgeError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn only_network_and_timeout_are_retryable() {
        assert!(BridgeError::NetworkError("down".into()).is_retryable());
        assert!(BridgeError::Timeout("slow".into()).is_retryable());
        assert!(!BridgeError::UserRejected.is_retryable());
        assert!(!BridgeError::NotConnected.is_retryable());
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }
}
