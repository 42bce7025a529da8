//! Refund HTTP handlers.
//!
//! - `POST /api/v1/refunds` - refund a capture in full
//! - `GET /api/v1/refunds/{id}` - look up a refund

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, ServiceError};
use crate::handlers::{ids, AppState};
use crate::models::Transaction;

#[derive(Debug, Deserialize)]
pub struct CreateRefundRequest {
    /// External capture id (`cap_<uuid>`).
    pub capture_id: String,
    /// Amount in cents; must equal the captured amount.
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct RefundResponse {
    pub refund_id: String,
    pub capture_id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub refunded_at: DateTime<Utc>,
}

impl From<Transaction> for RefundResponse {
    fn from(txn: Transaction) -> Self {
        Self {
            refund_id: ids::format_refund_id(txn.id),
            capture_id: txn
                .reference_id
                .map(ids::format_capture_id)
                .unwrap_or_default(),
            status: "refunded".to_string(),
            amount: txn.amount_cents,
            currency: txn.currency,
            refunded_at: txn.created_at,
        }
    }
}

/// Refund a captured payment.
pub async fn create_refund(
    State(state): State<AppState>,
    Json(request): Json<CreateRefundRequest>,
) -> Result<Json<RefundResponse>, ServiceError> {
    let capture_id = ids::parse_capture_id(&request.capture_id).ok_or_else(|| {
        ServiceError::new(ErrorCode::CaptureNotFound, "invalid capture ID format")
    })?;

    let txn = state.refunder.refund(capture_id, request.amount).await?;

    Ok(Json(txn.into()))
}

/// Look up a refund by its external id.
pub async fn get_refund(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RefundResponse>, ServiceError> {
    let refund_id = ids::parse_refund_id(&id).ok_or_else(not_found)?;

    let txn = state
        .refunder
        .get_refund(refund_id)
        .await
        .map_err(mask_as_not_found)?;

    Ok(Json(txn.into()))
}

fn not_found() -> ServiceError {
    ServiceError::new(ErrorCode::NotFound, "refund not found")
}

fn mask_as_not_found(err: ServiceError) -> ServiceError {
    match err.code {
        ErrorCode::InternalError => err,
        _ => not_found(),
    }
}
