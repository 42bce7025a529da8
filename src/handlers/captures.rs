//! Capture HTTP handlers.
//!
//! - `POST /api/v1/captures` - capture an authorization in full
//! - `GET /api/v1/captures/{id}` - look up a capture

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, ServiceError};
use crate::handlers::{ids, AppState};
use crate::models::Transaction;

#[derive(Debug, Deserialize)]
pub struct CreateCaptureRequest {
    /// External authorization id (`auth_<uuid>`).
    pub authorization_id: String,
    /// Amount in cents; must equal the authorized amount.
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub capture_id: String,
    pub authorization_id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub captured_at: DateTime<Utc>,
}

impl From<Transaction> for CaptureResponse {
    fn from(txn: Transaction) -> Self {
        Self {
            capture_id: ids::format_capture_id(txn.id),
            authorization_id: txn
                .reference_id
                .map(ids::format_authorization_id)
                .unwrap_or_default(),
            status: "captured".to_string(),
            amount: txn.amount_cents,
            currency: txn.currency,
            captured_at: txn.created_at,
        }
    }
}

/// Capture an authorized payment.
pub async fn create_capture(
    State(state): State<AppState>,
    Json(request): Json<CreateCaptureRequest>,
) -> Result<Json<CaptureResponse>, ServiceError> {
    let authorization_id = ids::parse_authorization_id(&request.authorization_id).ok_or_else(
        || ServiceError::new(ErrorCode::AuthorizationNotFound, "invalid authorization ID format"),
    )?;

    let txn = state.capturer.capture(authorization_id, request.amount).await?;

    Ok(Json(txn.into()))
}

/// Look up a capture by its external id.
pub async fn get_capture(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CaptureResponse>, ServiceError> {
    let capture_id = ids::parse_capture_id(&id).ok_or_else(not_found)?;

    let txn = state
        .capturer
        .get_capture(capture_id)
        .await
        .map_err(mask_as_not_found)?;

    Ok(Json(txn.into()))
}

fn not_found() -> ServiceError {
    ServiceError::new(ErrorCode::NotFound, "capture not found")
}

fn mask_as_not_found(err: ServiceError) -> ServiceError {
    match err.code {
        ErrorCode::InternalError => err,
        _ => not_found(),
    }
}
