//! Void HTTP handler.
//!
//! - `POST /api/v1/voids` - cancel an uncaptured authorization

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, ServiceError};
use crate::handlers::{ids, AppState};
use crate::models::Transaction;

#[derive(Debug, Deserialize)]
pub struct CreateVoidRequest {
    /// External authorization id (`auth_<uuid>`).
    pub authorization_id: String,
}

#[derive(Debug, Serialize)]
pub struct VoidResponse {
    pub void_id: String,
    pub authorization_id: String,
    pub status: String,
    pub voided_at: DateTime<Utc>,
}

impl From<Transaction> for VoidResponse {
    fn from(txn: Transaction) -> Self {
        Self {
            void_id: ids::format_void_id(txn.id),
            authorization_id: txn
                .reference_id
                .map(ids::format_authorization_id)
                .unwrap_or_default(),
            status: "voided".to_string(),
            voided_at: txn.created_at,
        }
    }
}

/// Cancel an authorization before capture.
pub async fn create_void(
    State(state): State<AppState>,
    Json(request): Json<CreateVoidRequest>,
) -> Result<Json<VoidResponse>, ServiceError> {
    let authorization_id = ids::parse_authorization_id(&request.authorization_id).ok_or_else(
        || ServiceError::new(ErrorCode::AuthorizationNotFound, "invalid authorization ID format"),
    )?;

    let txn = state.voider.void(authorization_id).await?;

    Ok(Json(txn.into()))
}
