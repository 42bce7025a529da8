//! Authorization HTTP handlers.
//!
//! - `POST /api/v1/authorizations` - place a hold on a card
//! - `GET /api/v1/authorizations/{id}` - look up an authorization

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, ServiceError};
use crate::handlers::{ids, AppState};
use crate::models::Transaction;

#[derive(Debug, Deserialize)]
pub struct CreateAuthorizationRequest {
    pub card_number: String,
    pub cvv: String,
    /// Amount in cents.
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct AuthorizationResponse {
    pub authorization_id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for AuthorizationResponse {
    fn from(txn: Transaction) -> Self {
        Self {
            authorization_id: ids::format_authorization_id(txn.id),
            status: "approved".to_string(),
            amount: txn.amount_cents,
            currency: txn.currency,
            expires_at: txn.expires_at.unwrap_or_default(),
            created_at: txn.created_at,
        }
    }
}

/// Place an authorization hold.
pub async fn create_authorization(
    State(state): State<AppState>,
    Json(request): Json<CreateAuthorizationRequest>,
) -> Result<Json<AuthorizationResponse>, ServiceError> {
    let txn = state
        .authorizer
        .authorize(&request.card_number, &request.cvv, request.amount)
        .await?;

    Ok(Json(txn.into()))
}

/// Look up an authorization by its external id.
pub async fn get_authorization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AuthorizationResponse>, ServiceError> {
    let authorization_id =
        ids::parse_authorization_id(&id).ok_or_else(not_found)?;

    let txn = state
        .authorizer
        .get_authorization(authorization_id)
        .await
        .map_err(mask_as_not_found)?;

    Ok(Json(txn.into()))
}

fn not_found() -> ServiceError {
    ServiceError::new(ErrorCode::NotFound, "authorization not found")
}

fn mask_as_not_found(err: ServiceError) -> ServiceError {
    match err.code {
        ErrorCode::InternalError => err,
        _ => not_found(),
    }
}
