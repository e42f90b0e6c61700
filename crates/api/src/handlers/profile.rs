use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use metrics::counter;
use primeadview_domain::model::{PaymentMethod, TransactionStatus, TransactionType};
use primeadview_domain::storage::{LedgerStore, ProfileStore};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::{require_user, ApiError, MessageResponse};

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub deposit_balance_cents: i64,
    pub total_earnings_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionBody {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount_cents: i64,
    pub method: Option<PaymentMethod>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub async fn profile_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&state, &req)?;
    let profile = state
        .storage()
        .find_profile(&user)
        .await?
        .ok_or(ApiError::ProfileMissing)?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        id: profile.id.into_inner(),
        full_name: profile.full_name,
        avatar_url: profile.avatar_url,
        deposit_balance_cents: profile.deposit_balance,
        total_earnings_cents: profile.total_earnings,
        created_at: profile.created_at,
    }))
}

pub async fn transactions_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&state, &req)?;
    let ledger = state.storage().transactions_for(&user).await?;
    let body: Vec<TransactionBody> = ledger
        .into_iter()
        .map(|tx| TransactionBody {
            id: tx.id,
            kind: tx.kind,
            amount_cents: tx.amount,
            method: tx.method,
            status: tx.status,
            created_at: tx.created_at,
            updated_at: tx.updated_at,
        })
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Deletes the caller's profile; views, activations and ledger rows go with
/// it via cascade. The identity record at the auth provider is theirs to
/// clean up.
pub async fn deactivate_account_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&state, &req)?;

    let deleted = state.storage().delete_profile(&user).await?;
    if deleted {
        counter!("api_deactivation_requests_total", 1, "status" => "success");
    } else {
        // Nothing to delete is still a success for the caller.
        counter!("api_deactivation_requests_total", 1, "status" => "already_absent");
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "Account deactivated and all data deleted successfully.",
    )))
}
