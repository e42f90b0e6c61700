use actix_web::{web, HttpRequest, HttpResponse};
use metrics::counter;
use primeadview_domain::model::{validate_amount_cents, PaymentMethod};
use primeadview_domain::storage::{LedgerStore, ProfileStore};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::{require_user, ApiError, MessageResponse};

#[derive(Debug, Deserialize, Serialize)]
pub struct WithdrawalRequest {
    pub amount_cents: i64,
    pub method: PaymentMethod,
}

/// Debits `total_earnings` and queues the payout as a pending ledger row.
/// The earnings guard lives in the storage transaction; this handler only
/// translates its verdict.
pub async fn request_withdrawal_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<WithdrawalRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&state, &req)?;
    validate_amount_cents(payload.amount_cents).inspect_err(|_| {
        counter!("api_withdrawal_requests_total", 1, "status" => "invalid_amount");
    })?;

    if state.storage().find_profile(&user).await?.is_none() {
        counter!("api_withdrawal_requests_total", 1, "status" => "profile_missing");
        return Err(ApiError::ProfileMissing);
    }

    match state
        .storage()
        .request_withdrawal(&user, payload.amount_cents, payload.method)
        .await?
    {
        Some(_) => {
            counter!("api_withdrawal_requests_total", 1, "status" => "success");
            Ok(HttpResponse::Ok().json(MessageResponse::new(
                "Withdrawal request submitted successfully!",
            )))
        }
        None => {
            counter!("api_withdrawal_requests_total", 1, "status" => "insufficient_earnings");
            Err(ApiError::InsufficientEarnings)
        }
    }
}
