use actix_web::{web, HttpRequest, HttpResponse};
use metrics::counter;
use primeadview_domain::model::{validate_amount_cents, PaymentMethod};
use primeadview_domain::storage::{LedgerStore, ProfileStore};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::{require_user, ApiError, MessageResponse};

#[derive(Debug, Deserialize, Serialize)]
pub struct DepositRequest {
    pub amount_cents: i64,
    pub method: PaymentMethod,
}

/// Simulated deposit: the balance is credited directly and the ledger row is
/// written as completed. A real payment provider confirmation would have to
/// land before this handler runs.
pub async fn deposit_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<DepositRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&state, &req)?;
    validate_amount_cents(payload.amount_cents).inspect_err(|_| {
        counter!("api_deposit_requests_total", 1, "status" => "invalid_amount");
    })?;

    if state.storage().find_profile(&user).await?.is_none() {
        counter!("api_deposit_requests_total", 1, "status" => "profile_missing");
        return Err(ApiError::ProfileMissing);
    }

    state
        .storage()
        .record_deposit(&user, payload.amount_cents, payload.method)
        .await?;
    counter!("api_deposit_requests_total", 1, "status" => "success");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Deposit successful!")))
}
