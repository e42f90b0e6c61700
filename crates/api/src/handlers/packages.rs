use actix_web::{web, HttpRequest, HttpResponse};
use metrics::counter;
use primeadview_domain::storage::{CatalogStore, LedgerStore, ProfileStore};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::{require_user, ApiError, MessageResponse};

#[derive(Debug, Deserialize, Serialize)]
pub struct ActivateRequest {
    pub package_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PackageBody {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub duration_days: i32,
    pub daily_ads_limit: i32,
    pub roi_basis_points: i32,
}

/// Debits the package price from the deposit balance and opens the earning
/// window. Debit, activation row and ledger row commit as one transaction.
pub async fn activate_package_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<ActivateRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&state, &req)?;

    let package = state
        .storage()
        .find_package(&payload.package_id)
        .await?
        .ok_or_else(|| {
            counter!("api_activation_requests_total", 1, "status" => "package_not_found");
            ApiError::PackageNotFound
        })?;

    if state.storage().find_profile(&user).await?.is_none() {
        counter!("api_activation_requests_total", 1, "status" => "profile_missing");
        return Err(ApiError::ProfileMissing);
    }

    match state.storage().activate_package(&user, &package).await? {
        Some(_) => {
            counter!("api_activation_requests_total", 1, "status" => "success");
            Ok(HttpResponse::Ok().json(MessageResponse::new("Package activated successfully!")))
        }
        None => {
            counter!("api_activation_requests_total", 1, "status" => "insufficient_balance");
            Err(ApiError::InsufficientBalance)
        }
    }
}

pub async fn list_packages_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    require_user(&state, &req)?;
    let packages = state.storage().list_packages().await?;
    let body: Vec<PackageBody> = packages.into_iter().map(package_body).collect();
    Ok(HttpResponse::Ok().json(body))
}

pub(crate) fn package_body(package: primeadview_domain::model::PackageRecord) -> PackageBody {
    PackageBody {
        id: package.id,
        name: package.name,
        price_cents: package.price,
        duration_days: package.duration_days,
        daily_ads_limit: package.daily_ads_limit,
        roi_basis_points: package.roi_basis_points,
    }
}
