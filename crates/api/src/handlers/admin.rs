//! Provisioning and catalog management. These handlers are only mounted on
//! the internal listener; the public surface never exposes them.

use actix_web::{web, HttpResponse};
use metrics::counter;
use primeadview_domain::model::{
    validate_amount_cents, NewAd, NewPackage, NewProfile, UserId,
};
use primeadview_domain::storage::{CatalogStore, ProfileStore};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::{ApiError, MessageResponse};

#[derive(Debug, Deserialize, Serialize)]
pub struct ProvisionProfileRequest {
    pub user_id: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateAdRequest {
    pub title: String,
    pub link: String,
    pub duration_seconds: i32,
    pub reward_amount_cents: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreatePackageRequest {
    pub name: String,
    pub price_cents: i64,
    pub duration_days: i32,
    pub daily_ads_limit: i32,
    pub roi_basis_points: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedBody {
    pub id: String,
    pub message: String,
}

/// Signup hook for the auth provider: creates the profile row backing a new
/// identity. Idempotent, so webhook retries are harmless.
pub async fn provision_profile_handler(
    state: web::Data<AppState>,
    payload: web::Json<ProvisionProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = UserId::parse(&payload.user_id)?;

    state
        .storage()
        .insert_profile(NewProfile {
            id: user,
            full_name: payload.full_name.clone(),
        })
        .await?;
    counter!("api_provision_requests_total", 1, "status" => "success");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Profile provisioned.")))
}

pub async fn create_ad_handler(
    state: web::Data<AppState>,
    payload: web::Json<CreateAdRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_amount_cents(payload.reward_amount_cents)?;

    let ad = state
        .storage()
        .insert_ad(NewAd {
            title: payload.title.clone(),
            link: payload.link.clone(),
            duration_seconds: payload.duration_seconds,
            reward_amount: payload.reward_amount_cents,
        })
        .await?;

    Ok(HttpResponse::Ok().json(CreatedBody {
        id: ad.id,
        message: "Ad created.".into(),
    }))
}

pub async fn create_package_handler(
    state: web::Data<AppState>,
    payload: web::Json<CreatePackageRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_amount_cents(payload.price_cents)?;

    let package = state
        .storage()
        .insert_package(NewPackage {
            name: payload.name.clone(),
            price: payload.price_cents,
            duration_days: payload.duration_days,
            daily_ads_limit: payload.daily_ads_limit,
            roi_basis_points: payload.roi_basis_points,
        })
        .await?;

    Ok(HttpResponse::Ok().json(CreatedBody {
        id: package.id,
        message: "Package created.".into(),
    }))
}
