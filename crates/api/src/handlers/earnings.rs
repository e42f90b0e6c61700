use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use metrics::counter;
use primeadview_domain::model::{start_of_utc_day, CreditOutcome, RewardClaim};
use primeadview_domain::storage::{CatalogStore, EarningStore};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::{require_user, ApiError, MessageResponse};

#[derive(Debug, Deserialize, Serialize)]
pub struct ClaimRequest {
    pub ad_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdViewBody {
    pub ad_id: String,
    pub earned_amount_cents: i64,
    pub viewed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EarningsTodayResponse {
    pub ads_viewed_today: u64,
    pub daily_ads_limit: i32,
    pub package_name: String,
    pub views: Vec<AdViewBody>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdBody {
    pub id: String,
    pub title: String,
    pub link: String,
    pub duration_seconds: i32,
    pub reward_amount_cents: i64,
}

/// The earn loop: active package, quota, reward lookup, then the atomic
/// credit. The quota check here is a fast reject; the storage transaction
/// recounts before committing, so two racing claims cannot both land on the
/// last slot.
pub async fn claim_reward_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<ClaimRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&state, &req)?;
    let now = Utc::now();

    let active = match state.storage().active_package_for(&user, now).await? {
        Some(active) => active,
        None => {
            counter!("api_claim_requests_total", 1, "status" => "no_active_package");
            return Err(ApiError::NoActivePackage);
        }
    };

    let boundary = start_of_utc_day(now);
    let viewed_today = state.storage().count_views_since(&user, boundary).await?;
    if viewed_today >= active.daily_ads_limit.max(0) as u64 {
        counter!("api_claim_requests_total", 1, "status" => "limit_reached");
        return Err(ApiError::DailyLimitReached);
    }

    let ad = state
        .storage()
        .find_ad(&payload.ad_id)
        .await?
        .ok_or_else(|| {
            counter!("api_claim_requests_total", 1, "status" => "ad_not_found");
            ApiError::AdNotFound
        })?;

    match state
        .storage()
        .credit_reward(RewardClaim {
            user_id: user,
            ad_id: ad.id,
            earned_amount: ad.reward_amount,
            daily_ads_limit: active.daily_ads_limit,
        })
        .await?
    {
        CreditOutcome::Credited(_) => {
            counter!("api_claim_requests_total", 1, "status" => "success");
            Ok(HttpResponse::Ok().json(MessageResponse::new("Reward claimed successfully!")))
        }
        CreditOutcome::LimitReached => {
            counter!("api_claim_requests_total", 1, "status" => "limit_reached");
            Err(ApiError::DailyLimitReached)
        }
    }
}

/// Today's progress against the quota, for the dashboard. Counts from the
/// UTC day boundary, same as the claim path.
pub async fn earnings_today_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&state, &req)?;
    let now = Utc::now();

    let active = state
        .storage()
        .active_package_for(&user, now)
        .await?
        .ok_or(ApiError::NoActivePackage)?;

    let boundary = start_of_utc_day(now);
    let views = state.storage().views_since(&user, boundary).await?;

    Ok(HttpResponse::Ok().json(EarningsTodayResponse {
        ads_viewed_today: views.len() as u64,
        daily_ads_limit: active.daily_ads_limit,
        package_name: active.package_name,
        views: views
            .into_iter()
            .map(|view| AdViewBody {
                ad_id: view.ad_id,
                earned_amount_cents: view.earned_amount,
                viewed_at: view.viewed_at,
            })
            .collect(),
    }))
}

pub async fn list_ads_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    require_user(&state, &req)?;
    let ads = state.storage().list_ads().await?;
    let body: Vec<AdBody> = ads
        .into_iter()
        .map(|ad| AdBody {
            id: ad.id,
            title: ad.title,
            link: ad.link,
            duration_seconds: ad.duration_seconds,
            reward_amount_cents: ad.reward_amount,
        })
        .collect();
    Ok(HttpResponse::Ok().json(body))
}
