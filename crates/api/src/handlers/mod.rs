pub mod admin;
pub mod deposit;
pub mod earnings;
pub mod metrics;
pub mod packages;
pub mod profile;
pub mod withdrawal;

pub use admin::{create_ad_handler, create_package_handler, provision_profile_handler};
pub use deposit::deposit_handler;
pub use earnings::{claim_reward_handler, earnings_today_handler, list_ads_handler};
pub use metrics::metrics_handler;
pub use packages::{activate_package_handler, list_packages_handler};
pub use profile::{deactivate_account_handler, profile_handler, transactions_handler};
pub use withdrawal::request_withdrawal_handler;

use actix_web::{http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use ::metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use primeadview_domain::auth::AuthError;
use primeadview_domain::model::{AmountError, UserId, UserIdError};
use primeadview_domain::storage::StorageError;

use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("user not authenticated")]
    Unauthenticated(#[from] AuthError),
    #[error("no active package found")]
    NoActivePackage,
    #[error("daily ad limit reached")]
    DailyLimitReached,
    #[error("insufficient deposit balance")]
    InsufficientBalance,
    #[error("insufficient earnings for withdrawal")]
    InsufficientEarnings,
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
    #[error("invalid user id: {0}")]
    InvalidUserId(#[from] UserIdError),
    // Missing catalog/profile rows map to the generic 500 bucket, not 404.
    #[error("ad not found")]
    AdNotFound,
    #[error("package not found")]
    PackageNotFound,
    #[error("profile not found")]
    ProfileMissing,
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::NoActivePackage => StatusCode::FORBIDDEN,
            ApiError::DailyLimitReached => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InsufficientBalance => StatusCode::BAD_REQUEST,
            ApiError::InsufficientEarnings => StatusCode::BAD_REQUEST,
            ApiError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidUserId(_) => StatusCode::BAD_REQUEST,
            ApiError::AdNotFound => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::PackageNotFound => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ProfileMissing => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body returned by every mutating endpoint on success.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Resolves the caller identity from the bearer credential on the request.
/// Runs once per request; handlers receive the identity explicitly instead
/// of reading it from shared session state.
pub(crate) fn require_user(state: &AppState, req: &HttpRequest) -> Result<UserId, ApiError> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    state.verifier().verify_bearer(header).map_err(|err| {
        counter!("api_auth_failures_total", 1);
        ApiError::Unauthenticated(err)
    })
}
