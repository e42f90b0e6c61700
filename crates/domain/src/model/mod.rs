//! Data structures shared between the HTTP surface and the storage layer.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted length for externally supplied user identifiers.
pub const USER_ID_MAX_LENGTH: usize = 64;

/// Errors emitted when user identifiers from bearer credentials fail
/// validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserIdError {
    #[error("user id must not be empty")]
    Empty,
    #[error("user id must be at most {USER_ID_MAX_LENGTH} characters")]
    TooLong,
    #[error("user id contains non-printable characters")]
    NonPrintable,
}

/// Opaque identity of an authenticated caller, as minted by the hosted auth
/// provider. Validated for shape only; the provider owns the namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn parse(value: &str) -> Result<Self, UserIdError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(UserIdError::Empty);
        }
        if trimmed.len() > USER_ID_MAX_LENGTH {
            return Err(UserIdError::TooLong);
        }
        if !trimmed.chars().all(|c| c.is_ascii_graphic()) {
            return Err(UserIdError::NonPrintable);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Returns midnight (00:00:00) of the UTC calendar day containing `now`.
/// The daily ad quota is measured from this boundary; local-day semantics
/// are intentionally not supported.
pub fn start_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Errors emitted when a caller-supplied monetary amount is unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount must be a positive number of cents")]
    NotPositive,
}

/// Validates a caller-supplied amount in integer cents. All monetary values
/// in the system are integer cents; fractional currency never appears.
pub fn validate_amount_cents(amount: i64) -> Result<(), AmountError> {
    if amount <= 0 {
        return Err(AmountError::NotPositive);
    }
    Ok(())
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    Jazzcash,
    Easypaisa,
    Card,
}

/// One row per user; balances are integer cents and never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub id: UserId,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub deposit_balance: i64,
    pub total_earnings: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub id: UserId,
    pub full_name: Option<String>,
}

/// Catalog entry for a watchable ad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdRecord {
    pub id: String,
    pub title: String,
    pub link: String,
    pub duration_seconds: i32,
    pub reward_amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAd {
    pub title: String,
    pub link: String,
    pub duration_seconds: i32,
    pub reward_amount: i64,
}

/// Catalog entry for an earning tier. `roi_basis_points` keeps the
/// advertised return as an integer (250 basis points = 2.5%).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub duration_days: i32,
    pub daily_ads_limit: i32,
    pub roi_basis_points: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPackage {
    pub name: String,
    pub price: i64,
    pub duration_days: i32,
    pub daily_ads_limit: i32,
    pub roi_basis_points: i32,
}

/// Immutable claim-log row. `earned_amount` snapshots the ad's reward at
/// claim time so later catalog edits never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdViewRecord {
    pub id: i64,
    pub user_id: UserId,
    pub ad_id: String,
    pub earned_amount: i64,
    pub viewed_at: DateTime<Utc>,
}

/// An activation of a package for a user. Active at time T iff
/// `activated_at <= T <= expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPackageRecord {
    pub id: i64,
    pub user_id: UserId,
    pub package_id: String,
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// The user-package row currently governing a user's quota, joined with the
/// limit from its package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePackage {
    pub user_package_id: i64,
    pub package_id: String,
    pub package_name: String,
    pub daily_ads_limit: i32,
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub id: i64,
    pub user_id: UserId,
    pub kind: TransactionType,
    pub amount: i64,
    pub method: Option<PaymentMethod>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Everything the atomic crediting step needs. `daily_ads_limit` rides along
/// so the limit can be re-checked inside the same transaction that inserts
/// the view row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardClaim {
    pub user_id: UserId,
    pub ad_id: String,
    pub earned_amount: i64,
    pub daily_ads_limit: i32,
}

/// Result of the atomic crediting step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreditOutcome {
    /// Earnings were incremented and the view row committed together.
    Credited(AdViewRecord),
    /// The in-transaction recount found the quota already exhausted; no row
    /// was written.
    LimitReached,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn user_id_accepts_uuid_shaped_input() {
        let id = UserId::parse("5f7c9a3e-4b2d-41a8-9c51-8d2f06c1a9b7").unwrap();
        assert_eq!(id.as_str(), "5f7c9a3e-4b2d-41a8-9c51-8d2f06c1a9b7");
    }

    #[test]
    fn user_id_trims_surrounding_whitespace() {
        let id = UserId::parse("  user-42  ").unwrap();
        assert_eq!(id.as_str(), "user-42");
    }

    #[test]
    fn user_id_rejects_invalid_inputs() {
        assert_eq!(UserId::parse(""), Err(UserIdError::Empty));
        assert_eq!(UserId::parse("   "), Err(UserIdError::Empty));
        assert_eq!(
            UserId::parse(&"x".repeat(USER_ID_MAX_LENGTH + 1)),
            Err(UserIdError::TooLong)
        );
        assert_eq!(UserId::parse("user\u{7}id"), Err(UserIdError::NonPrintable));
    }

    #[test]
    fn utc_day_boundary_is_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 23, 59, 58).unwrap();
        let boundary = start_of_utc_day(now);
        assert_eq!(boundary, Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn utc_day_boundary_is_idempotent_at_midnight() {
        let midnight = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        assert_eq!(start_of_utc_day(midnight), midnight);
    }

    #[test]
    fn amount_validation_requires_positive_cents() {
        assert_eq!(validate_amount_cents(0), Err(AmountError::NotPositive));
        assert_eq!(validate_amount_cents(-250), Err(AmountError::NotPositive));
        assert!(validate_amount_cents(1).is_ok());
    }

    #[test]
    fn wire_enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Jazzcash).unwrap(),
            "\"jazzcash\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionType::Withdrawal).unwrap(),
            "\"withdrawal\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(PaymentMethod::Easypaisa.as_ref(), "easypaisa");
    }

    #[test]
    fn wire_enums_deserialize_snake_case() {
        let method: PaymentMethod = serde_json::from_str("\"card\"").unwrap();
        assert_eq!(method, PaymentMethod::Card);
        assert!(serde_json::from_str::<PaymentMethod>("\"paypal\"").is_err());
    }
}
