use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{
    ActivePackage, AdRecord, AdViewRecord, CreditOutcome, NewAd, NewPackage, NewProfile,
    PackageRecord, PaymentMethod, ProfileRecord, RewardClaim, TransactionRecord, UserId,
    UserPackageRecord,
};

/// Common result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
}

impl StorageError {
    pub fn from_source(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Provisions the profile row for a newly signed-up user. Idempotent:
    /// re-provisioning an existing id returns the existing row untouched.
    async fn insert_profile(&self, profile: NewProfile) -> StorageResult<ProfileRecord>;
    async fn find_profile(&self, user: &UserId) -> StorageResult<Option<ProfileRecord>>;
    /// Deletes the profile; every owned row (views, activations, ledger
    /// entries) goes with it via foreign-key cascade. Returns `false` when
    /// no such profile existed.
    async fn delete_profile(&self, user: &UserId) -> StorageResult<bool>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_ad(&self, ad: NewAd) -> StorageResult<AdRecord>;
    async fn find_ad(&self, ad_id: &str) -> StorageResult<Option<AdRecord>>;
    async fn list_ads(&self) -> StorageResult<Vec<AdRecord>>;
    async fn insert_package(&self, package: NewPackage) -> StorageResult<PackageRecord>;
    async fn find_package(&self, package_id: &str) -> StorageResult<Option<PackageRecord>>;
    /// Catalog listing, cheapest tier first.
    async fn list_packages(&self) -> StorageResult<Vec<PackageRecord>>;
}

#[async_trait]
pub trait EarningStore: Send + Sync {
    /// Resolves the user-package row governing the quota at `now`: activated
    /// on or before `now`, not yet expired, most recent activation first.
    async fn active_package_for(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<ActivePackage>>;
    async fn count_views_since(
        &self,
        user: &UserId,
        boundary: DateTime<Utc>,
    ) -> StorageResult<u64>;
    async fn views_since(
        &self,
        user: &UserId,
        boundary: DateTime<Utc>,
    ) -> StorageResult<Vec<AdViewRecord>>;
    /// The atomic crediting step: recount today's views, bail with
    /// [`CreditOutcome::LimitReached`] at or over the limit, otherwise
    /// increment `total_earnings` and append the view row. Both effects
    /// commit together or not at all.
    async fn credit_reward(&self, claim: RewardClaim) -> StorageResult<CreditOutcome>;
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Credits the deposit balance and appends the completed ledger row in
    /// one transaction.
    async fn record_deposit(
        &self,
        user: &UserId,
        amount: i64,
        method: PaymentMethod,
    ) -> StorageResult<TransactionRecord>;
    /// Debits `package.price` from the deposit balance behind a
    /// `deposit_balance >= price` guard, inserts the activation row and the
    /// internal-transfer ledger row, all in one transaction. `None` means
    /// the guard failed: insufficient balance, nothing written.
    async fn activate_package(
        &self,
        user: &UserId,
        package: &PackageRecord,
    ) -> StorageResult<Option<UserPackageRecord>>;
    /// Debits `total_earnings` behind a `total_earnings >= amount` guard and
    /// appends the pending withdrawal row in one transaction. `None` means
    /// insufficient earnings, nothing written.
    async fn request_withdrawal(
        &self,
        user: &UserId,
        amount: i64,
        method: PaymentMethod,
    ) -> StorageResult<Option<TransactionRecord>>;
    /// Ledger listing, newest first.
    async fn transactions_for(&self, user: &UserId) -> StorageResult<Vec<TransactionRecord>>;
}
