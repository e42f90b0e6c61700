use chrono::{DateTime, Utc};
use primeadview_domain::model::{
    start_of_utc_day, ActivePackage, AdViewRecord, CreditOutcome, RewardClaim, UserId,
};
use primeadview_domain::storage::{EarningStore, StorageResult};
use sea_orm::sea_query::{Expr, PostgresQueryBuilder, Query, SqliteQueryBuilder};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};

use crate::entity::{ad_views, profiles, user_packages};
use crate::errors::StorageError;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl EarningStore for SeaOrmStorage {
    async fn active_package_for(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<ActivePackage>> {
        // Historical activations may overlap; the most recent unexpired one
        // governs the quota.
        let maybe = user_packages::Entity::find()
            .find_also_related(crate::entity::packages::Entity)
            .filter(user_packages::Column::UserId.eq(user.as_str()))
            .filter(user_packages::Column::ActivatedAt.lte(now))
            .filter(user_packages::Column::ExpiresAt.gte(now))
            .order_by_desc(user_packages::Column::ActivatedAt)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;

        let Some((activation, package)) = maybe else {
            return Ok(None);
        };
        let package = package.ok_or_else(|| {
            StorageError::Database(format!(
                "activation {} references missing package {}",
                activation.id, activation.package_id
            ))
        })?;

        Ok(Some(ActivePackage {
            user_package_id: activation.id,
            package_id: package.id,
            package_name: package.name,
            daily_ads_limit: package.daily_ads_limit,
            activated_at: activation.activated_at,
            expires_at: activation.expires_at,
        }))
    }

    async fn count_views_since(
        &self,
        user: &UserId,
        boundary: DateTime<Utc>,
    ) -> StorageResult<u64> {
        ad_views::Entity::find()
            .filter(ad_views::Column::UserId.eq(user.as_str()))
            .filter(ad_views::Column::ViewedAt.gte(boundary))
            .count(self.connection())
            .await
            .map_err(StorageError::from_source)
    }

    async fn views_since(
        &self,
        user: &UserId,
        boundary: DateTime<Utc>,
    ) -> StorageResult<Vec<AdViewRecord>> {
        let models = ad_views::Entity::find()
            .filter(ad_views::Column::UserId.eq(user.as_str()))
            .filter(ad_views::Column::ViewedAt.gte(boundary))
            .order_by_desc(ad_views::Column::ViewedAt)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        models.into_iter().map(view_to_record).collect()
    }

    async fn credit_reward(&self, claim: RewardClaim) -> StorageResult<CreditOutcome> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;
        let now = Utc::now();
        let boundary = start_of_utc_day(now);

        // Recount inside the transaction: two racing claims that both passed
        // the handler's fast check serialize here, and the loser sees the
        // winner's row.
        let viewed_today = ad_views::Entity::find()
            .filter(ad_views::Column::UserId.eq(claim.user_id.as_str()))
            .filter(ad_views::Column::ViewedAt.gte(boundary))
            .count(&txn)
            .await
            .map_err(StorageError::from_source)?;
        if viewed_today >= claim.daily_ads_limit.max(0) as u64 {
            return Ok(CreditOutcome::LimitReached);
        }

        let backend = self.connection().get_database_backend();
        let mut query = Query::update();
        query.table(profiles::Entity);
        query.value(
            profiles::Column::TotalEarnings,
            Expr::col(profiles::Column::TotalEarnings).add(claim.earned_amount),
        );
        query.and_where(profiles::Column::Id.eq(claim.user_id.as_str()));

        let (sql, values) = match backend {
            DatabaseBackend::Sqlite => query.build(SqliteQueryBuilder),
            DatabaseBackend::Postgres => query.build(PostgresQueryBuilder),
            DatabaseBackend::MySql => unreachable!("mysql backend is not supported"),
        };
        let result = txn
            .execute(Statement::from_sql_and_values(backend, sql, values))
            .await
            .map_err(StorageError::from_source)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::Database(
                "profile row missing for earnings credit".into(),
            ));
        }

        let view = ad_views::ActiveModel {
            user_id: Set(claim.user_id.as_str().to_string()),
            ad_id: Set(claim.ad_id.clone()),
            earned_amount: Set(claim.earned_amount),
            viewed_at: Set(now),
            ..Default::default()
        };
        let inserted = view
            .insert(&txn)
            .await
            .map_err(StorageError::from_source)?;

        txn.commit().await.map_err(StorageError::from_source)?;

        Ok(CreditOutcome::Credited(view_to_record(inserted)?))
    }
}

pub(crate) fn view_to_record(model: ad_views::Model) -> StorageResult<AdViewRecord> {
    let user_id =
        UserId::parse(&model.user_id).map_err(|err| StorageError::Database(err.to_string()))?;

    Ok(AdViewRecord {
        id: model.id,
        user_id,
        ad_id: model.ad_id,
        earned_amount: model.earned_amount,
        viewed_at: model.viewed_at,
    })
}
