use chrono::{Duration, Utc};
use primeadview_domain::model::{
    PackageRecord, PaymentMethod, TransactionRecord, TransactionStatus, TransactionType, UserId,
    UserPackageRecord,
};
use primeadview_domain::storage::{LedgerStore, StorageResult};
use sea_orm::sea_query::{Expr, PostgresQueryBuilder, Query, SimpleExpr, SqliteQueryBuilder};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};

use crate::entity::{
    profiles, transactions,
    transactions::{PaymentMethodDb, TransactionStatusDb, TransactionTypeDb},
    user_packages,
};
use crate::errors::StorageError;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl LedgerStore for SeaOrmStorage {
    async fn record_deposit(
        &self,
        user: &UserId,
        amount: i64,
        method: PaymentMethod,
    ) -> StorageResult<TransactionRecord> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;
        let now = Utc::now();

        let credited = self
            .adjust_balance(
                &txn,
                user,
                profiles::Column::DepositBalance,
                Expr::col(profiles::Column::DepositBalance).add(amount),
                None,
            )
            .await?;
        if !credited {
            return Err(StorageError::Database(
                "profile row missing for deposit credit".into(),
            ));
        }

        let row = transactions::ActiveModel {
            user_id: Set(user.as_str().to_string()),
            kind: Set(TransactionTypeDb::Deposit),
            amount: Set(amount),
            method: Set(Some(method_to_db(method))),
            status: Set(TransactionStatusDb::Completed),
            created_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        };
        let inserted = row.insert(&txn).await.map_err(StorageError::from_source)?;

        txn.commit().await.map_err(StorageError::from_source)?;

        tx_to_record(inserted)
    }

    async fn activate_package(
        &self,
        user: &UserId,
        package: &PackageRecord,
    ) -> StorageResult<Option<UserPackageRecord>> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;
        let now = Utc::now();

        // Debit is guarded by the balance itself; zero rows affected means
        // the balance would have gone negative and nothing was written.
        let debited = self
            .adjust_balance(
                &txn,
                user,
                profiles::Column::DepositBalance,
                Expr::col(profiles::Column::DepositBalance).sub(package.price),
                Some(Expr::col(profiles::Column::DepositBalance).gte(package.price)),
            )
            .await?;
        if !debited {
            return Ok(None);
        }

        let expires_at = now + Duration::days(i64::from(package.duration_days));
        let activation = user_packages::ActiveModel {
            user_id: Set(user.as_str().to_string()),
            package_id: Set(package.id.clone()),
            activated_at: Set(now),
            expires_at: Set(expires_at),
            ..Default::default()
        };
        let activation = activation
            .insert(&txn)
            .await
            .map_err(StorageError::from_source)?;

        // The internal transfer shows up in the ledger as a completed
        // withdrawal from the deposit balance, method `card` as a
        // placeholder.
        let row = transactions::ActiveModel {
            user_id: Set(user.as_str().to_string()),
            kind: Set(TransactionTypeDb::Withdrawal),
            amount: Set(package.price),
            method: Set(Some(PaymentMethodDb::Card)),
            status: Set(TransactionStatusDb::Completed),
            created_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        };
        row.insert(&txn).await.map_err(StorageError::from_source)?;

        txn.commit().await.map_err(StorageError::from_source)?;

        Ok(Some(activation_to_record(activation)?))
    }

    async fn request_withdrawal(
        &self,
        user: &UserId,
        amount: i64,
        method: PaymentMethod,
    ) -> StorageResult<Option<TransactionRecord>> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;
        let now = Utc::now();

        let debited = self
            .adjust_balance(
                &txn,
                user,
                profiles::Column::TotalEarnings,
                Expr::col(profiles::Column::TotalEarnings).sub(amount),
                Some(Expr::col(profiles::Column::TotalEarnings).gte(amount)),
            )
            .await?;
        if !debited {
            return Ok(None);
        }

        let row = transactions::ActiveModel {
            user_id: Set(user.as_str().to_string()),
            kind: Set(TransactionTypeDb::Withdrawal),
            amount: Set(amount),
            method: Set(Some(method_to_db(method))),
            status: Set(TransactionStatusDb::Pending),
            created_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        };
        let inserted = row.insert(&txn).await.map_err(StorageError::from_source)?;

        txn.commit().await.map_err(StorageError::from_source)?;

        tx_to_record(inserted).map(Some)
    }

    async fn transactions_for(&self, user: &UserId) -> StorageResult<Vec<TransactionRecord>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user.as_str()))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        models.into_iter().map(tx_to_record).collect()
    }
}

impl SeaOrmStorage {
    /// Applies a relative balance update, optionally guarded by an extra
    /// predicate (`balance >= amount` for debits). Returns whether a row was
    /// updated; `false` with a guard present means the guard rejected it.
    async fn adjust_balance(
        &self,
        txn: &DatabaseTransaction,
        user: &UserId,
        column: profiles::Column,
        new_value: SimpleExpr,
        guard: Option<SimpleExpr>,
    ) -> StorageResult<bool> {
        let backend = self.connection().get_database_backend();

        let mut query = Query::update();
        query.table(profiles::Entity);
        query.value(column, new_value);
        query.and_where(profiles::Column::Id.eq(user.as_str()));
        if let Some(guard) = guard {
            query.and_where(guard);
        }

        let (sql, values) = match backend {
            DatabaseBackend::Sqlite => query.build(SqliteQueryBuilder),
            DatabaseBackend::Postgres => query.build(PostgresQueryBuilder),
            DatabaseBackend::MySql => unreachable!("mysql backend is not supported"),
        };
        let result = txn
            .execute(Statement::from_sql_and_values(backend, sql, values))
            .await
            .map_err(StorageError::from_source)?;

        Ok(result.rows_affected() > 0)
    }
}

fn method_to_db(method: PaymentMethod) -> PaymentMethodDb {
    match method {
        PaymentMethod::Jazzcash => PaymentMethodDb::Jazzcash,
        PaymentMethod::Easypaisa => PaymentMethodDb::Easypaisa,
        PaymentMethod::Card => PaymentMethodDb::Card,
    }
}

fn method_from_db(method: PaymentMethodDb) -> PaymentMethod {
    match method {
        PaymentMethodDb::Jazzcash => PaymentMethod::Jazzcash,
        PaymentMethodDb::Easypaisa => PaymentMethod::Easypaisa,
        PaymentMethodDb::Card => PaymentMethod::Card,
    }
}

pub(crate) fn activation_to_record(
    model: user_packages::Model,
) -> StorageResult<UserPackageRecord> {
    let user_id =
        UserId::parse(&model.user_id).map_err(|err| StorageError::Database(err.to_string()))?;

    Ok(UserPackageRecord {
        id: model.id,
        user_id,
        package_id: model.package_id,
        activated_at: model.activated_at,
        expires_at: model.expires_at,
    })
}

pub(crate) fn tx_to_record(model: transactions::Model) -> StorageResult<TransactionRecord> {
    let user_id =
        UserId::parse(&model.user_id).map_err(|err| StorageError::Database(err.to_string()))?;

    Ok(TransactionRecord {
        id: model.id,
        user_id,
        kind: match model.kind {
            TransactionTypeDb::Deposit => TransactionType::Deposit,
            TransactionTypeDb::Withdrawal => TransactionType::Withdrawal,
        },
        amount: model.amount,
        method: model.method.map(method_from_db),
        status: match model.status {
            TransactionStatusDb::Pending => TransactionStatus::Pending,
            TransactionStatusDb::Completed => TransactionStatus::Completed,
            TransactionStatusDb::Failed => TransactionStatus::Failed,
        },
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
