use sea_orm::sea_query::{
    ColumnDef, Expr, ForeignKey, ForeignKeyAction, Index, IndexCreateStatement, Table,
    TableCreateStatement,
};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection};

use crate::entity::{ad_views, ads, packages, profiles, transactions, user_packages};
use primeadview_domain::storage::StorageResult;

pub async fn run_migrations(db: &DatabaseConnection) -> StorageResult<()> {
    let backend = db.get_database_backend();

    let profiles_table = Table::create()
        .if_not_exists()
        .table(profiles::Entity)
        .col(
            ColumnDef::new(profiles::Column::Id)
                .string_len(64)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(profiles::Column::FullName).string().null())
        .col(ColumnDef::new(profiles::Column::AvatarUrl).string().null())
        .col(
            ColumnDef::new(profiles::Column::DepositBalance)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(profiles::Column::TotalEarnings)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(profiles::Column::CreatedAt)
                .date_time()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned();
    create_table(db, backend, profiles_table).await?;

    let ads_table = Table::create()
        .if_not_exists()
        .table(ads::Entity)
        .col(
            ColumnDef::new(ads::Column::Id)
                .string_len(64)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(ads::Column::Title).string().not_null())
        .col(ColumnDef::new(ads::Column::Link).string().not_null())
        .col(
            ColumnDef::new(ads::Column::DurationSeconds)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(ads::Column::RewardAmount)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(ads::Column::CreatedAt)
                .date_time()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned();
    create_table(db, backend, ads_table).await?;

    let packages_table = Table::create()
        .if_not_exists()
        .table(packages::Entity)
        .col(
            ColumnDef::new(packages::Column::Id)
                .string_len(64)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(packages::Column::Name).string().not_null())
        .col(
            ColumnDef::new(packages::Column::Price)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(packages::Column::DurationDays)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(packages::Column::DailyAdsLimit)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(packages::Column::RoiBasisPoints)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(packages::Column::CreatedAt)
                .date_time()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned();
    create_table(db, backend, packages_table).await?;

    let ad_views_table = Table::create()
        .if_not_exists()
        .table(ad_views::Entity)
        .col(
            ColumnDef::new(ad_views::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(ad_views::Column::UserId)
                .string_len(64)
                .not_null(),
        )
        .col(
            ColumnDef::new(ad_views::Column::AdId)
                .string_len(64)
                .not_null(),
        )
        .col(
            ColumnDef::new(ad_views::Column::EarnedAmount)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(ad_views::Column::ViewedAt)
                .date_time()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_ad_views_user")
                .from(ad_views::Entity, ad_views::Column::UserId)
                .to(profiles::Entity, profiles::Column::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_ad_views_ad")
                .from(ad_views::Entity, ad_views::Column::AdId)
                .to(ads::Entity, ads::Column::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned();
    create_table(db, backend, ad_views_table).await?;

    // The daily quota recount runs on every claim; keep it indexed.
    let ad_views_index = Index::create()
        .if_not_exists()
        .name("idx_ad_views_user_viewed")
        .table(ad_views::Entity)
        .col(ad_views::Column::UserId)
        .col(ad_views::Column::ViewedAt)
        .to_owned();
    create_index(db, backend, ad_views_index).await?;

    let user_packages_table = Table::create()
        .if_not_exists()
        .table(user_packages::Entity)
        .col(
            ColumnDef::new(user_packages::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(user_packages::Column::UserId)
                .string_len(64)
                .not_null(),
        )
        .col(
            ColumnDef::new(user_packages::Column::PackageId)
                .string_len(64)
                .not_null(),
        )
        .col(
            ColumnDef::new(user_packages::Column::ActivatedAt)
                .date_time()
                .not_null(),
        )
        .col(
            ColumnDef::new(user_packages::Column::ExpiresAt)
                .date_time()
                .not_null(),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_user_packages_user")
                .from(user_packages::Entity, user_packages::Column::UserId)
                .to(profiles::Entity, profiles::Column::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_user_packages_package")
                .from(user_packages::Entity, user_packages::Column::PackageId)
                .to(packages::Entity, packages::Column::Id),
        )
        .to_owned();
    create_table(db, backend, user_packages_table).await?;

    let transactions_table = Table::create()
        .if_not_exists()
        .table(transactions::Entity)
        .col(
            ColumnDef::new(transactions::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(transactions::Column::UserId)
                .string_len(64)
                .not_null(),
        )
        .col(
            ColumnDef::new(transactions::Column::Kind)
                .tiny_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(transactions::Column::Amount)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(transactions::Column::Method)
                .tiny_integer()
                .null(),
        )
        .col(
            ColumnDef::new(transactions::Column::Status)
                .tiny_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(transactions::Column::CreatedAt)
                .date_time()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(transactions::Column::UpdatedAt)
                .date_time()
                .null(),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_transactions_user")
                .from(transactions::Entity, transactions::Column::UserId)
                .to(profiles::Entity, profiles::Column::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned();
    create_table(db, backend, transactions_table).await?;

    let transactions_index = Index::create()
        .if_not_exists()
        .name("idx_transactions_user_created")
        .table(transactions::Entity)
        .col(transactions::Column::UserId)
        .col(transactions::Column::CreatedAt)
        .to_owned();
    create_index(db, backend, transactions_index).await?;

    Ok(())
}

async fn create_table(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    mut statement: TableCreateStatement,
) -> StorageResult<()> {
    statement.if_not_exists();
    db.execute(backend.build(&statement))
        .await
        .map_err(crate::errors::StorageError::from_source)?;
    Ok(())
}

async fn create_index(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    statement: IndexCreateStatement,
) -> StorageResult<()> {
    db.execute(backend.build(&statement))
        .await
        .map_err(crate::errors::StorageError::from_source)?;
    Ok(())
}
