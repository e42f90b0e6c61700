use chrono::Utc;
use primeadview_domain::model::{AdRecord, NewAd, NewPackage, PackageRecord};
use primeadview_domain::storage::{CatalogStore, StorageResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::{ads, packages};
use crate::errors::StorageError;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl CatalogStore for SeaOrmStorage {
    async fn insert_ad(&self, ad: NewAd) -> StorageResult<AdRecord> {
        let model = ads::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(ad.title),
            link: Set(ad.link),
            duration_seconds: Set(ad.duration_seconds),
            reward_amount: Set(ad.reward_amount),
            created_at: Set(Utc::now()),
        };
        let created = model
            .insert(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(ad_to_record(created))
    }

    async fn find_ad(&self, ad_id: &str) -> StorageResult<Option<AdRecord>> {
        let maybe = ads::Entity::find()
            .filter(ads::Column::Id.eq(ad_id))
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(ad_to_record))
    }

    async fn list_ads(&self) -> StorageResult<Vec<AdRecord>> {
        let models = ads::Entity::find()
            .order_by_asc(ads::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(models.into_iter().map(ad_to_record).collect())
    }

    async fn insert_package(&self, package: NewPackage) -> StorageResult<PackageRecord> {
        let model = packages::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(package.name),
            price: Set(package.price),
            duration_days: Set(package.duration_days),
            daily_ads_limit: Set(package.daily_ads_limit),
            roi_basis_points: Set(package.roi_basis_points),
            created_at: Set(Utc::now()),
        };
        let created = model
            .insert(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(package_to_record(created))
    }

    async fn find_package(&self, package_id: &str) -> StorageResult<Option<PackageRecord>> {
        let maybe = packages::Entity::find()
            .filter(packages::Column::Id.eq(package_id))
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(package_to_record))
    }

    async fn list_packages(&self) -> StorageResult<Vec<PackageRecord>> {
        let models = packages::Entity::find()
            .order_by_asc(packages::Column::Price)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(models.into_iter().map(package_to_record).collect())
    }
}

fn ad_to_record(model: ads::Model) -> AdRecord {
    AdRecord {
        id: model.id,
        title: model.title,
        link: model.link,
        duration_seconds: model.duration_seconds,
        reward_amount: model.reward_amount,
        created_at: model.created_at,
    }
}

pub(crate) fn package_to_record(model: packages::Model) -> PackageRecord {
    PackageRecord {
        id: model.id,
        name: model.name,
        price: model.price,
        duration_days: model.duration_days,
        daily_ads_limit: model.daily_ads_limit,
        roi_basis_points: model.roi_basis_points,
        created_at: model.created_at,
    }
}
