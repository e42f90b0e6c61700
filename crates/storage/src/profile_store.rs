use chrono::Utc;
use primeadview_domain::model::{NewProfile, ProfileRecord, UserId};
use primeadview_domain::storage::{ProfileStore, StorageResult};
use sea_orm::{ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};

use crate::entity::profiles;
use crate::errors::StorageError;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl ProfileStore for SeaOrmStorage {
    async fn insert_profile(&self, profile: NewProfile) -> StorageResult<ProfileRecord> {
        let model = profiles::ActiveModel {
            id: Set(profile.id.as_str().to_string()),
            full_name: Set(profile.full_name),
            avatar_url: Set(None),
            deposit_balance: Set(0),
            total_earnings: Set(0),
            created_at: Set(Utc::now()),
        };
        profiles::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(profiles::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.connection())
            .await
            .map_err(StorageError::from_source)?;

        // Conflicts keep the original row, so read back whatever is there.
        self.find_profile(&profile.id)
            .await?
            .ok_or_else(|| StorageError::Database("profile row missing after insert".into()))
    }

    async fn find_profile(&self, user: &UserId) -> StorageResult<Option<ProfileRecord>> {
        let maybe = profiles::Entity::find()
            .filter(profiles::Column::Id.eq(user.as_str()))
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        maybe.map(profile_to_record).transpose()
    }

    async fn delete_profile(&self, user: &UserId) -> StorageResult<bool> {
        let maybe = profiles::Entity::find()
            .filter(profiles::Column::Id.eq(user.as_str()))
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        let Some(model) = maybe else {
            return Ok(false);
        };
        model
            .delete(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(true)
    }
}

pub(crate) fn profile_to_record(model: profiles::Model) -> StorageResult<ProfileRecord> {
    let id =
        UserId::parse(&model.id).map_err(|err| StorageError::Database(err.to_string()))?;

    Ok(ProfileRecord {
        id,
        full_name: model.full_name,
        avatar_url: model.avatar_url,
        deposit_balance: model.deposit_balance,
        total_earnings: model.total_earnings,
        created_at: model.created_at,
    })
}
