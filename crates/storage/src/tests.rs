use chrono::{Duration, Utc};
use primeadview_domain::model::{
    start_of_utc_day, CreditOutcome, NewAd, NewPackage, NewProfile, PaymentMethod, RewardClaim,
    TransactionStatus, TransactionType, UserId,
};
use primeadview_domain::storage::{
    CatalogStore, EarningStore, LedgerStore, ProfileStore,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

use crate::entity::{ad_views, transactions, user_packages};
use crate::SeaOrmStorage;

async fn storage() -> SeaOrmStorage {
    SeaOrmStorage::connect("sqlite::memory:")
        .await
        .expect("storage inits")
}

fn user() -> UserId {
    UserId::parse("user-1").unwrap()
}

async fn provision(storage: &SeaOrmStorage) -> UserId {
    let user = user();
    storage
        .insert_profile(NewProfile {
            id: user.clone(),
            full_name: Some("Test User".into()),
        })
        .await
        .unwrap();
    user
}

async fn seed_ad(storage: &SeaOrmStorage, reward: i64) -> String {
    storage
        .insert_ad(NewAd {
            title: "Sample ad".into(),
            link: "https://ads.example/1".into(),
            duration_seconds: 30,
            reward_amount: reward,
        })
        .await
        .unwrap()
        .id
}

async fn seed_package(storage: &SeaOrmStorage, price: i64, limit: i32) -> String {
    storage
        .insert_package(NewPackage {
            name: "Starter".into(),
            price,
            duration_days: 30,
            daily_ads_limit: limit,
            roi_basis_points: 250,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn profile_provisioning_is_idempotent() {
    let storage = storage().await;
    let user = provision(&storage).await;

    let again = storage
        .insert_profile(NewProfile {
            id: user.clone(),
            full_name: Some("Renamed Later".into()),
        })
        .await
        .unwrap();

    // The original row wins on conflict.
    assert_eq!(again.full_name.as_deref(), Some("Test User"));
    assert_eq!(again.deposit_balance, 0);
    assert_eq!(again.total_earnings, 0);
}

#[tokio::test]
async fn active_package_ignores_expired_activations() {
    let storage = storage().await;
    let user = provision(&storage).await;
    let package_id = seed_package(&storage, 5_000, 5).await;

    let now = Utc::now();
    user_packages::ActiveModel {
        user_id: Set(user.as_str().to_string()),
        package_id: Set(package_id.clone()),
        activated_at: Set(now - Duration::days(40)),
        expires_at: Set(now - Duration::days(10)),
        ..Default::default()
    }
    .insert(storage.connection())
    .await
    .unwrap();

    assert_eq!(storage.active_package_for(&user, now).await.unwrap(), None);

    user_packages::ActiveModel {
        user_id: Set(user.as_str().to_string()),
        package_id: Set(package_id.clone()),
        activated_at: Set(now - Duration::days(1)),
        expires_at: Set(now + Duration::days(29)),
        ..Default::default()
    }
    .insert(storage.connection())
    .await
    .unwrap();

    let active = storage
        .active_package_for(&user, now)
        .await
        .unwrap()
        .expect("current activation is found");
    assert_eq!(active.package_id, package_id);
    assert_eq!(active.daily_ads_limit, 5);
}

#[tokio::test]
async fn most_recent_activation_governs() {
    let storage = storage().await;
    let user = provision(&storage).await;
    let older = seed_package(&storage, 5_000, 3).await;
    let newer = seed_package(&storage, 10_000, 10).await;

    let now = Utc::now();
    for (package_id, days_ago) in [(older, 5), (newer.clone(), 1)] {
        user_packages::ActiveModel {
            user_id: Set(user.as_str().to_string()),
            package_id: Set(package_id),
            activated_at: Set(now - Duration::days(days_ago)),
            expires_at: Set(now + Duration::days(30 - days_ago)),
            ..Default::default()
        }
        .insert(storage.connection())
        .await
        .unwrap();
    }

    let active = storage
        .active_package_for(&user, now)
        .await
        .unwrap()
        .expect("an activation is current");
    assert_eq!(active.package_id, newer);
    assert_eq!(active.daily_ads_limit, 10);
}

#[tokio::test]
async fn credit_reward_commits_both_effects() {
    let storage = storage().await;
    let user = provision(&storage).await;
    let ad_id = seed_ad(&storage, 125).await;

    let outcome = storage
        .credit_reward(RewardClaim {
            user_id: user.clone(),
            ad_id: ad_id.clone(),
            earned_amount: 125,
            daily_ads_limit: 5,
        })
        .await
        .unwrap();

    let view = match outcome {
        CreditOutcome::Credited(view) => view,
        CreditOutcome::LimitReached => panic!("claim should have been credited"),
    };
    assert_eq!(view.earned_amount, 125);
    assert_eq!(view.ad_id, ad_id);

    let profile = storage.find_profile(&user).await.unwrap().unwrap();
    assert_eq!(profile.total_earnings, 125);

    let today = storage
        .views_since(&user, start_of_utc_day(Utc::now()))
        .await
        .unwrap();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].earned_amount, 125);
}

#[tokio::test]
async fn credit_reward_recount_stops_at_limit() {
    let storage = storage().await;
    let user = provision(&storage).await;
    let ad_id = seed_ad(&storage, 100).await;

    for _ in 0..2 {
        let outcome = storage
            .credit_reward(RewardClaim {
                user_id: user.clone(),
                ad_id: ad_id.clone(),
                earned_amount: 100,
                daily_ads_limit: 2,
            })
            .await
            .unwrap();
        assert!(matches!(outcome, CreditOutcome::Credited(_)));
    }

    let outcome = storage
        .credit_reward(RewardClaim {
            user_id: user.clone(),
            ad_id: ad_id.clone(),
            earned_amount: 100,
            daily_ads_limit: 2,
        })
        .await
        .unwrap();
    assert_eq!(outcome, CreditOutcome::LimitReached);

    // The rejected claim wrote nothing.
    let profile = storage.find_profile(&user).await.unwrap().unwrap();
    assert_eq!(profile.total_earnings, 200);
    let count = storage
        .count_views_since(&user, start_of_utc_day(Utc::now()))
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn deposit_credits_balance_and_appends_ledger_row() {
    let storage = storage().await;
    let user = provision(&storage).await;

    let record = storage
        .record_deposit(&user, 10_000, PaymentMethod::Jazzcash)
        .await
        .unwrap();
    assert_eq!(record.kind, TransactionType::Deposit);
    assert_eq!(record.amount, 10_000);
    assert_eq!(record.method, Some(PaymentMethod::Jazzcash));
    assert_eq!(record.status, TransactionStatus::Completed);

    let profile = storage.find_profile(&user).await.unwrap().unwrap();
    assert_eq!(profile.deposit_balance, 10_000);
}

#[tokio::test]
async fn activation_is_rejected_without_funds() {
    let storage = storage().await;
    let user = provision(&storage).await;
    let package_id = seed_package(&storage, 5_000, 5).await;
    let package = storage.find_package(&package_id).await.unwrap().unwrap();

    storage
        .record_deposit(&user, 4_999, PaymentMethod::Card)
        .await
        .unwrap();

    let outcome = storage.activate_package(&user, &package).await.unwrap();
    assert!(outcome.is_none());

    // Nothing moved: balance intact, no activation, only the deposit row.
    let profile = storage.find_profile(&user).await.unwrap().unwrap();
    assert_eq!(profile.deposit_balance, 4_999);
    let activations = user_packages::Entity::find()
        .filter(user_packages::Column::UserId.eq(user.as_str()))
        .count(storage.connection())
        .await
        .unwrap();
    assert_eq!(activations, 0);
    assert_eq!(storage.transactions_for(&user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn activation_debits_price_and_records_transfer() {
    let storage = storage().await;
    let user = provision(&storage).await;
    let package_id = seed_package(&storage, 5_000, 5).await;
    let package = storage.find_package(&package_id).await.unwrap().unwrap();

    storage
        .record_deposit(&user, 10_000, PaymentMethod::Easypaisa)
        .await
        .unwrap();

    let activation = storage
        .activate_package(&user, &package)
        .await
        .unwrap()
        .expect("activation succeeds");
    assert_eq!(activation.package_id, package_id);
    assert_eq!(
        activation.expires_at - activation.activated_at,
        Duration::days(30)
    );

    let profile = storage.find_profile(&user).await.unwrap().unwrap();
    assert_eq!(profile.deposit_balance, 5_000);

    let ledger = storage.transactions_for(&user).await.unwrap();
    assert_eq!(ledger.len(), 2);
    let transfer = &ledger[0];
    assert_eq!(transfer.kind, TransactionType::Withdrawal);
    assert_eq!(transfer.amount, 5_000);
    assert_eq!(transfer.status, TransactionStatus::Completed);
    assert_eq!(transfer.method, Some(PaymentMethod::Card));
}

#[tokio::test]
async fn withdrawal_guard_rejects_overdraw() {
    let storage = storage().await;
    let user = provision(&storage).await;
    let ad_id = seed_ad(&storage, 300).await;
    storage
        .credit_reward(RewardClaim {
            user_id: user.clone(),
            ad_id,
            earned_amount: 300,
            daily_ads_limit: 5,
        })
        .await
        .unwrap();

    let rejected = storage
        .request_withdrawal(&user, 301, PaymentMethod::Jazzcash)
        .await
        .unwrap();
    assert!(rejected.is_none());
    let profile = storage.find_profile(&user).await.unwrap().unwrap();
    assert_eq!(profile.total_earnings, 300);

    let accepted = storage
        .request_withdrawal(&user, 300, PaymentMethod::Jazzcash)
        .await
        .unwrap()
        .expect("withdrawal accepted");
    assert_eq!(accepted.status, TransactionStatus::Pending);
    assert_eq!(accepted.kind, TransactionType::Withdrawal);

    let profile = storage.find_profile(&user).await.unwrap().unwrap();
    assert_eq!(profile.total_earnings, 0);
}

#[tokio::test]
async fn deleting_a_profile_cascades_to_owned_rows() {
    let storage = storage().await;
    let user = provision(&storage).await;
    let ad_id = seed_ad(&storage, 100).await;
    let package_id = seed_package(&storage, 1_000, 5).await;
    let package = storage.find_package(&package_id).await.unwrap().unwrap();

    storage
        .record_deposit(&user, 2_000, PaymentMethod::Card)
        .await
        .unwrap();
    storage
        .activate_package(&user, &package)
        .await
        .unwrap()
        .expect("activation succeeds");
    storage
        .credit_reward(RewardClaim {
            user_id: user.clone(),
            ad_id,
            earned_amount: 100,
            daily_ads_limit: 5,
        })
        .await
        .unwrap();

    assert!(storage.delete_profile(&user).await.unwrap());
    assert!(storage.find_profile(&user).await.unwrap().is_none());

    let views = ad_views::Entity::find()
        .filter(ad_views::Column::UserId.eq(user.as_str()))
        .count(storage.connection())
        .await
        .unwrap();
    let activations = user_packages::Entity::find()
        .filter(user_packages::Column::UserId.eq(user.as_str()))
        .count(storage.connection())
        .await
        .unwrap();
    let ledger = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user.as_str()))
        .count(storage.connection())
        .await
        .unwrap();
    assert_eq!((views, activations, ledger), (0, 0, 0));

    // Catalog rows survive account deletion.
    assert!(storage.find_package(&package_id).await.unwrap().is_some());

    assert!(!storage.delete_profile(&user).await.unwrap());
}

#[tokio::test]
async fn ledger_lists_newest_first() {
    let storage = storage().await;
    let user = provision(&storage).await;

    storage
        .record_deposit(&user, 100, PaymentMethod::Jazzcash)
        .await
        .unwrap();
    storage
        .record_deposit(&user, 200, PaymentMethod::Easypaisa)
        .await
        .unwrap();
    storage
        .record_deposit(&user, 300, PaymentMethod::Card)
        .await
        .unwrap();

    let ledger = storage.transactions_for(&user).await.unwrap();
    let amounts: Vec<i64> = ledger.iter().map(|tx| tx.amount).collect();
    assert_eq!(amounts, vec![300, 200, 100]);
}

#[tokio::test]
async fn package_listing_is_cheapest_first() {
    let storage = storage().await;
    seed_package(&storage, 9_000, 20).await;
    seed_package(&storage, 1_000, 3).await;
    seed_package(&storage, 5_000, 10).await;

    let prices: Vec<i64> = storage
        .list_packages()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.price)
        .collect();
    assert_eq!(prices, vec![1_000, 5_000, 9_000]);
}
