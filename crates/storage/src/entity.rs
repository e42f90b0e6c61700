pub mod profiles {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "profiles")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub full_name: Option<String>,
        pub avatar_url: Option<String>,
        pub deposit_balance: i64,
        pub total_earnings: i64,
        pub created_at: DateTimeUtc,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod ads {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "ads")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub title: String,
        pub link: String,
        pub duration_seconds: i32,
        pub reward_amount: i64,
        pub created_at: DateTimeUtc,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod ad_views {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "ad_views")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub user_id: String,
        pub ad_id: String,
        pub earned_amount: i64,
        pub viewed_at: DateTimeUtc,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::profiles::Entity",
            from = "Column::UserId",
            to = "super::profiles::Column::Id"
        )]
        Profile,
        #[sea_orm(
            belongs_to = "super::ads::Entity",
            from = "Column::AdId",
            to = "super::ads::Column::Id"
        )]
        Ad,
    }

    impl Related<super::ads::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Ad.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod packages {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "packages")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        pub price: i64,
        pub duration_days: i32,
        pub daily_ads_limit: i32,
        pub roi_basis_points: i32,
        pub created_at: DateTimeUtc,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod user_packages {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "user_packages")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub user_id: String,
        pub package_id: String,
        pub activated_at: DateTimeUtc,
        pub expires_at: DateTimeUtc,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::profiles::Entity",
            from = "Column::UserId",
            to = "super::profiles::Column::Id"
        )]
        Profile,
        #[sea_orm(
            belongs_to = "super::packages::Entity",
            from = "Column::PackageId",
            to = "super::packages::Column::Id"
        )]
        Package,
    }

    impl Related<super::packages::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Package.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod transactions {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "transactions")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub user_id: String,
        pub kind: TransactionTypeDb,
        pub amount: i64,
        pub method: Option<PaymentMethodDb>,
        pub status: TransactionStatusDb,
        pub created_at: DateTimeUtc,
        pub updated_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
    #[sea_orm(rs_type = "i8", db_type = "TinyInteger")]
    pub enum TransactionTypeDb {
        #[sea_orm(num_value = 0)]
        Deposit,
        #[sea_orm(num_value = 1)]
        Withdrawal,
    }

    #[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
    #[sea_orm(rs_type = "i8", db_type = "TinyInteger")]
    pub enum TransactionStatusDb {
        #[sea_orm(num_value = 0)]
        Pending,
        #[sea_orm(num_value = 1)]
        Completed,
        #[sea_orm(num_value = 2)]
        Failed,
    }

    #[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
    #[sea_orm(rs_type = "i8", db_type = "TinyInteger")]
    pub enum PaymentMethodDb {
        #[sea_orm(num_value = 0)]
        Jazzcash,
        #[sea_orm(num_value = 1)]
        Easypaisa,
        #[sea_orm(num_value = 2)]
        Card,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::profiles::Entity",
            from = "Column::UserId",
            to = "super::profiles::Column::Id"
        )]
        Profile,
    }

    impl ActiveModelBehavior for ActiveModel {}
}
