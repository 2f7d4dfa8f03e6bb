use chrono::Local;
use sea_orm::{
    entity::prelude::*, ActiveValue::NotSet, ConnectionTrait, DbErr, JoinType, QuerySelect, Set,
};

use super::{auction, auction_watcher, product, product_watcher};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "farm_market_user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime,
    pub is_farmer: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: NotSet,
            username: NotSet,
            email: NotSet,
            password: NotSet,
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            date_joined: Set(Local::now().naive_local()),
            is_farmer: Set(false),
        }
    }
}

impl Model {
    /// Auctions this user is tracking without necessarily bidding on them.
    pub async fn watchlist<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<Vec<auction::Model>, DbErr> {
        auction::Entity::find()
            .join(
                JoinType::InnerJoin,
                auction_watcher::Relation::Auction.def().rev(),
            )
            .filter(auction_watcher::Column::UserId.eq(self.id))
            .all(db)
            .await
    }

    /// Same as [`Self::watchlist`] for the inventory side of the shop.
    pub async fn product_watchlist<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<Vec<product::Model>, DbErr> {
        product::Entity::find()
            .join(
                JoinType::InnerJoin,
                product_watcher::Relation::Product.def().rev(),
            )
            .filter(product_watcher::Column::UserId.eq(self.id))
            .all(db)
            .await
    }
}
