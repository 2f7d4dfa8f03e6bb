use chrono::Local;
use sea_orm::{
    entity::prelude::*, ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, DbErr, JoinType,
    ModelTrait, QueryOrder, QuerySelect, Set,
};

use super::{auction_watcher, bid, comment, image, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "farm_market_auction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub creator_id: i64,
    pub category_id: i64,
    pub date_created: DateTime,
    /// Opening price, expected to be at least 0.01. Validated by the form
    /// layer before it reaches the database.
    pub starting_bid: Decimal,
    /// Kept in sync with the highest bid by whichever caller places bids;
    /// nothing at this layer enforces it.
    pub current_bid: Option<Decimal>,
    pub buyer_id: Option<i64>,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Creator,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::BuyerId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Buyer,
    #[sea_orm(has_many = "super::image::Entity")]
    Image,
    #[sea_orm(has_many = "super::bid::Entity")]
    Bid,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Image.def()
    }
}

impl Related<super::bid::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bid.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: NotSet,
            title: NotSet,
            description: NotSet,
            creator_id: NotSet,
            category_id: NotSet,
            date_created: Set(Local::now().naive_local()),
            starting_bid: NotSet,
            current_bid: NotSet,
            buyer_id: NotSet,
            active: Set(true),
        }
    }
}

impl Model {
    pub async fn images<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<image::Model>, DbErr> {
        self.find_related(image::Entity).all(db).await
    }

    pub async fn bids<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<bid::Model>, DbErr> {
        self.find_related(bid::Entity).all(db).await
    }

    pub async fn comments<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<comment::Model>, DbErr> {
        self.find_related(comment::Entity).all(db).await
    }

    pub async fn highest_bid<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<Option<bid::Model>, DbErr> {
        self.find_related(bid::Entity)
            .order_by_desc(bid::Column::Amount)
            .one(db)
            .await
    }

    pub async fn watchers<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<user::Model>, DbErr> {
        user::Entity::find()
            .join(
                JoinType::InnerJoin,
                auction_watcher::Relation::User.def().rev(),
            )
            .filter(auction_watcher::Column::AuctionId.eq(self.id))
            .all(db)
            .await
    }

    pub async fn watch<C: ConnectionTrait>(&self, db: &C, user_id: i64) -> Result<(), DbErr> {
        auction_watcher::ActiveModel {
            auction_id: Set(self.id),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(())
    }

    pub async fn unwatch<C: ConnectionTrait>(&self, db: &C, user_id: i64) -> Result<(), DbErr> {
        auction_watcher::Entity::delete_many()
            .filter(auction_watcher::Column::AuctionId.eq(self.id))
            .filter(auction_watcher::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(())
    }
}
