use sea_orm::{entity::prelude::*, ConnectionTrait, DbErr, ModelTrait, PaginatorTrait};

use super::auction;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "farm_market_category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::auction::Entity")]
    Auction,
}

impl Related<super::auction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Auction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Number of auctions filed under this category. Despite the name this
    /// counts closed auctions too; the `active` flag is not consulted.
    pub async fn count_active_auctions<C: ConnectionTrait>(&self, db: &C) -> Result<usize, DbErr> {
        self.find_related(auction::Entity).count(db).await
    }
}
