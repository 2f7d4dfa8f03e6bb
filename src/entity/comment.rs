use chrono::Local;
use sea_orm::{entity::prelude::*, ActiveValue::NotSet, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "farm_market_comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub user_id: i64,
    pub auction_id: i64,
    /// Free text, at most 500 characters. Length is checked by the form
    /// layer, not here.
    pub comment: String,
    pub date_created: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::auction::Entity",
        from = "Column::AuctionId",
        to = "super::auction::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Auction,
}

impl Related<super::auction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Auction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: NotSet,
            user_id: NotSet,
            auction_id: NotSet,
            comment: NotSet,
            date_created: Set(Local::now().naive_local()),
        }
    }
}

impl Model {
    /// Creation date rendered the way the auction pages display it,
    /// e.g. `September 05 2021`.
    pub fn creation_date(&self) -> String {
        self.date_created.format("%B %d %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::Model;

    #[test]
    fn creation_date_uses_long_month_format() {
        let comment = Model {
            id: 1,
            user_id: 1,
            auction_id: 1,
            comment: "Are these organically grown?".to_owned(),
            date_created: NaiveDate::from_ymd_opt(2021, 9, 5)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        };
        assert_eq!(comment.creation_date(), "September 05 2021");
    }
}
