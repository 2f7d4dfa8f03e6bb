use std::path::Path;

use chrono::Local;
use sea_orm::{
    entity::prelude::*, ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, DbErr, JoinType,
    QuerySelect, Set,
};

use super::{product_watcher, user};

/// URL prefix under which the web layer serves uploaded files.
pub const MEDIA_URL: &str = "/media/";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "farm_market_product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub creator_id: i64,
    pub category_id: i64,
    pub date_created: DateTime,
    /// At least 1; the form layer rejects anything lower.
    pub quantity: i32,
    pub price: f64,
    pub active: bool,
    /// Digital goods never require shipping. Legacy rows may hold NULL,
    /// which is treated the same as digital.
    pub digital: Option<bool>,
    pub image: Option<String>,
    pub buyer_id: Option<i64>,
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
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: NotSet,
            name: NotSet,
            description: NotSet,
            creator_id: NotSet,
            category_id: NotSet,
            date_created: Set(Local::now().naive_local()),
            quantity: Set(1),
            price: NotSet,
            active: Set(true),
            digital: Set(Some(true)),
            image: NotSet,
            buyer_id: NotSet,
        }
    }
}

impl Model {
    /// URL of the product photo, or an empty string when no usable file is
    /// on record. Any failure to stat the file is swallowed on purpose so a
    /// missing upload renders as "no image" rather than an error page.
    pub fn image_url(&self, media_root: &Path) -> String {
        let name = match &self.image {
            Some(name) if !name.is_empty() => name,
            _ => return String::new(),
        };
        match std::fs::metadata(media_root.join(name)) {
            Ok(meta) if meta.is_file() => format!("{}{}", MEDIA_URL, name),
            _ => String::new(),
        }
    }

    pub async fn watchers<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<user::Model>, DbErr> {
        user::Entity::find()
            .join(
                JoinType::InnerJoin,
                product_watcher::Relation::User.def().rev(),
            )
            .filter(product_watcher::Column::ProductId.eq(self.id))
            .all(db)
            .await
    }

    pub async fn watch<C: ConnectionTrait>(&self, db: &C, user_id: i64) -> Result<(), DbErr> {
        product_watcher::ActiveModel {
            product_id: Set(self.id),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(())
    }

    pub async fn unwatch<C: ConnectionTrait>(&self, db: &C, user_id: i64) -> Result<(), DbErr> {
        product_watcher::Entity::delete_many()
            .filter(product_watcher::Column::ProductId.eq(self.id))
            .filter(product_watcher::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(())
    }
}
