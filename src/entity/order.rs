use chrono::Local;
use sea_orm::{entity::prelude::*, ActiveValue::NotSet, ConnectionTrait, DbErr, ModelTrait, Set};

use super::{order_item, product};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "farm_market_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub customer_id: Option<i64>,
    pub date_ordered: DateTime,
    pub complete: bool,
    pub transaction_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CustomerId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Customer,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: NotSet,
            customer_id: NotSet,
            date_ordered: Set(Local::now().naive_local()),
            complete: Set(false),
            transaction_id: NotSet,
        }
    }
}

impl Model {
    /// Whether fulfilling this order involves shipping anything, i.e. at
    /// least one line item refers to a non-digital product.
    pub async fn shipping<C: ConnectionTrait>(&self, db: &C) -> Result<bool, DbErr> {
        let items = self.items_with_products(db).await?;
        Ok(items
            .iter()
            .any(|(_, product)| matches!(product, Some(p) if p.digital == Some(false))))
    }

    /// Total price of the cart, summed over the line items on every read.
    /// Items whose product row has since been deleted contribute nothing.
    pub async fn cart_total<C: ConnectionTrait>(&self, db: &C) -> Result<f64, DbErr> {
        let items = self.items_with_products(db).await?;
        Ok(items
            .iter()
            .filter_map(|(item, product)| product.as_ref().map(|p| item.total(p)))
            .sum())
    }

    /// Number of units in the cart across all line items.
    pub async fn cart_items<C: ConnectionTrait>(&self, db: &C) -> Result<i64, DbErr> {
        let items = self.find_related(order_item::Entity).all(db).await?;
        Ok(items.iter().map(|item| i64::from(item.quantity)).sum())
    }

    async fn items_with_products<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<Vec<(order_item::Model, Option<product::Model>)>, DbErr> {
        order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(self.id))
            .find_also_related(product::Entity)
            .all(db)
            .await
    }
}
