use chrono::Local;
use sea_orm::{entity::prelude::*, ActiveValue::NotSet, Set};

use super::product;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "farm_market_order_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub product_id: Option<i64>,
    pub order_id: Option<i64>,
    pub quantity: i32,
    pub date_added: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Order,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: NotSet,
            product_id: NotSet,
            order_id: NotSet,
            quantity: Set(0),
            date_added: Set(Local::now().naive_local()),
        }
    }
}

impl Model {
    /// Line total for this item given its product.
    pub fn total(&self, product: &product::Model) -> f64 {
        product.price * f64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;

    use super::{product, Model};

    #[test]
    fn total_is_price_times_quantity() {
        let now = Local::now().naive_local();
        let item = Model {
            id: 1,
            product_id: Some(7),
            order_id: Some(3),
            quantity: 4,
            date_added: now,
        };
        let product = product::Model {
            id: 7,
            name: "Alfalfa bales".to_owned(),
            description: None,
            creator_id: 1,
            category_id: 1,
            date_created: now,
            quantity: 50,
            price: 9.25,
            active: true,
            digital: Some(false),
            image: None,
            buyer_id: None,
        };
        assert_eq!(item.total(&product), 37.0);
    }
}
