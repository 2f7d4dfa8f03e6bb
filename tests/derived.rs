use chrono::NaiveDate;
use farm_market::entity::{self, auction, bid, category, order, order_item, product, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, ModelTrait, Set};

async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1);
    let db = Database::connect(options).await.expect("connect to sqlite");
    entity::schema_setup(&db).await.expect("create schema");
    db
}

async fn insert_user(db: &DatabaseConnection, username: &str) -> user::Model {
    let mut active = user::ActiveModel::new();
    active.username = Set(username.to_owned());
    active.email = Set(format!("{}@example.com", username));
    active.password = Set("hash".to_owned());
    active.insert(db).await.expect("insert user")
}

async fn insert_category(db: &DatabaseConnection, name: &str) -> category::Model {
    category::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert category")
}

async fn insert_auction(
    db: &DatabaseConnection,
    creator: &user::Model,
    category: &category::Model,
    active_flag: bool,
) -> auction::Model {
    let mut active = auction::ActiveModel::new();
    active.title = Set("Spring lambs".to_owned());
    active.creator_id = Set(creator.id);
    active.category_id = Set(category.id);
    active.starting_bid = Set(Decimal::new(2500, 2));
    active.active = Set(active_flag);
    active.insert(db).await.expect("insert auction")
}

async fn insert_product(
    db: &DatabaseConnection,
    creator: &user::Model,
    category: &category::Model,
    price: f64,
    digital: Option<bool>,
) -> product::Model {
    let mut active = product::ActiveModel::new();
    active.name = Set("Herd share".to_owned());
    active.creator_id = Set(creator.id);
    active.category_id = Set(category.id);
    active.price = Set(price);
    active.digital = Set(digital);
    active.insert(db).await.expect("insert product")
}

async fn insert_item(
    db: &DatabaseConnection,
    order: &order::Model,
    product: &product::Model,
    quantity: i32,
) -> order_item::Model {
    let mut active = order_item::ActiveModel::new();
    active.product_id = Set(Some(product.id));
    active.order_id = Set(Some(order.id));
    active.quantity = Set(quantity);
    active.insert(db).await.expect("insert item")
}

#[tokio::test]
async fn category_auction_count_ignores_the_active_flag() {
    let db = setup().await;
    let creator = insert_user(&db, "alice").await;
    let livestock = insert_category(&db, "Livestock").await;
    let flowers = insert_category(&db, "Flowers").await;

    insert_auction(&db, &creator, &livestock, true).await;
    insert_auction(&db, &creator, &livestock, false).await;

    // closed auctions count too
    assert_eq!(livestock.count_active_auctions(&db).await.unwrap(), 2);
    assert_eq!(flowers.count_active_auctions(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn cart_totals_are_summed_over_line_items() {
    let db = setup().await;
    let farmer = insert_user(&db, "alice").await;
    let dairy = insert_category(&db, "Dairy").await;
    let cheese = insert_product(&db, &farmer, &dairy, 9.25, Some(false)).await;
    let recipes = insert_product(&db, &farmer, &dairy, 4.5, Some(true)).await;
    let order = order::ActiveModel::new().insert(&db).await.unwrap();

    insert_item(&db, &order, &cheese, 2).await;
    insert_item(&db, &order, &recipes, 3).await;

    assert_eq!(order.cart_total(&db).await.unwrap(), 32.0);
    assert_eq!(order.cart_items(&db).await.unwrap(), 5);
}

#[tokio::test]
async fn an_empty_order_derives_to_zero() {
    let db = setup().await;
    let order = order::ActiveModel::new().insert(&db).await.unwrap();

    assert_eq!(order.cart_total(&db).await.unwrap(), 0.0);
    assert_eq!(order.cart_items(&db).await.unwrap(), 0);
    assert!(!order.shipping(&db).await.unwrap());
}

#[tokio::test]
async fn shipping_is_required_only_for_physical_products() {
    let db = setup().await;
    let farmer = insert_user(&db, "alice").await;
    let dairy = insert_category(&db, "Dairy").await;
    let recipes = insert_product(&db, &farmer, &dairy, 4.5, Some(true)).await;
    let unknown = insert_product(&db, &farmer, &dairy, 2.5, None).await;
    let cheese = insert_product(&db, &farmer, &dairy, 9.25, Some(false)).await;
    let order = order::ActiveModel::new().insert(&db).await.unwrap();

    insert_item(&db, &order, &recipes, 1).await;
    insert_item(&db, &order, &unknown, 1).await;
    assert!(!order.shipping(&db).await.unwrap());

    insert_item(&db, &order, &cheese, 1).await;
    assert!(order.shipping(&db).await.unwrap());
}

#[tokio::test]
async fn items_for_deleted_products_drop_out_of_the_total() {
    let db = setup().await;
    let farmer = insert_user(&db, "alice").await;
    let dairy = insert_category(&db, "Dairy").await;
    let cheese = insert_product(&db, &farmer, &dairy, 9.25, Some(false)).await;
    let recipes = insert_product(&db, &farmer, &dairy, 4.5, Some(true)).await;
    let order = order::ActiveModel::new().insert(&db).await.unwrap();

    insert_item(&db, &order, &cheese, 2).await;
    insert_item(&db, &order, &recipes, 3).await;

    cheese.delete(&db).await.expect("delete product");

    assert_eq!(order.cart_total(&db).await.unwrap(), 13.5);
    // the orphaned line item still counts its units
    assert_eq!(order.cart_items(&db).await.unwrap(), 5);
    assert!(!order.shipping(&db).await.unwrap());
}

#[tokio::test]
async fn highest_bid_is_the_maximum_amount() {
    let db = setup().await;
    let creator = insert_user(&db, "alice").await;
    let bidder = insert_user(&db, "bob").await;
    let category = insert_category(&db, "Livestock").await;
    let auction = insert_auction(&db, &creator, &category, true).await;

    for cents in [3025, 4050, 5575] {
        bid::ActiveModel {
            auction_id: Set(auction.id),
            user_id: Set(bidder.id),
            amount: Set(Decimal::new(cents, 2)),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("insert bid");
    }

    let top = auction
        .highest_bid(&db)
        .await
        .unwrap()
        .expect("bids were placed");
    assert_eq!(top.amount, Decimal::new(5575, 2));
    assert_eq!(auction.bids(&db).await.unwrap().len(), 3);
}

#[tokio::test]
async fn bid_date_is_rewritten_on_every_save() {
    let db = setup().await;
    let creator = insert_user(&db, "alice").await;
    let bidder = insert_user(&db, "bob").await;
    let category = insert_category(&db, "Livestock").await;
    let auction = insert_auction(&db, &creator, &category, true).await;

    let stale = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let bid = bid::ActiveModel {
        auction_id: Set(auction.id),
        user_id: Set(bidder.id),
        amount: Set(Decimal::new(3000, 2)),
        date: Set(stale),
        ..Default::default()
    }
    .insert(&db)
    .await
    .expect("insert bid");

    // the caller-supplied timestamp is overridden on insert...
    assert!(bid.date > stale);
    let first_saved = bid.date;

    // ...and the stamp moves again when the row is amended
    let mut active: bid::ActiveModel = bid.into();
    active.amount = Set(Decimal::new(3550, 2));
    let bid = active.update(&db).await.expect("update bid");
    assert_eq!(bid.amount, Decimal::new(3550, 2));
    assert!(bid.date >= first_saved);
}
