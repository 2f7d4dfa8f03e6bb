use std::{future::Future, pin::Pin, sync::Arc};

use anyhow::{Context, Result};
use fakeit::{address, contact, hipster, name};
use futures::future::join_all;
use rand::{thread_rng, Rng};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, Set,
    TransactionTrait,
};
use tracing::info;

use crate::entity::{
    self, auction, auction_watcher, bid, category, comment, image, order, order_item, product,
    product_watcher, shipping_address, user,
};

const CATEGORY_NAMES: [&str; 8] = [
    "Vegetables",
    "Fruit",
    "Dairy",
    "Grains",
    "Livestock",
    "Equipment",
    "Flowers",
    "Honey",
];

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub user_count: u32,
    pub auction_count: u32,
    pub product_count: u32,
    pub order_count: u32,
    pub txn_size: u32,
    pub concurrent: u32,
}

/// Recreates the schema and fills it with plausible demo rows. This is the
/// kind of caller the entity layer expects: it validates amounts itself and
/// keeps `current_bid` in step with the bids it places, inside the same
/// transaction as the bid row.
pub async fn execute(db: &DatabaseConnection, config: Config) -> Result<()> {
    entity::schema_setup(db)
        .await
        .context("Failed to setup schema")?;
    insert_categories(db)
        .await
        .context("Failed to insert categories")?;
    insert_users(db, &config)
        .await
        .context("Failed to insert users")?;
    insert_auctions(db, &config)
        .await
        .context("Failed to insert auctions")?;
    insert_products(db, &config)
        .await
        .context("Failed to insert products")?;
    insert_orders(db, &config)
        .await
        .context("Failed to insert orders")?;
    Ok(())
}

async fn insert_categories(db: &DatabaseConnection) -> Result<()> {
    for category_name in CATEGORY_NAMES {
        category::ActiveModel {
            name: Set(category_name.to_owned()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    info!("{} categories inserted", CATEGORY_NAMES.len());
    Ok(())
}

async fn insert_users(db: &DatabaseConnection, config: &Config) -> Result<()> {
    batch_exec(
        db,
        config.user_count,
        config.txn_size,
        config.concurrent,
        |txn| {
            Box::pin(async move {
                fake_user().insert(txn).await?;
                Ok(())
            })
        },
    )
    .await?;
    info!("{} users inserted", config.user_count);
    Ok(())
}

async fn insert_auctions(db: &DatabaseConnection, config: &Config) -> Result<()> {
    let users = Arc::new(user_ids(db).await?);
    let categories = Arc::new(category_ids(db).await?);
    if users.is_empty() || categories.is_empty() {
        return Ok(());
    }
    batch_exec(
        db,
        config.auction_count,
        config.txn_size,
        config.concurrent,
        move |txn| {
            let users = Arc::clone(&users);
            let categories = Arc::clone(&categories);
            Box::pin(async move {
                let plan = AuctionPlan::random(&users, &categories);

                let mut active = auction::ActiveModel::new();
                active.title = Set(plan.title);
                active.description = Set(Some(plan.description));
                active.creator_id = Set(plan.creator_id);
                active.category_id = Set(plan.category_id);
                active.starting_bid = Set(plan.starting_bid);
                active.active = Set(plan.active);
                let inserted = active.insert(txn).await?;
                let auction_id = inserted.id;

                for n in 0..plan.image_count {
                    image::ActiveModel {
                        auction_id: Set(auction_id),
                        image: Set(format!("images/auction-{}-{}.jpg", auction_id, n)),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                }
                for (bidder_id, amount) in &plan.bids {
                    bid::ActiveModel {
                        auction_id: Set(auction_id),
                        user_id: Set(*bidder_id),
                        amount: Set(*amount),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                }
                for (author_id, text) in plan.comments {
                    let mut active = comment::ActiveModel::new();
                    active.user_id = Set(author_id);
                    active.auction_id = Set(auction_id);
                    active.comment = Set(text);
                    active.insert(txn).await?;
                }
                for watcher_id in plan.watchers {
                    auction_watcher::ActiveModel {
                        auction_id: Set(auction_id),
                        user_id: Set(watcher_id),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                }
                // bids were generated strictly increasing, so the last one is
                // the price to show
                if let Some(top) = plan.bids.last().map(|(_, amount)| *amount) {
                    let mut active: auction::ActiveModel = inserted.into();
                    active.current_bid = Set(Some(top));
                    active.update(txn).await?;
                }
                Ok(())
            })
        },
    )
    .await?;
    info!("{} auctions inserted", config.auction_count);
    Ok(())
}

async fn insert_products(db: &DatabaseConnection, config: &Config) -> Result<()> {
    let users = Arc::new(user_ids(db).await?);
    let categories = Arc::new(category_ids(db).await?);
    if users.is_empty() || categories.is_empty() {
        return Ok(());
    }
    batch_exec(
        db,
        config.product_count,
        config.txn_size,
        config.concurrent,
        move |txn| {
            let users = Arc::clone(&users);
            let categories = Arc::clone(&categories);
            Box::pin(async move {
                let plan = ProductPlan::random(&users, &categories);

                let mut active = product::ActiveModel::new();
                active.name = Set(plan.name);
                active.description = Set(Some(plan.description));
                active.creator_id = Set(plan.creator_id);
                active.category_id = Set(plan.category_id);
                active.quantity = Set(plan.quantity);
                active.price = Set(plan.price);
                active.digital = Set(Some(plan.digital));
                active.image = Set(plan.image);
                let inserted = active.insert(txn).await?;

                for watcher_id in plan.watchers {
                    product_watcher::ActiveModel {
                        product_id: Set(inserted.id),
                        user_id: Set(watcher_id),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                }
                Ok(())
            })
        },
    )
    .await?;
    info!("{} products inserted", config.product_count);
    Ok(())
}

async fn insert_orders(db: &DatabaseConnection, config: &Config) -> Result<()> {
    let users = Arc::new(user_ids(db).await?);
    let products = Arc::new(
        product::Entity::find()
            .all(db)
            .await?
            .iter()
            .map(|p| p.id)
            .collect::<Vec<_>>(),
    );
    if users.is_empty() || products.is_empty() {
        return Ok(());
    }
    batch_exec(
        db,
        config.order_count,
        config.txn_size,
        config.concurrent,
        move |txn| {
            let users = Arc::clone(&users);
            let products = Arc::clone(&products);
            Box::pin(async move {
                let plan = OrderPlan::random(&users, &products);

                let mut active = order::ActiveModel::new();
                active.customer_id = Set(plan.customer_id);
                active.complete = Set(plan.complete);
                active.transaction_id = Set(Some(plan.transaction_id));
                let inserted = active.insert(txn).await?;

                for (product_id, quantity) in plan.items {
                    let mut active = order_item::ActiveModel::new();
                    active.product_id = Set(Some(product_id));
                    active.order_id = Set(Some(inserted.id));
                    active.quantity = Set(quantity);
                    active.insert(txn).await?;
                }
                if inserted.shipping(txn).await? {
                    let mut active = shipping_address::ActiveModel::new();
                    active.customer_id = Set(inserted.customer_id);
                    active.order_id = Set(Some(inserted.id));
                    active.address = Set(address::street());
                    active.city = Set(address::city());
                    active.state = Set(address::state());
                    active.zipcode = Set(address::zip());
                    active.insert(txn).await?;
                }
                Ok(())
            })
        },
    )
    .await?;
    info!("{} orders inserted", config.order_count);
    Ok(())
}

fn fake_user() -> user::ActiveModel {
    let mut rng = thread_rng();
    let first = name::first();
    let last = name::last();
    let mut active = user::ActiveModel::new();
    active.username = Set(format!("{}_{:08x}", first.to_lowercase(), rng.gen::<u32>()));
    active.email = Set(contact::email());
    active.password = Set(format!("{:032x}", rng.gen::<u128>()));
    active.first_name = Set(first);
    active.last_name = Set(last);
    active.is_farmer = Set(rng.gen_bool(0.5));
    active
}

struct AuctionPlan {
    creator_id: i64,
    category_id: i64,
    title: String,
    description: String,
    starting_bid: Decimal,
    active: bool,
    image_count: u32,
    bids: Vec<(i64, Decimal)>,
    comments: Vec<(i64, String)>,
    watchers: Vec<i64>,
}

impl AuctionPlan {
    fn random(users: &[i64], categories: &[i64]) -> Self {
        let mut rng = thread_rng();
        let starting_bid = Decimal::new(rng.gen_range(100..50_000), 2);
        let mut bids = Vec::new();
        let mut amount = starting_bid;
        if rng.gen_bool(0.6) {
            for _ in 0..rng.gen_range(1..5) {
                amount += Decimal::new(rng.gen_range(50..5_000), 2);
                bids.push((pick(&mut rng, users), amount));
            }
        }
        let comments = (0..rng.gen_range(0..3))
            .map(|_| (pick(&mut rng, users), hipster::sentence(12)))
            .collect();
        let watcher_count = rng.gen_range(0..4);
        let watchers = distinct_picks(&mut rng, users, watcher_count);
        Self {
            creator_id: pick(&mut rng, users),
            category_id: pick(&mut rng, categories),
            title: hipster::sentence(4),
            description: hipster::sentence(30),
            starting_bid,
            active: rng.gen_bool(0.8),
            image_count: rng.gen_range(0..3),
            bids,
            comments,
            watchers,
        }
    }
}

struct ProductPlan {
    creator_id: i64,
    category_id: i64,
    name: String,
    description: String,
    quantity: i32,
    price: f64,
    digital: bool,
    image: Option<String>,
    watchers: Vec<i64>,
}

impl ProductPlan {
    fn random(users: &[i64], categories: &[i64]) -> Self {
        let mut rng = thread_rng();
        let image = if rng.gen_bool(0.7) {
            Some(format!("images/product-{:08x}.jpg", rng.gen::<u32>()))
        } else {
            None
        };
        let watcher_count = rng.gen_range(0..4);
        Self {
            creator_id: pick(&mut rng, users),
            category_id: pick(&mut rng, categories),
            name: hipster::sentence(3),
            description: hipster::sentence(20),
            quantity: rng.gen_range(1..100),
            price: f64::from(rng.gen_range(100..50_000)) / 100.0,
            digital: rng.gen_bool(0.3),
            image,
            watchers: distinct_picks(&mut rng, users, watcher_count),
        }
    }
}

struct OrderPlan {
    customer_id: Option<i64>,
    complete: bool,
    transaction_id: String,
    items: Vec<(i64, i32)>,
}

impl OrderPlan {
    fn random(users: &[i64], products: &[i64]) -> Self {
        let mut rng = thread_rng();
        let items = (0..rng.gen_range(1..4))
            .map(|_| (pick(&mut rng, products), rng.gen_range(1..10)))
            .collect();
        Self {
            customer_id: rng.gen_bool(0.9).then(|| pick(&mut rng, users)),
            complete: rng.gen_bool(0.7),
            transaction_id: format!("{:016x}", rng.gen::<u64>()),
            items,
        }
    }
}

fn pick<R: Rng>(rng: &mut R, ids: &[i64]) -> i64 {
    ids[rng.gen_range(0..ids.len())]
}

fn distinct_picks<R: Rng>(rng: &mut R, ids: &[i64], count: usize) -> Vec<i64> {
    let mut picks = Vec::with_capacity(count);
    for _ in 0..count {
        let id = pick(rng, ids);
        if !picks.contains(&id) {
            picks.push(id);
        }
    }
    picks
}

async fn user_ids(db: &DatabaseConnection) -> Result<Vec<i64>, DbErr> {
    Ok(user::Entity::find()
        .all(db)
        .await?
        .iter()
        .map(|u| u.id)
        .collect())
}

async fn category_ids(db: &DatabaseConnection) -> Result<Vec<i64>, DbErr> {
    Ok(category::Entity::find()
        .all(db)
        .await?
        .iter()
        .map(|c| c.id)
        .collect())
}

async fn batch_exec<F>(
    db: &DatabaseConnection,
    count: u32,
    txn_size_limit: u32,
    concurrent: u32,
    callback: F,
) -> Result<()>
where
    F: for<'c> Fn(
            &'c DatabaseTransaction,
        )
            -> Pin<Box<dyn Future<Output = std::result::Result<(), DbErr>> + Send + 'c>>
        + Send
        + Sync
        + Clone
        + 'static,
{
    let mut join_handle_vec = Vec::new();
    for i in 0..concurrent {
        let db = db.clone();
        let callback = callback.clone();
        let handle = tokio::spawn(async move {
            let mut unit_count = count / concurrent;
            if i == concurrent - 1 {
                unit_count += count - (unit_count * concurrent);
            }
            while unit_count > 0 {
                let txn_size = txn_size_limit.min(unit_count);
                unit_count -= txn_size;
                let callback = callback.clone();
                let result = db
                    .transaction::<_, (), DbErr>(move |txn| {
                        Box::pin(async move {
                            for _ in 0..txn_size {
                                callback(txn).await?;
                            }
                            Ok(())
                        })
                    })
                    .await;
                if result.is_err() {
                    return result;
                }
            }
            Ok(())
        });
        join_handle_vec.push(handle);
    }
    let join_result = join_all(join_handle_vec).await;
    for handle in join_result {
        handle??;
    }
    Ok(())
}
