use sea_orm::{
    sea_query::Table, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait,
    Schema, Statement, TransactionTrait,
};
use tracing::info;

pub mod auction;
pub mod auction_watcher;
pub mod bid;
pub mod category;
pub mod comment;
pub mod image;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_watcher;
pub mod shipping_address;
pub mod user;

async fn drop_table<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let schema = Schema::new(db.get_database_backend());
    let create_stmt = schema.create_table_from_entity(entity);
    let mut drop_stmt = Table::drop();
    drop_stmt.if_exists().table(
        create_stmt
            .get_table_name()
            .expect("entity has a table name")
            .clone(),
    );
    db.execute(db.get_database_backend().build(&drop_stmt))
        .await?;
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let create_stmt = backend.build(&schema.create_table_from_entity(entity));

    if backend == DatabaseBackend::Postgres {
        // for crdb
        let txn = db.begin().await?;
        let serial_normalization = Statement::from_string(
            DatabaseBackend::Postgres,
            "set local serial_normalization = sql_sequence;".to_owned(),
        );
        txn.execute(serial_normalization).await?;
        txn.execute(create_stmt).await?;
        txn.commit().await?;
    } else {
        db.execute(create_stmt).await?;
    }
    info!("{} table created", entity.table_name());
    Ok(())
}

/// Drops and recreates every table, foreign keys included. Tables are
/// dropped children-first and created parents-first so the FK clauses are
/// valid against backends that check them at DDL time.
pub async fn schema_setup(db: &DatabaseConnection) -> Result<(), DbErr> {
    drop_table(db, shipping_address::Entity).await?;
    drop_table(db, order_item::Entity).await?;
    drop_table(db, order::Entity).await?;
    drop_table(db, product_watcher::Entity).await?;
    drop_table(db, product::Entity).await?;
    drop_table(db, comment::Entity).await?;
    drop_table(db, bid::Entity).await?;
    drop_table(db, image::Entity).await?;
    drop_table(db, auction_watcher::Entity).await?;
    drop_table(db, auction::Entity).await?;
    drop_table(db, category::Entity).await?;
    drop_table(db, user::Entity).await?;

    create_table(db, user::Entity).await?;
    create_table(db, category::Entity).await?;
    create_table(db, auction::Entity).await?;
    create_table(db, auction_watcher::Entity).await?;
    create_table(db, image::Entity).await?;
    create_table(db, bid::Entity).await?;
    create_table(db, comment::Entity).await?;
    create_table(db, product::Entity).await?;
    create_table(db, product_watcher::Entity).await?;
    create_table(db, order::Entity).await?;
    create_table(db, order_item::Entity).await?;
    create_table(db, shipping_address::Entity).await?;
    Ok(())
}
