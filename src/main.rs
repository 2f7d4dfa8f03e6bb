use clap::{Parser, Subcommand};
use farm_market::{entity, seed};
use sea_orm::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Maintenance CLI for the marketplace schema: recreate the tables or fill
/// them with demo data.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: SubCommandArgs,
    #[clap(short = 'u', long)]
    db_url: String,
    #[clap(short = 's', long, default_value = "1024")]
    txn_size: u32,
    #[clap(short = 'c', long, default_value = "4")]
    concurrent: u32,
}

#[derive(Subcommand, Debug)]
enum SubCommandArgs {
    /// Drop and recreate every table.
    Setup,
    /// Recreate the tables and insert demo rows.
    Seed {
        #[clap(long, default_value = "100")]
        user_count: u32,
        #[clap(long, default_value = "200")]
        auction_count: u32,
        #[clap(long, default_value = "200")]
        product_count: u32,
        #[clap(long, default_value = "100")]
        order_count: u32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("farm_market=info".parse().expect("valid directive")),
        )
        .init();
    let args = Args::parse();
    let db = Database::connect(&args.db_url)
        .await
        .expect("Failed to connect to database");
    match args.command {
        SubCommandArgs::Setup => {
            entity::schema_setup(&db).await.expect("Failed to setup schema");
            info!("schema ready");
        }
        SubCommandArgs::Seed {
            user_count,
            auction_count,
            product_count,
            order_count,
        } => {
            let config = seed::Config {
                user_count,
                auction_count,
                product_count,
                order_count,
                txn_size: args.txn_size,
                concurrent: args.concurrent,
            };
            seed::execute(&db, config).await.expect("Failed to seed demo data");
        }
    }
}
