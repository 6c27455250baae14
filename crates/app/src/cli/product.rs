use clap::{Args, Subcommand};
use dispatch_app::domain::products::{
    PgProductsService, ProductsService, data::NewProduct, records::ProductUuid,
};
use rust_decimal::Decimal;

#[derive(Debug, Args)]
pub(crate) struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductSubcommand {
    /// Add a product to the catalog
    Create(CreateProductArgs),

    /// Print every catalog product
    List(ListProductsArgs),
}

#[derive(Debug, Args)]
struct ListProductsArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

#[derive(Debug, Args)]
struct CreateProductArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[arg(long)]
    name: String,

    /// Unit price in major units, e.g. 10.50
    #[arg(long)]
    price: Decimal,
}

pub(crate) async fn run(command: ProductCommand) -> Result<(), String> {
    match command.command {
        ProductSubcommand::Create(args) => create(args).await,
        ProductSubcommand::List(args) => list(args).await,
    }
}

async fn create(args: CreateProductArgs) -> Result<(), String> {
    let service = PgProductsService::new(super::connect(&args.database_url).await?);

    let product = service
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            name: args.name,
            price: args.price,
        })
        .await
        .map_err(|error| format!("failed to create product: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("product_price: {}", product.price);

    Ok(())
}

async fn list(args: ListProductsArgs) -> Result<(), String> {
    let service = PgProductsService::new(super::connect(&args.database_url).await?);

    let products = service
        .list_products()
        .await
        .map_err(|error| format!("failed to list products: {error}"))?;

    for product in products {
        println!("{}\t{}\t{}", product.uuid, product.price, product.name);
    }

    Ok(())
}
