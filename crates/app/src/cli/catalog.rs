use apotheca::products::{ProductId, ProductSnapshot};
use apotheca_app::{api::ProductDraft, context::AppContext};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use crate::cli::format_amount;

/// Browse the cached product catalog
#[derive(Debug, Args)]
pub(crate) struct CatalogCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Debug, Subcommand)]
enum CatalogSubcommand {
    /// Fetch every active product from the backend
    Refresh,
    List(ListArgs),
    /// Show one cached product
    Show {
        /// Product identifier
        id: String,
    },
    Create(CreateArgs),
    /// Admin: set a product's stock
    Restock {
        /// Product identifier
        id: String,

        /// Units in stock
        stock: u32,
    },
    /// Admin: delete a product
    Delete {
        /// Product identifier
        id: String,
    },
}

/// Admin: create a product
#[derive(Debug, Args)]
pub(crate) struct CreateArgs {
    /// Product name
    #[arg(long)]
    name: String,

    /// Price in major units, e.g. 1250.50
    #[arg(long)]
    price: Decimal,

    /// Units in stock
    #[arg(long)]
    stock: u32,

    /// Category label
    #[arg(long)]
    category: String,

    /// Brand
    #[arg(long)]
    brand: Option<String>,
}

/// List cached products
#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    /// Only products in this category
    #[arg(long)]
    category: Option<String>,

    /// Only products whose name, brand or category contains this text
    #[arg(long)]
    search: Option<String>,

    /// Only products on promotion
    #[arg(long)]
    promotions: bool,
}

pub(crate) async fn run(ctx: &AppContext, command: CatalogCommand) -> Result<(), String> {
    match command.command {
        CatalogSubcommand::Refresh => {
            let count = ctx
                .products
                .refresh()
                .await
                .map_err(|error| error.user_message())?;

            println!("{count} products cached");

            Ok(())
        }
        CatalogSubcommand::List(args) => {
            list(ctx, &args);
            Ok(())
        }
        CatalogSubcommand::Show { id } => show(ctx, &id),
        CatalogSubcommand::Create(args) => create(ctx, args).await,
        CatalogSubcommand::Restock { id, stock } => restock(ctx, &id, stock).await,
        CatalogSubcommand::Delete { id } => {
            ctx.products
                .delete_product(&id)
                .await
                .map_err(|error| error.user_message())?;

            println!("deleted {id}");

            Ok(())
        }
    }
}

async fn create(ctx: &AppContext, args: CreateArgs) -> Result<(), String> {
    let price = apotheca::pricing::to_minor(args.price, ctx.settings.currency)
        .map_err(|error| error.to_string())?;

    let draft = ProductDraft::from_snapshot(
        &ProductSnapshot {
            id: ProductId::new(""),
            name: args.name,
            price,
            original_price: None,
            promotion_active: false,
            stock: args.stock,
            category: args.category,
            image_ref: String::new(),
            active: true,
            brand: args.brand,
            description: None,
        },
        ctx.settings.currency,
    )
    .map_err(|error| error.to_string())?;

    let created = ctx
        .products
        .create_product(&draft)
        .await
        .map_err(|error| error.user_message())?;

    println!("created {} ({})", created.id, created.name);

    Ok(())
}

async fn restock(ctx: &AppContext, id: &str, stock: u32) -> Result<(), String> {
    let product = ctx.products.find(id).map_err(|error| error.user_message())?;

    let draft = ProductDraft::from_snapshot(&product, ctx.settings.currency)
        .map_err(|error| error.to_string())?;

    let updated = ctx
        .products
        .update_product(id, &ProductDraft { stock, ..draft })
        .await
        .map_err(|error| error.user_message())?;

    println!("{} now has {} in stock", updated.name, updated.stock);

    Ok(())
}

fn list(ctx: &AppContext, args: &ListArgs) {
    let products = match (&args.category, &args.search) {
        (Some(category), _) => ctx.products.by_category(category),
        (None, Some(search)) => ctx.products.search(search),
        (None, None) if args.promotions => ctx.products.promotions(),
        (None, None) => ctx.products.filter(|_| true),
    };

    if ctx.products.last_refreshed().is_none() {
        println!("product cache is empty or was never refreshed; run `apotheca catalog refresh`");
    }

    for product in products
        .iter()
        .filter(|product| !args.promotions || product.is_on_promotion())
    {
        println!(
            "{}\t{}\t{}\tstock {}",
            product.id,
            product.name,
            format_amount(ctx, product.price),
            product.stock
        );
    }
}

fn show(ctx: &AppContext, id: &str) -> Result<(), String> {
    let product = ctx.products.find(id).map_err(|error| error.user_message())?;

    println!("id: {}", product.id);
    println!("name: {}", product.name);
    println!("category: {}", product.category);
    println!("price: {}", format_amount(ctx, product.price));

    if let (Some(original), Some(percent)) = (product.original_price, product.discount_percent())
    {
        println!("was: {} (-{percent}%)", format_amount(ctx, original));
    }

    println!("stock: {}", product.stock);

    if let Some(brand) = &product.brand {
        println!("brand: {brand}");
    }

    Ok(())
}
