use apotheca_app::{config::AppConfig, context::AppContext};
use clap::{Parser, Subcommand};

mod account;
mod cart;
mod catalog;
mod checkout;

#[derive(Debug, Parser)]
#[command(name = "apotheca", about = "Apotheca storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check the backend is reachable
    Health,
    Login(account::LoginArgs),
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
    Catalog(catalog::CatalogCommand),
    Cart(cart::CartCommand),
    Checkout(checkout::CheckoutArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let ctx = AppContext::from_config(&self.config)
            .map_err(|error| format!("failed to start: {error}"))?;

        match self.command {
            Commands::Health => health(&ctx).await,
            Commands::Login(args) => account::login(&ctx, &args).await,
            Commands::Logout => account::logout(&ctx),
            Commands::Whoami => {
                account::whoami(&ctx);
                Ok(())
            }
            Commands::Catalog(command) => catalog::run(&ctx, command).await,
            Commands::Cart(command) => cart::run(&ctx, command),
            Commands::Checkout(args) => checkout::run(&ctx, args).await,
        }
    }
}

async fn health(ctx: &AppContext) -> Result<(), String> {
    let status = ctx
        .api
        .health()
        .await
        .map_err(|error| error.user_message())?;

    println!("status: {}", status.status);

    if let Some(message) = status.message {
        println!("message: {message}");
    }

    Ok(())
}

/// Format minor units in the store currency.
pub(crate) fn format_amount(ctx: &AppContext, amount: u64) -> String {
    apotheca::pricing::money(amount, ctx.settings.currency)
        .map_or_else(|_| amount.to_string(), |money| money.to_string())
}
