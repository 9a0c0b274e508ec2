//! Apotheca storefront CLI

use std::process;

use clap::Parser;

mod cli;
mod observability;

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        eprintln!("failed to initialise logging: {error}");
    }

    if let Err(error) = cli.run().await {
        eprintln!("{error}");
        process::exit(1);
    }
}
