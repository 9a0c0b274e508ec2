use apotheca_app::context::AppContext;
use clap::{Args, Subcommand};

use crate::cli::format_amount;

/// Manage the local cart
#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Add units of a cached product
    Add {
        /// Product identifier
        id: String,

        /// Units to add
        #[arg(default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity; 0 removes it
    Set {
        /// Product identifier
        id: String,

        /// New quantity
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Product identifier
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Show the cart and its totals
    Show,
}

pub(crate) fn run(ctx: &AppContext, command: CartCommand) -> Result<(), String> {
    match command.command {
        CartSubcommand::Add { id, quantity } => {
            let line = ctx
                .carts
                .add_line(&id, quantity)
                .map_err(|error| error.user_message())?;

            println!("{} x{}", line.name, line.quantity);
        }
        CartSubcommand::Set { id, quantity } => ctx
            .carts
            .set_quantity(&id, quantity)
            .map_err(|error| error.user_message())?,
        CartSubcommand::Remove { id } => {
            ctx.carts
                .remove_line(&id)
                .map_err(|error| error.user_message())?;
        }
        CartSubcommand::Clear => ctx.carts.clear().map_err(|error| error.user_message())?,
        CartSubcommand::Show => {}
    }

    show(ctx)
}

fn show(ctx: &AppContext) -> Result<(), String> {
    let cart = ctx.carts.snapshot();

    if cart.is_empty() {
        println!("cart is empty");
        return Ok(());
    }

    for line in cart.lines() {
        println!(
            "{}\t{}\tx{}\t{}",
            line.product_id,
            line.name,
            line.quantity,
            format_amount(ctx, line.line_total().unwrap_or_default())
        );
    }

    let totals = ctx.carts.totals().map_err(|error| error.user_message())?;

    println!("subtotal: {}", format_amount(ctx, totals.subtotal));
    println!("shipping: {}", format_amount(ctx, totals.shipping_cost));
    println!("total: {}", format_amount(ctx, totals.total));

    if let Some(remaining) = ctx
        .carts
        .policy()
        .remaining_for_free_shipping(totals.subtotal)
    {
        println!(
            "add {} more for free shipping",
            format_amount(ctx, remaining)
        );
    }

    Ok(())
}
