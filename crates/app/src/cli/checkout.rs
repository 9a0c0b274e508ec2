use apotheca::{
    orders::{CustomerContact, OrderDetails, ShippingAddress},
    validation::Adjustment,
};
use apotheca_app::{context::AppContext, domain::checkout::CheckoutOutcome};
use clap::Args;

/// Place an order for the current cart
#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Full name
    #[arg(long)]
    name: String,

    /// Phone number
    #[arg(long)]
    phone: String,

    /// Email address
    #[arg(long)]
    email: Option<String>,

    /// Street address
    #[arg(long)]
    address: String,

    /// City
    #[arg(long)]
    city: String,

    /// Region or province
    #[arg(long)]
    region: Option<String>,

    /// Postal code
    #[arg(long)]
    postal_code: Option<String>,

    /// Delivery notes
    #[arg(long)]
    notes: Option<String>,
}

impl From<CheckoutArgs> for OrderDetails {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            customer: CustomerContact {
                name: args.name,
                email: args.email,
                phone: args.phone,
            },
            shipping_address: ShippingAddress {
                address: args.address,
                city: args.city,
                region: args.region,
                postal_code: args.postal_code,
            },
            notes: args.notes,
        }
    }
}

pub(crate) async fn run(ctx: &AppContext, args: CheckoutArgs) -> Result<(), String> {
    let outcome = ctx
        .checkout
        .submit(args.into())
        .await
        .map_err(|error| error.user_message())?;

    match outcome {
        CheckoutOutcome::Placed(confirmation) => {
            println!("order placed: {}", confirmation.reference());
            Ok(())
        }
        CheckoutOutcome::NeedsReview(adjustments) => {
            println!("stock changed since these items were added:");

            for adjustment in &adjustments {
                match adjustment {
                    Adjustment::Removed { product_id, .. } => {
                        println!("  {product_id}: removed, no longer available");
                    }
                    Adjustment::QuantityReduced {
                        product_id,
                        from,
                        to,
                    } => println!("  {product_id}: quantity reduced from {from} to {to}"),
                }
            }

            Err("review your cart and check out again".to_string())
        }
    }
}
