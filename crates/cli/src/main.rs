//! Shopfront CLI - browse the catalog, manage the cart and administer products.
//!
//! # Usage
//!
//! ```bash
//! # Browse with filters
//! shopfront products --category Tea --min-rating 4 --page 2
//!
//! # Sign in (password from SHOPFRONT_PASSWORD if -p is omitted)
//! shopfront login -u alice
//!
//! # Cart
//! shopfront cart add 12
//! shopfront cart dec 3
//!
//! # Product admin (superusers only)
//! shopfront admin create --name "Green Tea" --price 4.50 --category Tea --rating 4.2
//! ```
//!
//! # Commands
//!
//! - `products`, `categories` - Catalog
//! - `login`, `logout`, `signup`, `whoami` - Session
//! - `cart` - Show and change line items
//! - `admin` - Create, edit and delete products

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopfront_core::{CartItemId, ProductId};
use shopfront_storefront::{Storefront, StorefrontConfig};

mod commands;
mod render;

use commands::CliError;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, optionally filtered and paginated
    Products {
        /// Exact category label
        #[arg(long)]
        category: Option<String>,

        /// Minimum price (inclusive)
        #[arg(long)]
        min_price: Option<String>,

        /// Maximum price (inclusive)
        #[arg(long)]
        max_price: Option<String>,

        /// Minimum rating (inclusive)
        #[arg(long)]
        min_rating: Option<String>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Products per page
        #[arg(long, default_value_t = 12)]
        per_page: usize,
    },
    /// List product categories
    Categories,
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Create an account
    Signup {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Show the signed-in user and cart size
    Whoami,
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Manage products (superusers only)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show line items and the total
    Show,
    /// Add one unit of a product
    Add { product_id: ProductId },
    /// Raise a line item's quantity by one
    Inc { item_id: CartItemId },
    /// Lower a line item's quantity by one
    Dec { item_id: CartItemId },
    /// Set a line item's quantity
    Set {
        item_id: CartItemId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line item
    Remove { item_id: CartItemId },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a product
    Create {
        #[command(flatten)]
        fields: commands::admin::ProductFields,
    },
    /// Edit a product; omitted fields keep their current value
    Edit {
        id: ProductId,
        #[command(flatten)]
        fields: commands::admin::ProductFields,
    },
    /// Delete a product
    Delete { id: ProductId },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Map tracing levels to Sentry: warnings and errors become events, the rest breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

/// Report a failed command and turn the result into the exit status.
///
/// The Sentry guard is dropped here so captured events are flushed before
/// the process ends.
fn finish(
    result: Result<(), CliError>,
    sentry_guard: Option<sentry::ClientInitGuard>,
) -> ExitCode {
    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            ExitCode::FAILURE
        }
    };
    drop(sentry_guard);
    code
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = StorefrontConfig::from_env();
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Quiet by default: command output goes to stdout, diagnostics to stderr
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront=warn,shopfront_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(CliError::from(shopfront_storefront::StorefrontError::from(e))),
    };

    finish(result, sentry_guard)
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let storefront = Storefront::from_config(config)?;

    match cli.command {
        Commands::Products {
            category,
            min_price,
            max_price,
            min_rating,
            page,
            per_page,
        } => {
            let filters = commands::products::FilterArgs {
                category,
                min_price,
                max_price,
                min_rating,
            };
            commands::products::list(&storefront, &filters, page, per_page).await?;
        }
        Commands::Categories => commands::products::categories(&storefront).await?,
        Commands::Login { username, password } => {
            commands::auth::login(&storefront, &username, password).await?;
        }
        Commands::Logout => commands::auth::logout(&storefront).await?,
        Commands::Signup {
            username,
            email,
            password,
        } => commands::auth::signup(&storefront, &username, &email, &password).await?,
        Commands::Whoami => commands::auth::whoami(&storefront).await?,
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(&storefront).await?,
            CartAction::Add { product_id } => commands::cart::add(&storefront, product_id).await?,
            CartAction::Inc { item_id } => commands::cart::increment(&storefront, item_id).await?,
            CartAction::Dec { item_id } => commands::cart::decrement(&storefront, item_id).await?,
            CartAction::Set { item_id, quantity } => {
                commands::cart::set_quantity(&storefront, item_id, quantity).await?;
            }
            CartAction::Remove { item_id } => commands::cart::remove(&storefront, item_id).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Create { fields } => commands::admin::create(&storefront, &fields).await?,
            AdminAction::Edit { id, fields } => {
                commands::admin::edit(&storefront, id, &fields).await?;
            }
            AdminAction::Delete { id } => commands::admin::delete(&storefront, id).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use shopfront_storefront::StorefrontError;
    use shopfront_storefront::api::ApiError;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_failure_is_captured_before_exit() {
        let transport = sentry::test::TestTransport::new();
        let guard = sentry::init(sentry::ClientOptions {
            dsn: Some("https://public@sentry.invalid/1".parse().unwrap()),
            transport: Some(std::sync::Arc::new(transport.clone())),
            ..Default::default()
        });
        let error = StorefrontError::Api(ApiError::Api {
            status: 500,
            message: None,
        });

        let code = finish(Err(CliError::from(error)), Some(guard));

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(transport.fetch_and_clear_events().len(), 1);
    }

    #[test]
    fn test_success_exits_zero() {
        assert_eq!(finish(Ok(()), None), ExitCode::SUCCESS);
    }

    #[test]
    fn test_negative_quantity_parses() {
        let cli = Cli::try_parse_from(["shopfront", "cart", "set", "3", "-1"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: Some(CartAction::Set { quantity: -1, .. })
            })
        ));
    }
}
