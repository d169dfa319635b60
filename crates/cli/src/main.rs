//! Cookie Shop CLI - favorites, cart and catalog from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! shop-cli products list --search oat
//!
//! # Save a favorite as a guest, then sign in to push it to the server
//! shop-cli favorites add 12
//! shop-cli login --email ann@example.com --password "$PASSWORD"
//!
//! # Signed-in favorites
//! shop-cli favorites toggle 12
//! shop-cli favorites list --force
//!
//! # Order the cart
//! shop-cli cart add 12
//! shop-cli checkout --recipient "Ann" --address "1 Oven Lane"
//! shop-cli orders
//! ```
//!
//! # Environment Variables
//!
//! - `COOKIE_SHOP_API_URL` - Backend base URL (default `http://localhost:8081/api`)
//! - `COOKIE_SHOP_TIMEOUT_SECS` - Request timeout in seconds (default 10)
//! - `COOKIE_SHOP_DATA_DIR` - Directory for local storage (default `.cookie-shop`)
//! - `SENTRY_DSN` - Enables Sentry error reporting when set
//! - `RUST_LOG` - Log filter (default `cookie_shop_client=info,cookie_shop_cli=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cookie_shop_client::auth::RegisterRequest;
use cookie_shop_client::orders::OrderDetails;
use cookie_shop_client::{ClientConfig, ClientError, ShopContext};
use cookie_shop_core::Price;

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Cookie Shop CLI")]
struct Cli {
    /// Override `COOKIE_SHOP_API_URL`
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Override `COOKIE_SHOP_DATA_DIR`
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and sync guest favorites to the server
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        full_name: String,
    },
    /// Forget credentials
    Logout,
    /// Show session and local storage summary
    Status,
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Order everything in the cart (requires sign-in)
    Checkout {
        #[arg(long)]
        recipient: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        comment: Option<String>,

        /// e.g. CARD or CASH
        #[arg(long)]
        payment_method: Option<String>,

        #[arg(long)]
        promo_code: Option<String>,

        /// Tip in whole currency units
        #[arg(long)]
        tip: Option<u32>,
    },
    /// List your orders (requires sign-in)
    Orders,
    /// Suggest a new product (requires sign-in)
    Suggest {
        #[arg(long)]
        author: String,

        #[arg(long)]
        product: String,

        #[arg(long)]
        description: String,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one product
    Show { id: i64 },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorites
    List {
        /// Reload from the server; an empty server list clears the cache
        #[arg(short, long)]
        force: bool,
    },
    /// Favorite or unfavorite a product (requires sign-in)
    Toggle { product_id: i64 },
    /// Save a product to guest favorites
    Add { product_id: i64 },
    /// Remove a favorite by the id shown in `favorites list`
    Remove {
        #[arg(allow_hyphen_values = true)]
        id: i64,
    },
    /// Remove every favorite
    Clear,
    /// Push guest favorites to the server
    Sync,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    List,
    /// Add a product with quantity 1
    Add { product_id: i64 },
    /// Remove a product
    Remove { product_id: i64 },
    /// Increase quantity by one
    Inc { product_id: i64 },
    /// Decrease quantity by one (minimum 1)
    Dec { product_id: i64 },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cookie_shop_client=info,cookie_shop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

fn load_config(cli: &Cli) -> Result<ClientConfig, ClientError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config.api_url = ClientConfig::for_api_url(api_url)?.api_url;
    }
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir.clone_from(data_dir);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: ClientConfig) -> Result<(), ClientError> {
    let context = ShopContext::new(config)?;

    match command {
        Commands::Login { email, password } => {
            commands::session::login(&context, email, password).await?;
        }
        Commands::Register {
            username,
            email,
            password,
            full_name,
        } => {
            let request = RegisterRequest {
                username,
                email,
                password,
                full_name,
            };
            commands::session::register(&context, request).await?;
        }
        Commands::Logout => commands::session::logout(&context).await?,
        Commands::Status => commands::session::status(&context).await?,
        Commands::Products { action } => match action {
            ProductsAction::List { search } => {
                commands::products::list(&context, search.as_deref()).await?;
            }
            ProductsAction::Show { id } => commands::products::show(&context, id).await?,
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List { force } => commands::favorites::list(&context, force).await,
            FavoritesAction::Toggle { product_id } => {
                commands::favorites::toggle(&context, product_id).await?;
            }
            FavoritesAction::Add { product_id } => {
                commands::favorites::add(&context, product_id).await?;
            }
            FavoritesAction::Remove { id } => commands::favorites::remove(&context, id).await?,
            FavoritesAction::Clear => commands::favorites::clear(&context).await?,
            FavoritesAction::Sync => commands::favorites::sync(&context).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::List => commands::cart::list(&context).await,
            CartAction::Add { product_id } => commands::cart::add(&context, product_id).await?,
            CartAction::Remove { product_id } => {
                commands::cart::remove(&context, product_id).await?;
            }
            CartAction::Inc { product_id } => {
                commands::cart::increase(&context, product_id).await?;
            }
            CartAction::Dec { product_id } => {
                commands::cart::decrease(&context, product_id).await?;
            }
        },
        Commands::Checkout {
            recipient,
            address,
            comment,
            payment_method,
            promo_code,
            tip,
        } => {
            let details = OrderDetails {
                recipient,
                address,
                comment,
                payment_method,
                promo_code,
                tip: tip.map(|units| Price::from_units(i64::from(units))),
            };
            commands::orders::checkout(&context, details).await?;
        }
        Commands::Orders => commands::orders::list(&context).await?,
        Commands::Suggest {
            author,
            product,
            description,
        } => commands::suggest::submit(&context, author, product, description).await?,
    }
    Ok(())
}
