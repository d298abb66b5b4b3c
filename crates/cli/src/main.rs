//! Products Plus CLI - browse the catalog, manage the cart and check out.
//!
//! # Usage
//!
//! ```bash
//! # Browse and search the catalog
//! pp-cli products list --category men
//! pp-cli products search backpack
//! pp-cli products show 1
//!
//! # Log in; the session is kept in the data directory
//! pp-cli login -u johnd -p secret123
//!
//! # Manage the cart
//! pp-cli cart add 1 -q 2
//! pp-cli cart update 1 3
//! pp-cli cart remove 1
//! pp-cli cart show
//!
//! # Check out
//! pp-cli checkout --name "John Doe" --email john@mail.com --address "1 Main St"
//! ```
//!
//! Configuration comes from the environment (see `StorefrontConfig`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use products_plus_core::ProductId;
use products_plus_storefront::api::Category;
use products_plus_storefront::config::StorefrontConfig;
use products_plus_storefront::error::AppError;
use products_plus_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "pp-cli")]
#[command(author, version, about = "Products Plus storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Log in and load the remote cart
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,

        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,
    },
    /// Log out and discard the session
    Logout,
    /// Show or delete the logged-in account
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Pay for the cart
    Checkout {
        /// Full name
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Shipping address
        #[arg(long)]
        address: String,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Category (electronics, jewelery, men, women)
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Search product titles
    Search {
        query: String,

        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Show one product
    Show { id: ProductId },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show email and username
    Show,
    /// Delete the account and log out
    Delete {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        id: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Set the quantity of a cart line (out-of-range values are clamped)
    Update {
        id: ProductId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product
    Remove { id: ProductId },
    /// Remove everything
    Clear,
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

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::error(&AppError::from(e).user_message());
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "products_plus_storefront=info,pp_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            output::error(&e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List { category } => commands::products::list(&state, category).await,
            ProductsAction::Search { query, category } => {
                commands::products::search(&state, &query, category).await
            }
            ProductsAction::Show { id } => commands::products::show(&state, id).await,
        },
        Commands::Login { username, password } => {
            commands::account::login(&state, &username, &password).await
        }
        Commands::Signup {
            email,
            username,
            password,
            first_name,
            last_name,
        } => {
            let form = products_plus_storefront::services::auth::SignupForm {
                email,
                username,
                password,
                first_name,
                last_name,
            };
            commands::account::signup(&state, &form).await
        }
        Commands::Logout => commands::account::logout(&state).await,
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::account::profile(&state).await,
            ProfileAction::Delete { yes } => commands::account::delete(&state, yes).await,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state).await,
            CartAction::Add { id, quantity } => commands::cart::add(&state, id, quantity).await,
            CartAction::Update { id, quantity } => {
                commands::cart::update(&state, id, quantity).await
            }
            CartAction::Remove { id } => commands::cart::remove(&state, id).await,
            CartAction::Clear => commands::cart::clear(&state).await,
        },
        Commands::Checkout {
            name,
            email,
            address,
        } => {
            let form = products_plus_storefront::services::checkout::CheckoutForm {
                name,
                email,
                address,
            };
            commands::checkout::run(&state, &form).await
        }
    }
}
