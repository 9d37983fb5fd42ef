//! Herbal storefront command-line driver.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! storefront-cli products list --category "Hair Oil" --sort price-asc
//!
//! # Build a cart and get the WhatsApp order link
//! storefront-cli cart add 1 --qty 2
//! storefront-cli cart checkout
//!
//! # Admin changes (shared password from HERBAL_ADMIN_PASSWORD)
//! storefront-cli admin create --name "Neem Oil" --category "Hair Oil" --price 650 \
//!     --image-url neem.jpg --details "Cold pressed"
//! ```
//!
//! Cart and wishlist persist in the data directory between runs. Admin
//! credentials are never stored; pass them with every admin command.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use hb_api_types::ProductId;
use hb_catalog::SortMode;
use hb_catalog_http::{HttpProductApi, LEGACY_PRODUCTS_PATH};
use hb_storage::LocalStore;
use hb_storefront_core::Storefront;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod commands;
mod config;

use config::StorefrontConfig;

pub type App = Storefront<HttpProductApi, Arc<dyn LocalStore>>;

#[derive(Parser)]
#[command(name = "storefront-cli")]
#[command(author, version, about = "Herbal storefront catalog, cart and admin tools")]
struct Cli {
    /// Backend base URL (defaults to HERBAL_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory for the local cart, wishlist and catalog cache (defaults to HERBAL_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use the legacy `/products` path instead of `/api/products`
    #[arg(long, global = true)]
    legacy_paths: bool,

    /// Keep local state in RocksDB instead of JSON files (needs the `rocksdb` feature)
    #[arg(long, global = true)]
    rocksdb: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage saved products
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Print a WhatsApp link ordering a single product
    BuyNow {
        id: String,
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Create, edit and delete products
    Admin {
        #[command(flatten)]
        auth: AdminAuth,
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products after filtering and sorting
    List(ListArgs),
    /// Show one product
    Show { id: String },
    /// List category names
    Categories,
}

#[derive(Args)]
pub struct ListArgs {
    /// Category to show ("All" for every category)
    #[arg(short, long)]
    pub category: Option<String>,
    /// Case-insensitive text matched against name, category and details
    #[arg(short, long)]
    pub search: Option<String>,
    #[arg(long)]
    pub min: Option<Decimal>,
    #[arg(long)]
    pub max: Option<Decimal>,
    /// featured, price-asc, price-desc, name-asc or name-desc
    #[arg(long, default_value = "featured")]
    pub sort: SortMode,
    /// Only saved products
    #[arg(short, long)]
    pub wishlist: bool,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and total
    Show,
    /// Add a product
    Add {
        id: String,
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Change the quantity of a line by a signed amount
    Adjust {
        key: String,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Remove a line
    Remove { key: String },
    /// Empty the cart
    Clear,
    /// Print the WhatsApp order link for the whole cart
    Checkout,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show saved products
    Show,
    /// Save or unsave a product
    Toggle { id: String },
}

#[derive(Args)]
pub struct AdminAuth {
    /// Shared admin password (defaults to HERBAL_ADMIN_PASSWORD)
    #[arg(long, global = true)]
    pub password: Option<String>,
    /// Log in through the backend with this email and --password
    #[arg(long, global = true)]
    pub email: Option<String>,
    /// Bearer token from an earlier `admin login --email`
    #[arg(long, global = true)]
    pub token: Option<String>,
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: Option<String>,
    /// Existing category
    #[arg(long)]
    pub category: Option<String>,
    /// New category; wins over --category
    #[arg(long)]
    pub new_category: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    /// Image file name or URL
    #[arg(long)]
    pub image_url: Option<String>,
    /// Image file to embed; wins over --image-url
    #[arg(long)]
    pub image_file: Option<PathBuf>,
    #[arg(long)]
    pub details: Option<String>,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Check credentials; with --email prints the bearer token
    Login,
    /// Create a product
    Create(ProductArgs),
    /// Edit a product; omitted fields keep their current value
    Update {
        id: String,
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete a product
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StorefrontConfig::from_env();
    let mut app = build_app(&cli, &config)?;

    let source = app.refresh().await;
    info!("catalog ready from {:?} with {} products", source, app.products().len());

    run(cli.command, &mut app, &config).await
}

fn build_app(cli: &Cli, config: &StorefrontConfig) -> anyhow::Result<App> {
    let api_url = cli.api_url.clone().unwrap_or_else(|| config.api_url.clone());
    let products_path = if cli.legacy_paths {
        LEGACY_PRODUCTS_PATH.to_owned()
    } else {
        config.products_path.clone()
    };
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());

    let store = open_store(cli, &data_dir)?;
    let api = HttpProductApi::new(Some(api_url), Some(products_path));
    info!("using backend {} and data dir {}", api.endpoint(), data_dir.display());

    Ok(Storefront::new(api, store, config.whatsapp_number.clone()))
}

#[cfg(feature = "rocksdb")]
fn open_store(cli: &Cli, data_dir: &std::path::Path) -> anyhow::Result<Arc<dyn LocalStore>> {
    if cli.rocksdb {
        let path = data_dir.join("rocksdb");
        let store = hb_storage::RocksDbStore::open_default(&path.to_string_lossy())
            .with_context(|| format!("failed to open RocksDB at {}", path.display()))?;
        return Ok(Arc::new(store));
    }
    let store = hb_storage::JsonFileStore::open(data_dir)
        .with_context(|| format!("failed to open data dir {}", data_dir.display()))?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "rocksdb"))]
fn open_store(cli: &Cli, data_dir: &std::path::Path) -> anyhow::Result<Arc<dyn LocalStore>> {
    if cli.rocksdb {
        anyhow::bail!("this build has no RocksDB support; rebuild with --features rocksdb");
    }
    let store = hb_storage::JsonFileStore::open(data_dir)
        .with_context(|| format!("failed to open data dir {}", data_dir.display()))?;
    Ok(Arc::new(store))
}

async fn run(command: Commands, app: &mut App, config: &StorefrontConfig) -> anyhow::Result<()> {
    match command {
        Commands::Products { action } => match action {
            ProductsAction::List(args) => commands::catalog::list(app, &args),
            ProductsAction::Show { id } => commands::catalog::show(app, &ProductId::new(id))?,
            ProductsAction::Categories => commands::catalog::categories(app),
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(app),
            CartAction::Add { id, qty } => commands::cart::add(app, &ProductId::new(id), qty)?,
            CartAction::Adjust { key, delta } => commands::cart::adjust(app, &key, delta)?,
            CartAction::Remove { key } => commands::cart::remove(app, &key)?,
            CartAction::Clear => commands::cart::clear(app),
            CartAction::Checkout => commands::cart::checkout(app)?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(app),
            WishlistAction::Toggle { id } => commands::wishlist::toggle(app, &ProductId::new(id))?,
        },
        Commands::BuyNow { id, qty } => commands::cart::buy_now(app, &ProductId::new(id), qty)?,
        Commands::Admin { auth, action } => {
            commands::admin::authenticate(app, &auth, config).await?;
            match action {
                AdminAction::Login => commands::admin::report_login(app, &auth),
                AdminAction::Create(fields) => commands::admin::create(app, &fields).await?,
                AdminAction::Update { id, fields } => {
                    commands::admin::update(app, &ProductId::new(id), &fields).await?;
                }
                AdminAction::Delete { id } => {
                    commands::admin::delete(app, &ProductId::new(id)).await?;
                }
            }
        }
    }
    Ok(())
}
