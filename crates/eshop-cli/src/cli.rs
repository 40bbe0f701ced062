//! Command line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use eshop_core::catalog::SortOrder;

/// Terminal storefront: browse the catalog, sign in and place orders.
#[derive(Debug, Parser)]
#[command(name = "eshop", version, about, long_about = None)]
pub struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session token
    Login {
        /// Email used to sign in (defaults to the last one used)
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Create a new account
    Signup(SignupArgs),
    /// Forget the stored session
    Logout,
    /// Show whether a session is active and any order in progress
    Status,
    /// List products
    Products {
        /// Category tab: ALL, APPAREL, ELECTRONICS, FOOTWEAR, PERSONAL CARE
        #[arg(short, long, default_value = "ALL")]
        category: String,
        /// Match product name or description
        #[arg(short, long, default_value = "")]
        search: String,
        /// price_asc, price_desc or newest
        #[arg(long, default_value = "default")]
        sort: SortOrder,
    },
    /// List product categories known to the server
    Categories,
    /// Show product details
    Product { id: String },
    /// Start checkout for a product
    Buy {
        id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// List saved shipping addresses
    Addresses,
    /// Save a new shipping address
    AddAddress(AddressArgs),
    /// Place the order in progress
    Order {
        /// Shipping address id (see `eshop addresses`)
        #[arg(short, long)]
        address: String,
    },
    /// Drop the order in progress
    Abandon,
    /// Add a product to the catalog (admin only)
    AddProduct(ProductArgs),
    /// Keep re-validating the session until Ctrl+C
    Watch,
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub contact_number: String,
}

#[derive(Debug, Args)]
pub struct AddressArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub contact_number: String,
    #[arg(long)]
    pub street: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub landmark: Option<String>,
    #[arg(long)]
    pub zipcode: String,
}

#[derive(Debug, Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub price: f64,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long)]
    pub manufacturer: String,
    #[arg(long)]
    pub available_items: u32,
    #[arg(long, default_value = "")]
    pub image_url: String,
}
