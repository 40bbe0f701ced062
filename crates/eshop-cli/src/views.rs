//! Storefront views, one per subcommand.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use eshop_core::catalog::{CatalogQuery, CategoryFilter, CATEGORY_TABS};
use eshop_core::models::{NewAddress, NewProduct, Product, SignupRequest};
use eshop_core::storage::MemoryBackend;
use eshop_core::utils::{format_date, format_price, truncate_string};
use eshop_core::{api, ApiClient, Checkout, Config, SessionManager, SessionState, TokenStore};

use crate::cli::{AddressArgs, Command, ProductArgs, SignupArgs};

/// Descriptions in the product list are cut to this many characters
const LIST_DESCRIPTION_LENGTH: usize = 60;

pub struct App {
    config: Config,
    session: SessionManager,
    api: ApiClient,
    checkout: Checkout,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        let durable = config
            .open_durable_backend()
            .context("Failed to open durable storage")?;
        // Lives only as long as this process, like a browser tab's session storage
        let tab = Arc::new(MemoryBackend::new());

        let store = TokenStore::new(durable, tab);
        let session = SessionManager::new(store, api::build_http_client()?, config.base_url())
            .with_token_lifetime(config.token_lifetime());
        let api = ApiClient::new(session.clone());
        let checkout = Checkout::new(api.clone());
        debug!(base_url = %config.base_url(), "Client configured");

        Ok(Self {
            config,
            session,
            api,
            checkout,
        })
    }

    pub async fn run(mut self, command: Command) -> Result<()> {
        match command {
            Command::Login { username } => self.login(username).await,
            Command::Signup(args) => self.signup(args).await,
            Command::Logout => {
                self.session.logout();
                println!("Signed out.");
                Ok(())
            }
            Command::Status => {
                self.status();
                Ok(())
            }
            Command::Products {
                category,
                search,
                sort,
            } => {
                let query = CatalogQuery {
                    category: CategoryFilter::parse(&category),
                    search,
                    sort,
                };
                self.products(&query).await
            }
            Command::Categories => self.categories().await,
            Command::Product { id } => self.product(&id).await,
            Command::Buy { id, quantity } => self.buy(&id, quantity).await,
            Command::Addresses => self.addresses().await,
            Command::AddAddress(args) => self.add_address(args).await,
            Command::Order { address } => self.order(&address).await,
            Command::Abandon => {
                self.checkout.abandon();
                println!("Order abandoned.");
                Ok(())
            }
            Command::AddProduct(args) => self.add_product(args).await,
            Command::Watch => self.watch().await,
        }
    }

    // ===== Login / Signup =====

    async fn login(&mut self, username: Option<String>) -> Result<()> {
        let username = match username.or_else(|| self.config.last_username.clone()) {
            Some(name) => name,
            None => prompt("Email: ")?,
        };
        let password = rpassword::prompt_password(format!("Password for {}: ", username))
            .context("Failed to read password")?;

        self.session.login(&username, &password).await?;
        println!("Signed in as {}.", username);

        if self.config.last_username.as_deref() != Some(username.as_str()) {
            self.config.last_username = Some(username);
            self.config.save()?;
        }
        Ok(())
    }

    async fn signup(&self, args: SignupArgs) -> Result<()> {
        let password = rpassword::prompt_password("Password: ")?;
        let confirm = rpassword::prompt_password("Confirm password: ")?;
        if password != confirm {
            bail!("Passwords do not match");
        }

        let request = SignupRequest {
            email: args.email,
            password,
            first_name: args.first_name,
            last_name: args.last_name,
            contact_number: args.contact_number,
        };
        let response = self.api.sign_up(&request).await?;
        println!(
            "{}",
            response
                .message
                .unwrap_or_else(|| "Account created.".to_string())
        );
        println!("Sign in with `eshop login --username {}`.", request.email);
        Ok(())
    }

    fn status(&self) {
        match self.session.current() {
            Some(credential) => {
                let role = if self.session.is_admin() { "admin" } else { "user" };
                match credential.expires_at {
                    Some(at) => {
                        let minutes = (at - chrono::Utc::now()).num_minutes().max(0);
                        println!("Signed in ({}), token expires in {} min.", role, minutes);
                    }
                    None => println!("Signed in ({}).", role),
                }
            }
            None => println!("Not signed in."),
        }

        if let Some(pending) = self.checkout.load() {
            println!(
                "Order in progress: {} x{} ({})",
                pending.product.name,
                pending.quantity,
                format_price(pending.total())
            );
        }
    }

    // ===== Catalog =====

    async fn products(&self, query: &CatalogQuery) -> Result<()> {
        let products = self.api.list_products().await?;
        let shown = query.apply(&products);

        println!("Categories: {}", CATEGORY_TABS.join(" | "));
        println!("Sort by: {}", query.sort);
        if shown.is_empty() {
            println!("No products found.");
            return Ok(());
        }
        for product in &shown {
            println!(
                "{:<12} {:<32} {:>12}  {}",
                product.id,
                truncate_string(&product.name, 32),
                format_price(product.price),
                truncate_string(
                    product.description.as_deref().unwrap_or_default(),
                    LIST_DESCRIPTION_LENGTH
                )
            );
        }
        println!("{} of {} products", shown.len(), products.len());
        Ok(())
    }

    async fn categories(&self) -> Result<()> {
        for category in self.api.list_categories().await? {
            println!("{}", category);
        }
        Ok(())
    }

    async fn product(&self, id: &str) -> Result<()> {
        let product = self.api.get_product(id).await?;
        print_product(&product);
        if product.is_in_stock() {
            println!();
            println!("Buy with `eshop buy {} --quantity N`.", product.id);
        }
        Ok(())
    }

    // ===== Order =====

    async fn buy(&self, id: &str, quantity: u32) -> Result<()> {
        let (product, addresses) =
            futures::try_join!(self.api.get_product(id), self.api.list_addresses())?;
        let pending = self.checkout.begin(&product, quantity)?;

        println!(
            "{} x{} - total {}",
            pending.product.name,
            pending.quantity,
            format_price(pending.total())
        );
        if addresses.is_empty() {
            println!("No saved addresses. Add one with `eshop add-address`.");
        } else {
            println!("Select an address:");
            for address in &addresses {
                println!("  {:<12} {}", address.id, address.display());
            }
            println!("Then run `eshop order --address <id>`.");
        }
        Ok(())
    }

    async fn addresses(&self) -> Result<()> {
        let addresses = self.api.list_addresses().await?;
        if addresses.is_empty() {
            println!("No saved addresses.");
        }
        for address in addresses {
            println!("{:<12} {}", address.id, address.display());
        }
        Ok(())
    }

    async fn add_address(&self, args: AddressArgs) -> Result<()> {
        let address = self
            .api
            .add_address(&NewAddress {
                name: args.name,
                contact_number: args.contact_number,
                street: args.street,
                city: args.city,
                state: args.state,
                landmark: args.landmark,
                zipcode: args.zipcode,
            })
            .await?;
        println!("Address added: {} ({})", address.display(), address.id);
        Ok(())
    }

    async fn order(&self, address_id: &str) -> Result<()> {
        let Some(pending) = self.checkout.load() else {
            bail!("No order in progress. Start one with `eshop buy <product id>`.");
        };
        println!("Order summary");
        println!("  {}", pending.product.name);
        println!("  Quantity: {}", pending.quantity);
        println!("  Category: {}", pending.product.category_display());
        println!("  Total Price: {}", format_price(pending.total()));

        self.checkout.place(address_id).await?;
        println!("Your order is confirmed.");
        Ok(())
    }

    async fn add_product(&self, args: ProductArgs) -> Result<()> {
        if !self.session.is_admin() {
            bail!("Adding products requires an admin account");
        }
        let product = NewProduct {
            name: args.name,
            category: args.category,
            price: args.price,
            description: args.description,
            manufacturer: args.manufacturer,
            available_items: args.available_items,
            image_url: args.image_url,
        };
        self.api.add_product(&product).await?;
        println!("Product {} added successfully.", product.name);
        Ok(())
    }

    // ===== Session =====

    async fn watch(&self) -> Result<()> {
        let interval = self.config.revalidation_interval();
        let handle = self.session.spawn_revalidation(interval);
        let mut state = handle.subscribe();
        println!(
            "Session is {}; re-validating every {}s. Ctrl+C to stop.",
            describe(*state.borrow()),
            interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = *state.borrow();
                    info!(?current, "Session state changed");
                    println!("Session is now {}.", describe(current));
                }
            }
        }
        handle.stop();
        Ok(())
    }
}

fn describe(state: SessionState) -> &'static str {
    match state {
        SessionState::Authenticated => "signed in",
        SessionState::Anonymous => "signed out",
    }
}

fn print_product(product: &Product) {
    println!("{}", product.name);
    println!("  Category:     {}", product.category_display());
    println!("  Price:        {}", format_price(product.price));
    if let Some(ref manufacturer) = product.manufacturer {
        println!("  Manufacturer: {}", manufacturer);
    }
    println!("  Available:    {}", product.available_items);
    if let Some(ref created) = product.created_at {
        println!("  Listed:       {}", format_date(created));
    }
    if let Some(ref description) = product.description {
        println!();
        println!("{}", description);
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        bail!("No value entered");
    }
    Ok(value)
}
