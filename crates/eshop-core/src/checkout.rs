//! Checkout flow: the pending order carried from product details to the
//! order view, and its placement.
//!
//! The pending order lives in the durable backend under `orderProduct`
//! (JSON product snapshot) and `orderQuantity`. It is written when the
//! user starts checkout and cleared once the order is placed or abandoned.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{OrderRequest, Product};
use crate::storage::{StorageBackend, ORDER_PRODUCT_KEY, ORDER_QUANTITY_KEY};

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Quantity must be between 1 and {available}, got {requested}")]
    InvalidQuantity { requested: u32, available: u32 },

    #[error("No order in progress")]
    NothingPending,

    #[error("Failed to save pending order: {0}")]
    Storage(#[from] anyhow::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    pub fn requires_login(&self) -> bool {
        matches!(self, CheckoutError::Api(e) if e.requires_login())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    pub product: Product,
    pub quantity: u32,
}

impl PendingOrder {
    pub fn total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }

    pub fn to_request(&self, address_id: &str) -> OrderRequest {
        OrderRequest {
            product_id: self.product.id.clone(),
            address_id: address_id.to_string(),
            quantity: self.quantity,
        }
    }
}

#[derive(Clone)]
pub struct Checkout {
    api: ApiClient,
}

impl Checkout {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn storage(&self) -> &Arc<dyn StorageBackend> {
        self.api.session().store().durable()
    }

    /// Start checkout for `quantity` units of `product`
    pub fn begin(&self, product: &Product, quantity: u32) -> Result<PendingOrder, CheckoutError> {
        if !self.api.session().is_authenticated() {
            return Err(ApiError::AuthenticationRequired.into());
        }
        if quantity == 0 || quantity > product.available_items {
            return Err(CheckoutError::InvalidQuantity {
                requested: quantity,
                available: product.available_items,
            });
        }

        let snapshot = serde_json::to_string(product).map_err(anyhow::Error::from)?;
        self.storage().set(ORDER_PRODUCT_KEY, &snapshot)?;
        if let Err(e) = self.storage().set(ORDER_QUANTITY_KEY, &quantity.to_string()) {
            // Never leave a product snapshot without its quantity
            if let Err(cleanup) = self.storage().remove(ORDER_PRODUCT_KEY) {
                warn!(error = %cleanup, "Failed to roll back pending order product");
            }
            return Err(e.into());
        }

        debug!(product_id = %product.id, quantity, "Checkout started");
        Ok(PendingOrder {
            product: product.clone(),
            quantity,
        })
    }

    /// The order in progress, if any. Unreadable entries count as none.
    pub fn load(&self) -> Option<PendingOrder> {
        let read = |key: &str| match self.storage().get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read pending order");
                None
            }
        };

        let product: Product = match serde_json::from_str(&read(ORDER_PRODUCT_KEY)?) {
            Ok(product) => product,
            Err(e) => {
                warn!(error = %e, "Discarding malformed pending order product");
                return None;
            }
        };
        let quantity: u32 = read(ORDER_QUANTITY_KEY)?.trim().parse().ok()?;
        if quantity == 0 {
            return None;
        }
        Some(PendingOrder { product, quantity })
    }

    /// Place the pending order for delivery to `address_id`.
    /// The pending order survives a failed placement.
    pub async fn place(&self, address_id: &str) -> Result<serde_json::Value, CheckoutError> {
        let pending = self.load().ok_or(CheckoutError::NothingPending)?;
        let receipt = self.api.place_order(&pending.to_request(address_id)).await?;

        self.clear();
        info!(product_id = %pending.product.id, quantity = pending.quantity, "Order placed");
        Ok(receipt)
    }

    pub fn abandon(&self) {
        self.clear();
        debug!("Checkout abandoned");
    }

    fn clear(&self) {
        for key in [ORDER_PRODUCT_KEY, ORDER_QUANTITY_KEY] {
            if let Err(e) = self.storage().remove(key) {
                warn!(key, error = %e, "Failed to clear pending order");
            }
        }
    }
}
