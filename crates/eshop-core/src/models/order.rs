use serde::{Deserialize, Serialize};

/// Body of `POST /orders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub product_id: String,
    pub address_id: String,
    pub quantity: u32,
}
