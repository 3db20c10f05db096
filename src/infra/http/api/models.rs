use serde::Deserialize;

use crate::domain::cart::CartChange;

#[derive(Debug, Deserialize)]
pub struct CartRequest {
    #[serde(default)]
    pub items: Vec<CartItemRequest>,
    /// Edits applied in order after `items` are merged.
    #[serde(default)]
    pub changes: Vec<CartChangeRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CartChangeRequest {
    Set { product_id: u64, quantity: u32 },
    Remove { product_id: u64 },
}

impl From<CartChangeRequest> for CartChange {
    fn from(request: CartChangeRequest) -> Self {
        match request {
            CartChangeRequest::Set {
                product_id,
                quantity,
            } => CartChange::SetQuantity {
                product_id,
                quantity,
            },
            CartChangeRequest::Remove { product_id } => CartChange::Remove { product_id },
        }
    }
}
