use serde::{Deserialize, Serialize};

use crate::model::MenuItemId;

/// One pending line of an unsubmitted order. Owned exclusively by the cart
/// store of a single device; the server never sees a cart until submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: MenuItemId,
    pub display_name: String,
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub notes: String,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}
