use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for menu catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MenuItemId(pub u32);

impl From<u32> for MenuItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for MenuItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A server-owned catalog entry, cached client-side per session and
/// invalidated wholesale when the menu changes upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub available: bool,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default)]
    pub best_seller: bool,
}

impl MenuItem {
    /// The price the customer actually pays, with any running discount
    /// applied. Cart lines capture this value at add time so the cart total
    /// always matches what was on screen.
    pub fn effective_price(&self) -> f64 {
        if self.discount_percentage > 0.0 {
            self.price * (1.0 - self.discount_percentage / 100.0)
        } else {
            self.price
        }
    }
}
