//! # Domain Model
//!
//! Pure data structures shared by the stores, the checkout flow, and the
//! backend interface. Everything here is serde-friendly because these shapes
//! mirror what travels over the wire; nothing here performs I/O.

pub mod cart;
pub mod menu;
pub mod order;

pub use cart::CartLine;
pub use menu::{MenuItem, MenuItemId};
pub use order::{Order, OrderId, OrderItem, OrderItemId, OrderStatus, TableNumber};
