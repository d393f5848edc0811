//! # Kitchen Board
//!
//! The kitchen's view of open orders: which dishes to start, which are
//! plated, which catalog entries just ran out. The original gating lived in
//! disabled buttons; here every action checks the order's actual status and
//! an out-of-turn action is a typed error, not a silently ignored click.

use std::sync::Arc;

use tracing::{info, warn};

use tableside_sync::backend::{ApiError, Backend};
use tableside_sync::model::{MenuItem, MenuItemId, Order, OrderId, OrderItemId, OrderStatus};

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("order {order} is {status}, {action} is not allowed")]
    WrongStatus {
        order: OrderId,
        status: OrderStatus,
        action: &'static str,
    },
    #[error("order {0} is not on the board")]
    UnknownOrder(OrderId),
    #[error("order item {0} is not on the board")]
    UnknownOrderItem(OrderItemId),
    #[error("menu item {0} is not on the board")]
    UnknownMenuItem(MenuItemId),
    #[error("backend request failed: {0}")]
    Api(#[from] ApiError),
}

/// One kitchen display, holding its own copy of the open orders and the
/// menu. Staff boards read across tables, so there is no table scoping and
/// no auth token here.
pub struct KitchenBoard {
    backend: Arc<dyn Backend>,
    orders: Vec<Order>,
    menu: Vec<MenuItem>,
}

impl KitchenBoard {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            orders: Vec::new(),
            menu: Vec::new(),
        }
    }

    /// Reload the board, optionally narrowed to one status. Terminal orders
    /// never appear regardless of the filter.
    pub async fn load(&mut self, filter: Option<OrderStatus>) -> Result<&[Order], BoardError> {
        let mut orders = self.backend.fetch_orders(filter).await?;
        orders.retain(|order| !order.status.is_terminal());
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        self.orders = orders;
        Ok(&self.orders)
    }

    pub async fn load_menu(&mut self) -> Result<&[MenuItem], BoardError> {
        self.menu = self.backend.fetch_menu().await?;
        Ok(&self.menu)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    /// Move a `Pending` order onto the stove.
    pub async fn start_cooking(&mut self, order: OrderId) -> Result<(), BoardError> {
        self.transition(order, OrderStatus::Pending, OrderStatus::InProgress, "start cooking")
            .await
    }

    /// Declare an `In Progress` order fully plated.
    pub async fn mark_ready(&mut self, order: OrderId) -> Result<(), BoardError> {
        self.transition(order, OrderStatus::InProgress, OrderStatus::Ready, "mark ready")
            .await
    }

    async fn transition(
        &mut self,
        order: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        action: &'static str,
    ) -> Result<(), BoardError> {
        let current = self
            .orders
            .iter()
            .find(|o| o.id == order)
            .ok_or(BoardError::UnknownOrder(order))?;
        if current.status != from {
            return Err(BoardError::WrongStatus {
                order,
                status: current.status,
                action,
            });
        }

        let updated = self.backend.update_order_status(order, to).await?;
        info!(%order, status = %to, "Order status updated");
        if let Some(slot) = self.orders.iter_mut().find(|o| o.id == order) {
            *slot = updated;
        }
        Ok(())
    }

    /// Check one dish off as plated. Locked once the whole order is already
    /// `Ready` or `Delivered`.
    pub async fn set_item_ready(
        &mut self,
        order: OrderId,
        item: OrderItemId,
    ) -> Result<(), BoardError> {
        let current = self
            .orders
            .iter()
            .find(|o| o.id == order)
            .ok_or(BoardError::UnknownOrder(order))?;
        if matches!(current.status, OrderStatus::Ready | OrderStatus::Delivered) {
            return Err(BoardError::WrongStatus {
                order,
                status: current.status,
                action: "item check-off",
            });
        }
        if !current.items.iter().any(|line| line.id == item) {
            return Err(BoardError::UnknownOrderItem(item));
        }

        self.backend.update_item_status(item, OrderStatus::Ready).await?;
        if let Some(line) = self
            .orders
            .iter_mut()
            .find(|o| o.id == order)
            .and_then(|o| o.items.iter_mut().find(|line| line.id == item))
        {
            line.status = OrderStatus::Ready;
        }
        Ok(())
    }

    /// Flip a catalog entry's availability. Applied optimistically: the
    /// cached flag changes first and is restored if the server says no.
    pub async fn toggle_availability(&mut self, item: MenuItemId) -> Result<bool, BoardError> {
        let entry = self
            .menu
            .iter_mut()
            .find(|entry| entry.id == item)
            .ok_or(BoardError::UnknownMenuItem(item))?;
        let previous = entry.available;
        let wanted = !previous;
        entry.available = wanted;

        match self.backend.set_item_availability(item, wanted).await {
            Ok(()) => {
                info!(%item, available = wanted, "Availability updated");
                Ok(wanted)
            }
            Err(error) => {
                if let Some(entry) = self.menu.iter_mut().find(|entry| entry.id == item) {
                    entry.available = previous;
                }
                warn!(%item, %error, "Availability toggle failed, restored previous value");
                Err(BoardError::Api(error))
            }
        }
    }
}
