//! # Waiter Board
//!
//! Order tracking for the floor: which tables are waiting on plated food,
//! which delivered orders still need settling. Gating mirrors the kitchen
//! board: delivery requires a `Ready` order, settling requires a
//! `Delivered` one.

use std::sync::Arc;

use tracing::info;

use tableside_sync::backend::Backend;
use tableside_sync::model::{Order, OrderId, OrderStatus};

use crate::kitchen::BoardError;

/// One waiter display with its own copy of the open orders.
pub struct WaiterBoard {
    backend: Arc<dyn Backend>,
    orders: Vec<Order>,
}

impl WaiterBoard {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            orders: Vec::new(),
        }
    }

    /// Reload the board, optionally narrowed to one status. Terminal orders
    /// never appear.
    pub async fn load(&mut self, filter: Option<OrderStatus>) -> Result<&[Order], BoardError> {
        let mut orders = self.backend.fetch_orders(filter).await?;
        orders.retain(|order| !order.status.is_terminal());
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        self.orders = orders;
        Ok(&self.orders)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Hand a `Ready` order to the table.
    pub async fn mark_delivered(&mut self, order: OrderId) -> Result<(), BoardError> {
        self.transition(order, OrderStatus::Ready, OrderStatus::Delivered, "mark delivered")
            .await
    }

    /// Settle a `Delivered` order at the table. Completing it removes it
    /// from the board for good.
    pub async fn mark_paid(&mut self, order: OrderId) -> Result<(), BoardError> {
        self.transition(order, OrderStatus::Delivered, OrderStatus::Completed, "mark paid")
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
        if updated.status.is_terminal() {
            self.orders.retain(|o| o.id != order);
        } else if let Some(slot) = self.orders.iter_mut().find(|o| o.id == order) {
            *slot = updated;
        }
        Ok(())
    }
}
