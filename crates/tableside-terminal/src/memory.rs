//! # In-Memory Backend
//!
//! A self-contained simulation of the ordering service, used by the demo
//! binary and the integration tests. It applies the same rules the real
//! service does (server-assigned ids, totals computed from the draft,
//! orders always opening as `Pending`) so a session wired against it
//! behaves like one wired against production.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use tableside_sync::auth::TableAuth;
use tableside_sync::backend::{ApiError, Backend, OrderDraft, PaymentRequest, Settlement};
use tableside_sync::model::{
    MenuItem, MenuItemId, Order, OrderId, OrderItem, OrderItemId, OrderStatus, TableNumber,
};

struct ServerState {
    menu: Vec<MenuItem>,
    orders: HashMap<u32, Order>,
    next_order_id: u32,
    next_item_id: u32,
}

/// An ordering service that lives entirely in process memory.
pub struct InMemoryBackend {
    state: Mutex<ServerState>,
}

impl InMemoryBackend {
    pub fn new(menu: Vec<MenuItem>) -> Self {
        Self {
            state: Mutex::new(ServerState {
                menu,
                orders: HashMap::new(),
                next_order_id: 1,
                next_item_id: 1,
            }),
        }
    }

    /// Direct read of one order, for assertions in tests.
    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.state.lock().unwrap().orders.get(&id.0).cloned()
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, ApiError> {
        Ok(self.state.lock().unwrap().menu.clone())
    }

    async fn fetch_table_orders(
        &self,
        table: TableNumber,
        _auth: &TableAuth,
    ) -> Result<Vec<Order>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .values()
            .filter(|order| order.table_number == table)
            .cloned()
            .collect())
    }

    async fn fetch_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .values()
            .filter(|order| status.map_or(true, |wanted| order.status == wanted))
            .cloned()
            .collect())
    }

    async fn create_order(&self, draft: &OrderDraft, _auth: &TableAuth) -> Result<Order, ApiError> {
        if draft.lines.is_empty() {
            return Err(ApiError::Status {
                status: 400,
                message: "order has no items".to_string(),
            });
        }

        let mut state = self.state.lock().unwrap();
        let order_id = state.next_order_id;
        state.next_order_id += 1;

        let mut items = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let item_id = state.next_item_id;
            state.next_item_id += 1;
            items.push(OrderItem {
                id: OrderItemId(item_id),
                name: line.display_name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                status: OrderStatus::Pending,
                notes: line.notes.clone(),
            });
        }

        let order = Order {
            id: OrderId(order_id),
            table_number: draft.table_number,
            status: OrderStatus::Pending,
            total_amount: draft.lines.iter().map(|line| line.line_total()).sum(),
            items,
            created_at: Utc::now(),
        };
        state.orders.insert(order_id, order.clone());
        Ok(order)
    }

    async fn complete_order(
        &self,
        order: OrderId,
        _settlement: &Settlement,
        _auth: &TableAuth,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        match state.orders.get_mut(&order.0) {
            Some(found) => {
                found.status = OrderStatus::Completed;
                Ok(())
            }
            None => Err(ApiError::not_found(format!("order {order}"))),
        }
    }

    async fn process_payment(&self, request: &PaymentRequest) -> Result<(), ApiError> {
        let state = self.state.lock().unwrap();
        for order in &request.order_ids {
            if !state.orders.contains_key(&order.0) {
                return Err(ApiError::not_found(format!("order {order}")));
            }
        }
        Ok(())
    }

    async fn update_order_status(
        &self,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let mut state = self.state.lock().unwrap();
        match state.orders.get_mut(&order.0) {
            Some(found) => {
                found.status = status;
                Ok(found.clone())
            }
            None => Err(ApiError::not_found(format!("order {order}"))),
        }
    }

    async fn update_item_status(
        &self,
        item: OrderItemId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        for order in state.orders.values_mut() {
            if let Some(line) = order.items.iter_mut().find(|line| line.id == item) {
                line.status = status;
                return Ok(());
            }
        }
        Err(ApiError::not_found(format!("order item {item}")))
    }

    async fn set_item_availability(
        &self,
        item: MenuItemId,
        available: bool,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        match state.menu.iter_mut().find(|entry| entry.id == item) {
            Some(entry) => {
                entry.available = available;
                Ok(())
            }
            None => Err(ApiError::not_found(format!("menu item {item}"))),
        }
    }
}
