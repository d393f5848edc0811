//! # Backend Interface
//!
//! The REST backend is an opaque collaborator. The engine talks to it
//! through the [`Backend`] trait so the stores, the checkout flow, and the
//! staff boards never couple to a transport: production wires an HTTP
//! implementation, tests wire [`mock::MockBackend`], and the demo binary
//! wires an in-memory simulation.
//!
//! Every table-scoped operation takes a freshly issued
//! [`TableAuth`](crate::auth::TableAuth) token, mirroring the custom header
//! the real service expects.

pub mod mock;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::auth::TableAuth;
use crate::model::{CartLine, MenuItem, MenuItemId, Order, OrderId, OrderItemId, OrderStatus, TableNumber};

/// Errors reported by the backend, without a finer taxonomy: callers only
/// ever distinguish "the server said no" from "the server was unreachable".
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("server rejected the request ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("request could not reach the server: {0}")]
    Transport(String),
}

impl ApiError {
    pub fn not_found(what: impl Display) -> Self {
        Self::Status {
            status: 404,
            message: format!("{what} not found"),
        }
    }
}

/// The payload of a cart submit: everything the server needs to open an
/// order for a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub table_number: TableNumber,
    pub lines: Vec<CartLine>,
}

/// How the customer chose to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Qr,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Qr => write!(f, "qr"),
        }
    }
}

/// Receipt identifier handed to the customer after a confirmed payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptNumber(pub String);

impl ReceiptNumber {
    /// Derive a short receipt number from the current timestamp.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis().to_string();
        let tail = &millis[millis.len().saturating_sub(6)..];
        Self(format!("RCP-{tail}"))
    }
}

impl Display for ReceiptNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settlement details attached to each per-order completion update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub method: PaymentMethod,
    pub receipt: ReceiptNumber,
}

/// One payment covering every unpaid order of a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub table_number: TableNumber,
    pub order_ids: Vec<OrderId>,
    pub amount: f64,
    pub method: PaymentMethod,
}

/// The REST surface the engine consumes.
///
/// Read operations are fail-soft at the call sites (previous state stays
/// visible); write operations are fail-loud except the per-order completion
/// update, which is fire-and-forget by design.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Full menu catalog.
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, ApiError>;

    /// Every order the server tracks for one table, all statuses included.
    async fn fetch_table_orders(
        &self,
        table: TableNumber,
        auth: &TableAuth,
    ) -> Result<Vec<Order>, ApiError>;

    /// Staff-board read across tables, optionally narrowed to one status.
    async fn fetch_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, ApiError>;

    /// Open a new order from a cart draft. The server assigns the id,
    /// per-item ids, and the creation timestamp.
    async fn create_order(&self, draft: &OrderDraft, auth: &TableAuth) -> Result<Order, ApiError>;

    /// Mark one order completed with its settlement details.
    async fn complete_order(
        &self,
        order: OrderId,
        settlement: &Settlement,
        auth: &TableAuth,
    ) -> Result<(), ApiError>;

    /// Run one payment covering a table's unpaid orders.
    async fn process_payment(&self, request: &PaymentRequest) -> Result<(), ApiError>;

    /// Staff-board order lifecycle update; returns the refreshed snapshot.
    async fn update_order_status(
        &self,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError>;

    /// Kitchen check-off of a single dish.
    async fn update_item_status(
        &self,
        item: OrderItemId,
        status: OrderStatus,
    ) -> Result<(), ApiError>;

    /// Kitchen availability toggle for a catalog entry.
    async fn set_item_availability(
        &self,
        item: MenuItemId,
        available: bool,
    ) -> Result<(), ApiError>;
}
