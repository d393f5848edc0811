//! # Orders Store
//!
//! The authoritative visible list of one table's open orders. The server
//! owns the data; this store only decides when to re-fetch it and how to
//! present it. Two rules govern every update:
//!
//! 1. A refresh replaces the list wholesale with the response, filtered to
//!    non-terminal statuses and sorted newest first. Because refreshes are
//!    processed sequentially by the store task, overlapping refreshes apply
//!    in completion order and the last response wins outright; nothing is
//!    ever merged.
//! 2. A failed refresh keeps the previous list on screen and raises a flag
//!    the UI turns into an inline retry control. Stale data beats no data.
//!
//! Settling is the one optimistic mutation: paid orders disappear from the
//! list immediately, and the per-order completion updates go out as
//! fire-and-forget calls whose failures are logged, never surfaced. The next
//! scheduled refresh reconciles whatever the server thinks happened.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::auth::TableAuth;
use crate::backend::{Backend, Settlement};
use crate::error::SyncError;
use crate::model::{Order, OrderId, TableNumber};

use super::{request, Respond, ViewEvent, ViewSender};

/// Snapshot of the table's open orders for rendering.
#[derive(Debug, Clone)]
pub struct OrdersView {
    pub orders: Vec<Order>,
    /// True when the most recent refresh failed and `orders` is the last
    /// successfully fetched list.
    pub last_refresh_failed: bool,
}

#[derive(Debug)]
pub(crate) enum OrdersRequest {
    Refresh {
        respond_to: Respond<Result<OrdersView, SyncError>>,
    },
    MarkPaidLocally {
        order_ids: Vec<OrderId>,
        settlement: Settlement,
        respond_to: Respond<OrdersView>,
    },
    Snapshot {
        respond_to: Respond<OrdersView>,
    },
}

/// Dependencies injected when the store task starts.
pub struct OrdersContext {
    pub backend: Arc<dyn Backend>,
    pub table: TableNumber,
    pub views: ViewSender,
}

/// The store task. Create it paired with its client, then spawn `run`.
pub struct OrdersStore {
    receiver: mpsc::Receiver<OrdersRequest>,
    orders: Vec<Order>,
    last_refresh_failed: bool,
}

impl OrdersStore {
    pub fn new(buffer: usize) -> (Self, OrdersClient) {
        let (sender, receiver) = mpsc::channel(buffer);
        let store = Self {
            receiver,
            orders: Vec::new(),
            last_refresh_failed: false,
        };
        (store, OrdersClient { sender })
    }

    pub async fn run(mut self, ctx: OrdersContext) {
        info!(table = %ctx.table, "Orders store started");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                OrdersRequest::Refresh { respond_to } => {
                    let result = self.refresh(&ctx).await;
                    let _ = respond_to.send(result);
                }
                OrdersRequest::MarkPaidLocally {
                    order_ids,
                    settlement,
                    respond_to,
                } => {
                    let view = self.mark_paid(&ctx, order_ids, settlement);
                    let _ = respond_to.send(view);
                }
                OrdersRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(self.view());
                }
            }
        }
        info!(orders = self.orders.len(), "Orders store stopped");
    }

    fn view(&self) -> OrdersView {
        OrdersView {
            orders: self.orders.clone(),
            last_refresh_failed: self.last_refresh_failed,
        }
    }

    async fn refresh(&mut self, ctx: &OrdersContext) -> Result<OrdersView, SyncError> {
        let auth = TableAuth::issue(ctx.table);
        match ctx.backend.fetch_table_orders(ctx.table, &auth).await {
            Ok(mut orders) => {
                orders.retain(|order| !order.status.is_terminal());
                orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                debug!(count = orders.len(), "Order list replaced");
                self.orders = orders;
                self.last_refresh_failed = false;
                let view = self.view();
                let _ = ctx.views.send(ViewEvent::Orders(view.clone()));
                Ok(view)
            }
            Err(error) => {
                warn!(%error, "Order refresh failed, keeping previous list");
                self.last_refresh_failed = true;
                let view = self.view();
                let _ = ctx.views.send(ViewEvent::Orders(view));
                Err(SyncError::Api(error))
            }
        }
    }

    fn mark_paid(
        &mut self,
        ctx: &OrdersContext,
        order_ids: Vec<OrderId>,
        settlement: Settlement,
    ) -> OrdersView {
        self.orders.retain(|order| !order_ids.contains(&order.id));
        info!(
            settled = order_ids.len(),
            remaining = self.orders.len(),
            receipt = %settlement.receipt,
            "Orders settled locally"
        );

        // Completion updates are fire-and-forget: one background task walks
        // the orders in sequence so the server sees them in a stable order.
        let backend = ctx.backend.clone();
        let table = ctx.table;
        tokio::spawn(async move {
            for order in order_ids {
                let auth = TableAuth::issue(table);
                if let Err(error) = backend.complete_order(order, &settlement, &auth).await {
                    warn!(%order, %error, "Completion update failed after local settle");
                }
            }
        });

        let view = self.view();
        let _ = ctx.views.send(ViewEvent::Orders(view.clone()));
        view
    }
}

/// Type-safe handle to the orders store. Cheap to clone and share.
#[derive(Clone)]
pub struct OrdersClient {
    sender: mpsc::Sender<OrdersRequest>,
}

impl OrdersClient {
    /// Re-fetch the table's orders and replace the list wholesale. On
    /// failure the previous list stays visible and the error is returned.
    pub async fn refresh(&self) -> Result<OrdersView, SyncError> {
        request(&self.sender, |respond_to| OrdersRequest::Refresh { respond_to }).await?
    }

    /// Optimistically drop the given orders from the list and notify the
    /// server in the background.
    pub async fn mark_paid_locally(
        &self,
        order_ids: Vec<OrderId>,
        settlement: Settlement,
    ) -> Result<OrdersView, SyncError> {
        request(&self.sender, |respond_to| OrdersRequest::MarkPaidLocally {
            order_ids,
            settlement,
            respond_to,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<OrdersView, SyncError> {
        request(&self.sender, |respond_to| OrdersRequest::Snapshot { respond_to }).await
    }
}
