//! # Event Bridge
//!
//! Translates named push notifications into store operations. The transport
//! is deliberately out of the picture: whatever delivers events (a websocket,
//! a message queue, a test) feeds [`PushEvent`] values into an mpsc channel
//! and the bridge dispatches them one at a time.
//!
//! Two properties make the mapping safe to run against a lossy, unordered
//! transport:
//!
//! - Every handler is idempotent. A refresh replaces state wholesale and a
//!   patch sets an absolute value, so replaying or reordering events cannot
//!   corrupt anything.
//! - Every handler is fail-soft. A refresh that cannot reach the server is
//!   logged and dropped; the 30-second poll will catch the state up.
//!
//! The engine also emits a small number of events of its own (device
//! registration, payment settled) on the outbound channel for the transport
//! to publish.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::device::DeviceStore;
use crate::model::{MenuItemId, OrderId, TableNumber};
use crate::stores::catalog::CatalogClient;
use crate::stores::orders::OrdersClient;
use crate::stores::{ViewEvent, ViewSender};

/// Push notifications the engine subscribes to, decoupled from any wire
/// format. Payload fields mirror what the server attaches; handlers that
/// refresh wholesale ignore them beyond logging.
#[derive(Debug, Clone)]
pub enum PushEvent {
    NewOrder,
    OrderUpdated { order_id: Option<OrderId> },
    OrderPaid { table_number: Option<TableNumber> },
    MenuUpdated,
    ItemAvailability { item_id: MenuItemId, available: bool },
    PromoUpdated,
    ResetDevice,
}

/// Events the engine publishes back through the transport.
#[derive(Debug, Clone)]
pub enum OutboundEvent {
    RegisterDevice {
        table_number: TableNumber,
    },
    OrderPaid {
        table_number: TableNumber,
        order_ids: Vec<OrderId>,
    },
}

pub type OutboundSender = mpsc::UnboundedSender<OutboundEvent>;
pub type OutboundReceiver = mpsc::UnboundedReceiver<OutboundEvent>;

/// The event-to-handler map. Handlers are plain methods on the stores'
/// clients, so the mapping is unit-testable without any transport.
pub struct EventBridge {
    orders: OrdersClient,
    catalog: CatalogClient,
    device: Arc<DeviceStore>,
    views: ViewSender,
}

impl EventBridge {
    pub fn new(
        orders: OrdersClient,
        catalog: CatalogClient,
        device: Arc<DeviceStore>,
        views: ViewSender,
    ) -> Self {
        Self {
            orders,
            catalog,
            device,
            views,
        }
    }

    /// Dispatch events until the transport closes the channel.
    pub async fn run(self, mut events: mpsc::Receiver<PushEvent>) {
        info!("Event bridge started");
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        info!("Event bridge stopped");
    }

    /// Dispatch one push notification. Safe to call repeatedly with the
    /// same event.
    pub async fn handle(&self, event: PushEvent) {
        debug!(?event, "Dispatching push event");
        match event {
            PushEvent::NewOrder
            | PushEvent::OrderUpdated { .. }
            | PushEvent::OrderPaid { .. } => {
                if let Err(error) = self.orders.refresh().await {
                    warn!(%error, "Order refresh from push event failed");
                }
            }
            PushEvent::MenuUpdated | PushEvent::PromoUpdated => {
                if let Err(error) = self.catalog.refresh().await {
                    warn!(%error, "Catalog refresh from push event failed");
                }
            }
            PushEvent::ItemAvailability { item_id, available } => {
                if let Err(error) = self.catalog.patch_availability(item_id, available).await {
                    warn!(%error, "Availability patch from push event failed");
                }
            }
            PushEvent::ResetDevice => {
                info!("Device reset requested remotely");
                self.device.clear_table_assignment();
                let _ = self.views.send(ViewEvent::DeviceReset);
            }
        }
    }
}
