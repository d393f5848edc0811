//! # Customer Session
//!
//! The lifecycle conductor for one customer terminal. Individual stores are
//! simple; the coordination is the work: [`TableSession::start`] spawns the
//! three store tasks with their injected contexts, hangs the event bridge
//! off a push channel for the transport to feed, schedules the refresh
//! poller, performs the initial loads, and announces the device. Shutdown
//! reverses it all without losing in-flight work.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use tableside_sync::backend::Backend;
use tableside_sync::bridge::{EventBridge, OutboundEvent, OutboundReceiver, PushEvent};
use tableside_sync::checkout::Checkout;
use tableside_sync::device::DeviceStore;
use tableside_sync::error::SyncError;
use tableside_sync::stores::cart::{CartClient, CartStore};
use tableside_sync::stores::catalog::{CatalogClient, CatalogContext, CatalogStore};
use tableside_sync::stores::orders::{OrdersClient, OrdersContext, OrdersStore};
use tableside_sync::stores::ViewReceiver;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no table assigned to this device, complete device setup first")]
    NoTableAssigned,
}

/// A running customer session: three store tasks, the event bridge, and the
/// refresh poller, with typed clients as the only way in.
pub struct TableSession {
    pub cart: CartClient,
    pub orders: OrdersClient,
    pub catalog: CatalogClient,
    pub checkout: Checkout,
    pub device: Arc<DeviceStore>,
    push: mpsc::Sender<PushEvent>,
    views: Option<ViewReceiver>,
    outbound: Option<OutboundReceiver>,
    store_handles: Vec<JoinHandle<()>>,
    bridge_handle: JoinHandle<()>,
    poll_handle: JoinHandle<()>,
}

impl TableSession {
    /// Wire and start everything. Requires the device to already carry a
    /// table assignment; registration of the device is announced on the
    /// outbound channel for the transport to publish.
    pub async fn start(
        config: &Config,
        backend: Arc<dyn Backend>,
        device: Arc<DeviceStore>,
    ) -> Result<Self, SessionError> {
        let table = device.table_number().ok_or(SessionError::NoTableAssigned)?;

        let (views_tx, views_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (push_tx, push_rx) = mpsc::channel(config.store_buffer);

        // Stores first, dependencies injected at spawn.
        let (cart_store, cart) = CartStore::new(config.store_buffer);
        let (orders_store, orders) = OrdersStore::new(config.store_buffer);
        let (catalog_store, catalog) = CatalogStore::new(config.store_buffer);

        let cart_handle = tokio::spawn(cart_store.run(views_tx.clone()));
        let orders_handle = tokio::spawn(orders_store.run(OrdersContext {
            backend: backend.clone(),
            table,
            views: views_tx.clone(),
        }));
        let catalog_handle = tokio::spawn(catalog_store.run(CatalogContext {
            backend: backend.clone(),
            views: views_tx.clone(),
        }));

        let bridge = EventBridge::new(orders.clone(), catalog.clone(), device.clone(), views_tx);
        let bridge_handle = tokio::spawn(bridge.run(push_rx));

        // Initial menu load is fail-soft: the guest sees an empty menu with
        // a retry rather than no session at all.
        if let Err(error) = catalog.refresh().await {
            warn!(%error, "Initial menu load failed");
        }

        // The poller's first tick fires immediately and performs the
        // initial order load.
        let poll_handle = tokio::spawn(poll_orders(
            orders.clone(),
            Duration::from_secs(config.poll_interval_secs),
        ));

        let _ = outbound_tx.send(OutboundEvent::RegisterDevice { table_number: table });

        let checkout = Checkout::new(backend, table, cart.clone(), orders.clone(), outbound_tx);

        info!(%table, "Table session started");
        Ok(Self {
            cart,
            orders,
            catalog,
            checkout,
            device,
            push: push_tx,
            views: Some(views_rx),
            outbound: Some(outbound_rx),
            store_handles: vec![cart_handle, orders_handle, catalog_handle],
            bridge_handle,
            poll_handle,
        })
    }

    /// Sender the transport uses to deliver push notifications. Every clone
    /// must be dropped before [`shutdown`](Self::shutdown) can finish.
    pub fn push_sender(&self) -> mpsc::Sender<PushEvent> {
        self.push.clone()
    }

    /// Take the snapshot stream the UI renders from. Yields once.
    pub fn views(&mut self) -> Option<ViewReceiver> {
        self.views.take()
    }

    /// Take the stream of events to publish through the transport. Yields
    /// once.
    pub fn outbound(&mut self) -> Option<OutboundReceiver> {
        self.outbound.take()
    }

    /// Tear the session down: close the push channel and let the bridge
    /// drain, stop the poller, then drop every client so the store tasks
    /// finish their queues and exit.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down table session");
        let Self {
            cart,
            orders,
            catalog,
            checkout,
            device: _,
            push,
            views,
            outbound,
            store_handles,
            bridge_handle,
            poll_handle,
        } = self;

        drop(push);
        if let Err(e) = bridge_handle.await {
            error!("Event bridge task failed: {e:?}");
            return Err(format!("Event bridge task failed: {e:?}"));
        }

        poll_handle.abort();
        let _ = poll_handle.await;

        drop(checkout);
        drop(cart);
        drop(orders);
        drop(catalog);
        drop(views);
        drop(outbound);

        for handle in store_handles {
            if let Err(e) = handle.await {
                error!("Store task failed: {e:?}");
                return Err(format!("Store task failed: {e:?}"));
            }
        }

        info!("Table session shutdown complete");
        Ok(())
    }
}

/// Refresh the order list on a fixed cadence, independent of push events.
/// The first tick fires immediately. Stops when the store goes away.
async fn poll_orders(orders: OrdersClient, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        match orders.refresh().await {
            Ok(_) => {}
            Err(SyncError::StoreClosed) | Err(SyncError::StoreDropped) => break,
            Err(error) => warn!(%error, "Scheduled order refresh failed"),
        }
    }
    debug!("Order polling stopped");
}
