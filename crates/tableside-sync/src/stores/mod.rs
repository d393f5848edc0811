//! # State Stores
//!
//! Each store owns one piece of client state and runs as a single task that
//! processes its request channel sequentially. That sequencing is the whole
//! concurrency story: a store never interleaves two mutations, so overlapping
//! requests from UI handlers, the poller, and the event bridge serialize in
//! arrival order without any locking.
//!
//! Stores publish a full snapshot on the shared view channel after every
//! mutation. Consumers re-render from the snapshot wholesale; there is no
//! diffing and no incremental bookkeeping to drift out of sync.
//!
//! The split mirrors who owns the data:
//!
//! - [`cart`] holds the unsubmitted order lines this device is composing.
//! - [`orders`] mirrors the server's view of the table's open orders.
//! - [`catalog`] caches the menu and patches availability in place.

pub mod cart;
pub mod catalog;
pub mod orders;

use tokio::sync::{mpsc, oneshot};

use crate::error::SyncError;

/// One-shot response channel carried by every store request.
pub(crate) type Respond<T> = oneshot::Sender<T>;

/// A full snapshot published after a store mutation. The embedding UI drains
/// these and re-renders; the engine never renders anything itself.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    Cart(cart::CartView),
    Orders(orders::OrdersView),
    Menu(catalog::MenuView),
    /// The device was reset remotely; the embedding UI must discard the
    /// session and reload from scratch.
    DeviceReset,
}

pub type ViewSender = mpsc::UnboundedSender<ViewEvent>;
pub type ViewReceiver = mpsc::UnboundedReceiver<ViewEvent>;

/// Send one request to a store task and await its response.
pub(crate) async fn request<Req, T>(
    sender: &mpsc::Sender<Req>,
    build: impl FnOnce(Respond<T>) -> Req,
) -> Result<T, SyncError> {
    let (respond_to, response) = oneshot::channel();
    sender
        .send(build(respond_to))
        .await
        .map_err(|_| SyncError::StoreClosed)?;
    response.await.map_err(|_| SyncError::StoreDropped)
}
