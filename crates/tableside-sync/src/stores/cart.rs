//! # Cart Store
//!
//! Pending order lines for one table, held only in memory: an abandoned
//! session abandons the cart, and a submitted cart is cleared only after the
//! server confirms the order. The total is recomputed from the lines on
//! every snapshot, never maintained incrementally, so it cannot go stale.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::model::{CartLine, MenuItem};

use super::{request, Respond, ViewEvent, ViewSender};

/// Snapshot of the cart for rendering.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: f64,
}

impl CartView {
    fn of(lines: &[CartLine]) -> Self {
        Self {
            lines: lines.to_vec(),
            total: lines.iter().map(CartLine::line_total).sum(),
        }
    }
}

#[derive(Debug)]
pub(crate) enum CartRequest {
    Add {
        item: MenuItem,
        quantity: u32,
        respond_to: Respond<CartView>,
    },
    Remove {
        index: usize,
        respond_to: Respond<CartView>,
    },
    SetNotes {
        index: usize,
        notes: String,
        respond_to: Respond<CartView>,
    },
    Clear {
        respond_to: Respond<CartView>,
    },
    Snapshot {
        respond_to: Respond<CartView>,
    },
}

/// The store task. Create it paired with its client, then spawn `run`.
pub struct CartStore {
    receiver: mpsc::Receiver<CartRequest>,
    lines: Vec<CartLine>,
}

impl CartStore {
    pub fn new(buffer: usize) -> (Self, CartClient) {
        let (sender, receiver) = mpsc::channel(buffer);
        let store = Self {
            receiver,
            lines: Vec::new(),
        };
        (store, CartClient { sender })
    }

    /// Process requests until every client is dropped. Mutations publish a
    /// fresh snapshot on `views`; reads do not.
    pub async fn run(mut self, views: ViewSender) {
        info!("Cart store started");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CartRequest::Add {
                    item,
                    quantity,
                    respond_to,
                } => {
                    self.add(item, quantity);
                    self.publish(&views, respond_to);
                }
                CartRequest::Remove { index, respond_to } => {
                    self.remove(index);
                    self.publish(&views, respond_to);
                }
                CartRequest::SetNotes {
                    index,
                    notes,
                    respond_to,
                } => {
                    self.set_notes(index, notes);
                    self.publish(&views, respond_to);
                }
                CartRequest::Clear { respond_to } => {
                    self.lines.clear();
                    debug!("Cart cleared");
                    self.publish(&views, respond_to);
                }
                CartRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(CartView::of(&self.lines));
                }
            }
        }
        info!(lines = self.lines.len(), "Cart store stopped");
    }

    fn publish(&self, views: &ViewSender, respond_to: Respond<CartView>) {
        let view = CartView::of(&self.lines);
        let _ = views.send(ViewEvent::Cart(view.clone()));
        let _ = respond_to.send(view);
    }

    fn add(&mut self, item: MenuItem, quantity: u32) {
        if quantity < 1 {
            debug!(item = %item.id, "Ignoring add with zero quantity");
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.menu_item_id == item.id) {
            line.quantity += quantity;
            debug!(item = %item.id, quantity = line.quantity, "Merged into existing cart line");
        } else {
            let unit_price = item.effective_price();
            self.lines.push(CartLine {
                menu_item_id: item.id,
                display_name: item.name,
                unit_price,
                quantity,
                notes: String::new(),
            });
            debug!(lines = self.lines.len(), "Cart line added");
        }
    }

    fn remove(&mut self, index: usize) {
        if index < self.lines.len() {
            let line = self.lines.remove(index);
            debug!(item = %line.menu_item_id, "Cart line removed");
        } else {
            warn!(index, "Ignoring removal of a stale cart index");
        }
    }

    fn set_notes(&mut self, index: usize, notes: String) {
        match self.lines.get_mut(index) {
            Some(line) => line.notes = notes,
            None => warn!(index, "Ignoring notes for a stale cart index"),
        }
    }
}

/// Type-safe handle to the cart store. Cheap to clone and share.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
}

impl CartClient {
    /// Add `quantity` of `item`, merging into an existing line for the same
    /// menu item. A quantity below one leaves the cart unchanged.
    pub async fn add(&self, item: MenuItem, quantity: u32) -> Result<CartView, SyncError> {
        request(&self.sender, |respond_to| CartRequest::Add {
            item,
            quantity,
            respond_to,
        })
        .await
    }

    /// Remove the line at `index`. A stale index is ignored.
    pub async fn remove(&self, index: usize) -> Result<CartView, SyncError> {
        request(&self.sender, |respond_to| CartRequest::Remove { index, respond_to }).await
    }

    /// Overwrite the notes on the line at `index`.
    pub async fn set_notes(
        &self,
        index: usize,
        notes: impl Into<String>,
    ) -> Result<CartView, SyncError> {
        let notes = notes.into();
        request(&self.sender, |respond_to| CartRequest::SetNotes {
            index,
            notes,
            respond_to,
        })
        .await
    }

    /// Empty the cart. Called after a confirmed submit or on explicit user
    /// action.
    pub async fn clear(&self) -> Result<CartView, SyncError> {
        request(&self.sender, |respond_to| CartRequest::Clear { respond_to }).await
    }

    pub async fn snapshot(&self) -> Result<CartView, SyncError> {
        request(&self.sender, |respond_to| CartRequest::Snapshot { respond_to }).await
    }

    pub async fn total(&self) -> Result<f64, SyncError> {
        Ok(self.snapshot().await?.total)
    }
}
