//! # Menu Catalog Store
//!
//! Client-side cache of the menu. Loaded once per session, invalidated
//! wholesale when the menu changes upstream, and patched in place for the
//! one high-frequency case that does not warrant a round trip: a single
//! item's availability flipping while guests are browsing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::SyncError;
use crate::model::{MenuItem, MenuItemId};

use super::{request, Respond, ViewEvent, ViewSender};

/// Snapshot of the cached catalog for rendering.
#[derive(Debug, Clone)]
pub struct MenuView {
    pub items: Vec<MenuItem>,
    /// True when the most recent refresh failed and `items` is the last
    /// successfully fetched catalog.
    pub last_refresh_failed: bool,
}

#[derive(Debug)]
pub(crate) enum CatalogRequest {
    Refresh {
        respond_to: Respond<Result<MenuView, SyncError>>,
    },
    PatchAvailability {
        item_id: MenuItemId,
        available: bool,
        respond_to: Respond<MenuView>,
    },
    Snapshot {
        respond_to: Respond<MenuView>,
    },
}

/// Dependencies injected when the store task starts.
pub struct CatalogContext {
    pub backend: Arc<dyn Backend>,
    pub views: ViewSender,
}

/// The store task. Create it paired with its client, then spawn `run`.
pub struct CatalogStore {
    receiver: mpsc::Receiver<CatalogRequest>,
    items: Vec<MenuItem>,
    last_refresh_failed: bool,
}

impl CatalogStore {
    pub fn new(buffer: usize) -> (Self, CatalogClient) {
        let (sender, receiver) = mpsc::channel(buffer);
        let store = Self {
            receiver,
            items: Vec::new(),
            last_refresh_failed: false,
        };
        (store, CatalogClient { sender })
    }

    pub async fn run(mut self, ctx: CatalogContext) {
        info!("Catalog store started");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CatalogRequest::Refresh { respond_to } => {
                    let result = self.refresh(&ctx).await;
                    let _ = respond_to.send(result);
                }
                CatalogRequest::PatchAvailability {
                    item_id,
                    available,
                    respond_to,
                } => {
                    let view = self.patch_availability(&ctx, item_id, available);
                    let _ = respond_to.send(view);
                }
                CatalogRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(self.view());
                }
            }
        }
        info!(items = self.items.len(), "Catalog store stopped");
    }

    fn view(&self) -> MenuView {
        MenuView {
            items: self.items.clone(),
            last_refresh_failed: self.last_refresh_failed,
        }
    }

    async fn refresh(&mut self, ctx: &CatalogContext) -> Result<MenuView, SyncError> {
        match ctx.backend.fetch_menu().await {
            Ok(items) => {
                debug!(count = items.len(), "Catalog replaced");
                self.items = items;
                self.last_refresh_failed = false;
                let view = self.view();
                let _ = ctx.views.send(ViewEvent::Menu(view.clone()));
                Ok(view)
            }
            Err(error) => {
                warn!(%error, "Catalog refresh failed, keeping previous catalog");
                self.last_refresh_failed = true;
                let view = self.view();
                let _ = ctx.views.send(ViewEvent::Menu(view));
                Err(SyncError::Api(error))
            }
        }
    }

    /// Patch one cached item's availability without a re-fetch. An item the
    /// cache has never seen is logged and skipped; the next full load will
    /// carry the correct flag anyway.
    fn patch_availability(
        &mut self,
        ctx: &CatalogContext,
        item_id: MenuItemId,
        available: bool,
    ) -> MenuView {
        match self.items.iter_mut().find(|item| item.id == item_id) {
            Some(item) => {
                item.available = available;
                debug!(item = %item_id, available, "Availability patched");
                let view = self.view();
                let _ = ctx.views.send(ViewEvent::Menu(view.clone()));
                view
            }
            None => {
                warn!(item = %item_id, "Availability update for an item not in the cached catalog");
                self.view()
            }
        }
    }
}

/// Type-safe handle to the catalog store. Cheap to clone and share.
#[derive(Clone)]
pub struct CatalogClient {
    sender: mpsc::Sender<CatalogRequest>,
}

impl CatalogClient {
    /// Re-fetch the menu wholesale. On failure the previous catalog stays
    /// cached and the error is returned.
    pub async fn refresh(&self) -> Result<MenuView, SyncError> {
        request(&self.sender, |respond_to| CatalogRequest::Refresh { respond_to }).await?
    }

    /// Patch one item's availability in the cache. Unknown items are
    /// ignored (with a warning); this call never fails on content.
    pub async fn patch_availability(
        &self,
        item_id: MenuItemId,
        available: bool,
    ) -> Result<MenuView, SyncError> {
        request(&self.sender, |respond_to| CatalogRequest::PatchAvailability {
            item_id,
            available,
            respond_to,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<MenuView, SyncError> {
        request(&self.sender, |respond_to| CatalogRequest::Snapshot { respond_to }).await
    }
}
