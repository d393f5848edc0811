//! # tableside-sync
//!
//! The headless reconciliation engine of a table-ordering system: everything
//! a customer terminal needs to keep its local picture of the world honest,
//! with rendering, transport, and the backend all held at arm's length
//! behind seams.
//!
//! ## The Three Sources of Truth
//!
//! A terminal juggles three kinds of state that drift at different speeds:
//!
//! 1. **The cart** ([`stores::cart`]) is local truth. Only this device can
//!    change it, and the server first hears about it at submit time.
//! 2. **The order list** ([`stores::orders`]) is server truth, mirrored.
//!    The engine re-fetches it on push events and on a timer, and replaces
//!    it wholesale every time; the one local liberty taken is dropping
//!    freshly paid orders before the server catches up.
//! 3. **The menu catalog** ([`stores::catalog`]) is server truth, cached.
//!    Invalidated wholesale when the menu changes, patched in place when a
//!    single item sells out.
//!
//! ## Architecture
//!
//! Each store runs as its own task, processing requests from an mpsc channel
//! one at a time, with replies on oneshot channels. Sequential processing
//! within a store removes every locking question: a poll-triggered refresh
//! and a push-triggered refresh can overlap in flight, but their results
//! apply in order, last one wins. Cheap-to-clone typed clients
//! ([`stores::cart::CartClient`], [`stores::orders::OrdersClient`],
//! [`stores::catalog::CatalogClient`]) are the only way in.
//!
//! Dependencies are injected when a store task starts (its context), not
//! when it is constructed, so wiring order never fights the dependency
//! graph.
//!
//! On top of the stores sit two coordinators:
//!
//! - [`bridge::EventBridge`] maps named push notifications to store
//!   operations. Handlers are idempotent and fail-soft; the transport is
//!   just an mpsc channel someone feeds.
//! - [`checkout::Checkout`] drives the payment flow through an explicit
//!   state machine with a pure reducer, so an illegal move (double confirm)
//!   is a typed error instead of a latent bug.
//!
//! The backend is the [`backend::Backend`] trait; tests use
//! [`backend::mock::MockBackend`] to script responses and inject failures.
//!
//! ## What This Crate Does Not Do
//!
//! No HTML, no HTTP client, no websocket. The embedding application renders
//! [`stores::ViewEvent`] snapshots, implements [`backend::Backend`] over its
//! transport of choice, and pumps push notifications into the bridge.

pub mod auth;
pub mod backend;
pub mod bridge;
pub mod checkout;
pub mod device;
pub mod error;
pub mod model;
pub mod stores;
pub mod tracing;

pub use backend::{ApiError, Backend};
pub use bridge::{EventBridge, OutboundEvent, OutboundReceiver, OutboundSender, PushEvent};
pub use checkout::{Checkout, CheckoutError, PaymentFlow, PaymentInput};
pub use device::DeviceStore;
pub use error::SyncError;
pub use stores::{ViewEvent, ViewReceiver, ViewSender};
