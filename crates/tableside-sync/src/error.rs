//! # Engine Errors
//!
//! The common error type for talking to the store tasks. Store-specific
//! failure detail travels inside `Api`; the two channel variants mean the
//! store task itself is gone, which only happens during shutdown.

use crate::backend::ApiError;

/// Errors that can occur when sending a request to a store task.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("store task stopped")]
    StoreClosed,
    #[error("store dropped the response channel")]
    StoreDropped,
    #[error("backend request failed: {0}")]
    Api(#[from] ApiError),
}
