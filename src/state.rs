//! Shared application state
//!
//! Long-lived backend handles, acquired at startup and injected into every
//! request.

use std::sync::Arc;

use crate::cache::BalanceCache;
use crate::messaging::MessagePublisher;
use crate::store::TransactionStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TransactionStore>,
    pub publisher: Arc<dyn MessagePublisher>,
    pub cache: Arc<dyn BalanceCache>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        publisher: Arc<dyn MessagePublisher>,
        cache: Arc<dyn BalanceCache>,
    ) -> Self {
        Self {
            store,
            publisher,
            cache,
        }
    }
}
