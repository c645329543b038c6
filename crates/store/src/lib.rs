//! Document store and repositories for Docflow.
//!
//! This crate provides:
//! - An in-memory store whose tables sit behind one writer lock
//! - Repositories that run each engine operation as a single unit of work
//!
//! Every repository method locks the store, reads what it needs, validates
//! through `docflow-core`, and only then writes. A failed operation leaves
//! the store exactly as it found it.

pub mod repositories;
mod state;

pub use repositories::{
    ConversionRepository, CreateQuotationInput, DocumentFilter, DocumentRepository,
    FulfillmentRepository, PaymentRecord, PaymentRepository, PricingRequestRepository,
};

use std::sync::Arc;

use docflow_shared::EngineConfig;
use tokio::sync::{Mutex, MutexGuard};

use crate::state::StoreState;

/// Shared handle to the document store.
///
/// Cloning is cheap; all clones see the same tables.
#[derive(Debug, Clone)]
pub struct Store {
    state: Arc<Mutex<StoreState>>,
    engine: Arc<EngineConfig>,
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new(engine: EngineConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            engine: Arc::new(engine),
        }
    }

    /// Engine settings used by conversions.
    #[must_use]
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Acquires the writer lock for one unit of work.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().await
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
