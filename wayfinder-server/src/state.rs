use std::sync::Arc;

use tokio::sync::Semaphore;
use wayfinder_core::{FacilityStore, NodeSelection};

use crate::config::ServerConfig;

/// Shared by every handler; the store is only ever read
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FacilityStore + Send + Sync>,
    pub selection: NodeSelection,
    /// Permits for route computations on the blocking pool. A permit is held
    /// until the computation returns, even if its request already timed out.
    pub blocking: Arc<Semaphore>,
}

impl AppState {
    pub fn new<S>(store: S, config: &ServerConfig) -> Self
    where
        S: FacilityStore + Send + Sync + 'static,
    {
        Self {
            store: Arc::new(store),
            selection: config.selection,
            blocking: Arc::new(Semaphore::new(config.max_concurrent_requests)),
        }
    }
}
