pub mod memory;
pub mod notify;
pub mod store;

use std::sync::Arc;

use shared_config::AppConfig;

use crate::memory::InMemoryStore;
use crate::notify::{LogDispatcher, NotificationDispatcher};
use crate::store::SchedulingStore;

/// Shared router state handed to every cell.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn SchedulingStore>,
    pub notifier: Arc<dyn NotificationDispatcher>,
}

impl AppState {
    pub fn in_memory(config: AppConfig) -> Self {
        Self {
            config,
            store: Arc::new(InMemoryStore::new()),
            notifier: Arc::new(LogDispatcher),
        }
    }
}
