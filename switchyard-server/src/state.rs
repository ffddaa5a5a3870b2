//! Application state shared across all request handlers.

use crate::config::runtime::SharedConfig;
use std::sync::Arc;
use switchyard_core::broadcast::EventBroadcaster;
use switchyard_core::registry::{ChannelRegistry, InMemoryRegistry};
use switchyard_core::store::{FlagStore, InMemoryFlagStore, RetentionPolicy};

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Flag definitions.
    pub store: Arc<dyn FlagStore>,
    /// Client key → live delivery channel.
    pub registry: Arc<dyn ChannelRegistry>,
    /// Fan-out of flag change events to subscribed clients.
    pub broadcaster: EventBroadcaster,
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: SharedConfig,
}

impl AppState {
    /// Create a new AppState with in-memory backends.
    pub fn new(retention: RetentionPolicy, config: SharedConfig) -> Self {
        let registry: Arc<dyn ChannelRegistry> = Arc::new(InMemoryRegistry::new());
        Self {
            store: Arc::new(InMemoryFlagStore::new(retention)),
            broadcaster: EventBroadcaster::new(registry.clone()),
            registry,
            config,
        }
    }
}
