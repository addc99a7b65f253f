use std::sync::Arc;

use crate::integrations::ProviderRegistry;
use crate::store::Store;

/// Shared application state handed to every handler. Immutable after
/// startup; all per-request mutation happens in the request context.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub providers: Arc<ProviderRegistry>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            providers: Arc::new(ProviderRegistry::from_config()),
        }
    }
}
