//! Lookup of generation backends by provider id

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::ProviderKind;
use crate::ports::TagProvider;

/// Providers keyed by kind; at most one per kind
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn TagProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any previous one of the same kind
    pub fn insert(&mut self, kind: ProviderKind, provider: Arc<dyn TagProvider>) {
        self.providers.insert(kind, provider);
    }

    pub fn with(mut self, kind: ProviderKind, provider: Arc<dyn TagProvider>) -> Self {
        self.insert(kind, provider);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn TagProvider>> {
        self.providers.get(&kind).cloned()
    }

    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Registered kinds in a stable order
    pub fn kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.providers.contains_key(kind))
            .collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.kinds())
            .finish()
    }
}
