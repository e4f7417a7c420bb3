use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::{debug, info};

use crate::error::RegistryError;
use crate::resource::ResourceLister;

static GLOBAL: OnceLock<ResourceKindRegistry> = OnceLock::new();

/// Collects resource-kind listers during startup.
///
/// Call [`build`](Self::build) once every kind is registered; the resulting
/// [`ResourceKindRegistry`] cannot be changed afterwards.
#[derive(Default)]
pub struct RegistryBuilder {
    listers: HashMap<String, Arc<dyn ResourceLister>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the lister for a resource kind.
    ///
    /// Each kind name may only be registered once.
    pub fn register(
        mut self,
        kind: impl Into<String>,
        lister: Arc<dyn ResourceLister>,
    ) -> Result<Self, RegistryError> {
        let kind = kind.into();
        if self.listers.contains_key(&kind) {
            return Err(RegistryError::DuplicateKind(kind));
        }
        debug!(kind = %kind, "registered resource kind");
        self.listers.insert(kind, lister);
        Ok(self)
    }

    pub fn build(self) -> ResourceKindRegistry {
        info!(count = self.listers.len(), "resource kind registry built");
        ResourceKindRegistry {
            listers: Arc::new(self.listers),
        }
    }
}

/// Immutable mapping from resource-kind name to its lister.
///
/// Cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct ResourceKindRegistry {
    listers: Arc<HashMap<String, Arc<dyn ResourceLister>>>,
}

impl std::fmt::Debug for ResourceKindRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceKindRegistry")
            .field("kinds", &self.names())
            .finish()
    }
}

impl ResourceKindRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn ResourceLister>> {
        self.listers.get(kind).cloned()
    }

    /// Like [`get`](Self::get), but reports an unknown kind as an error.
    pub fn lister(&self, kind: &str) -> Result<Arc<dyn ResourceLister>, RegistryError> {
        self.get(kind)
            .ok_or_else(|| RegistryError::UnknownKind(kind.to_owned()))
    }

    /// Registered kind names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.listers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.listers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listers.is_empty()
    }
}

/// Install `registry` as the process-wide registry.
///
/// Succeeds only once per process.
pub fn install_global(registry: ResourceKindRegistry) -> Result<(), RegistryError> {
    GLOBAL
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)
}

/// The process-wide registry, if one has been installed.
pub fn global() -> Option<&'static ResourceKindRegistry> {
    GLOBAL.get()
}
