use std::fmt;

use async_trait::async_trait;

use crate::error::ResourceError;
use crate::properties::Properties;

/// A discovered, addressable cloud resource that can be described and removed.
///
/// Every resource kind implements this flat contract; kinds share no other
/// behavior. `Display` must produce a short human-readable identifier that an
/// operator can match against the provider console.
#[async_trait]
pub trait Resource: fmt::Display + Send + Sync {
    /// Name of the resource kind this resource belongs to.
    fn kind(&self) -> &'static str;

    /// Metadata used by upstream filters and reports. Must not perform I/O.
    fn properties(&self) -> Properties;

    /// Delete the resource remotely.
    ///
    /// Exactly one remote call is issued; failures are returned to the caller
    /// untouched. Calling this on a resource that no longer exists fails the
    /// way the provider dictates.
    async fn remove(&self) -> Result<(), ResourceError>;
}

/// Entry point that discovers every live resource of one kind.
///
/// Listers are registered once per kind in the
/// [`ResourceKindRegistry`](crate::registry::ResourceKindRegistry). A lister
/// returns an error only when its input set cannot be resolved at all; failures
/// scoped to part of the resource tree are logged and skipped.
#[async_trait]
pub trait ResourceLister: Send + Sync {
    async fn list(&self) -> Result<Vec<Box<dyn Resource>>, ResourceError>;
}
