//! Shared contract for cloudsweep resource kinds.
//!
//! A resource kind is a [`ResourceLister`] registered by name in the
//! [`ResourceKindRegistry`]. Listers produce [`Resource`] handles that an
//! orchestrator can describe through [`Properties`] and remove.

pub mod error;
pub mod properties;
pub mod registry;
pub mod resource;

pub use error::{RegistryError, ResourceError};
pub use properties::{Properties, TAG_PREFIX};
pub use registry::{RegistryBuilder, ResourceKindRegistry, global, install_global};
pub use resource::{Resource, ResourceLister};
