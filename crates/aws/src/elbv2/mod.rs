//! ELBv2 listener rules.
//!
//! Discovery walks load balancer → listener → rule through the paginated
//! ELBv2 API. Default rules are skipped because they cannot be deleted apart
//! from their listener; any other rule becomes a [`ListenerRule`] handle.

pub mod api;
pub mod cancel;
pub mod client;
pub mod enumerator;
pub mod listener_rule;
pub mod load_balancer;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod pagination;

use std::sync::Arc;

use cloudsweep_core::{RegistryBuilder, RegistryError};

pub use api::{Elbv2Api, Listener, LoadBalancerSummary, Page, Rule, Tag, TagDescription};
pub use cancel::CancellableElbv2;
pub use client::SdkElbv2Client;
pub use enumerator::{BranchFailure, Enumeration, ListenerRuleEnumerator, ListenerRuleLister};
pub use listener_rule::{KIND, ListenerRule};
pub use load_balancer::{LoadBalancer, list_load_balancers};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockElbv2;

use crate::config::Elbv2Config;

/// Register the [`KIND`] lister, backed by `client`.
pub fn register(
    builder: RegistryBuilder,
    client: Arc<dyn Elbv2Api>,
    config: &Elbv2Config,
) -> Result<RegistryBuilder, RegistryError> {
    let enumerator = ListenerRuleEnumerator::new(config.rule_page_size);
    builder.register(KIND, Arc::new(ListenerRuleLister::new(client, enumerator)))
}
