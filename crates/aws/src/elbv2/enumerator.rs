use std::pin::pin;
use std::sync::Arc;

use async_trait::async_trait;
use cloudsweep_core::{Resource, ResourceError, ResourceLister};
use futures::StreamExt;
use tracing::{debug, error, info, instrument};

use super::api::{Elbv2Api, Listener};
use super::listener_rule::{KIND, ListenerRule};
use super::load_balancer::{LoadBalancer, list_load_balancers};
use super::pagination::paginate;
use crate::config::DEFAULT_RULE_PAGE_SIZE;

/// A part of the load balancer → listener → rule tree that could not be read.
#[derive(Debug)]
pub enum BranchFailure {
    /// Listing listeners of a load balancer failed.
    Listeners {
        load_balancer_arn: String,
        error: ResourceError,
    },
    /// Listing rules of a listener failed.
    Rules {
        listener_arn: String,
        error: ResourceError,
    },
}

impl BranchFailure {
    /// ARN of the parent whose children could not be listed.
    pub fn parent_arn(&self) -> &str {
        match self {
            Self::Listeners {
                load_balancer_arn, ..
            } => load_balancer_arn,
            Self::Rules { listener_arn, .. } => listener_arn,
        }
    }

    pub fn error(&self) -> &ResourceError {
        match self {
            Self::Listeners { error, .. } | Self::Rules { error, .. } => error,
        }
    }
}

/// Outcome of one enumeration pass.
///
/// `rules` is the best-effort union of every reachable non-default rule. An
/// empty `failures` list means no branch failed, not that the account was read
/// in full: rules created mid-scan may still be missed.
#[derive(Debug, Default)]
pub struct Enumeration {
    pub rules: Vec<ListenerRule>,
    pub failures: Vec<BranchFailure>,
}

/// Walks load balancers, their listeners and the listeners' rules.
///
/// Load balancers are visited in the order given and listeners in the order
/// the provider returns them; rules of one listener keep provider order. A
/// failure below a load balancer or listener drops that branch only.
#[derive(Debug, Clone, Copy)]
pub struct ListenerRuleEnumerator {
    rule_page_size: i32,
}

impl Default for ListenerRuleEnumerator {
    fn default() -> Self {
        Self::new(DEFAULT_RULE_PAGE_SIZE)
    }
}

impl ListenerRuleEnumerator {
    pub fn new(rule_page_size: i32) -> Self {
        Self { rule_page_size }
    }

    pub fn rule_page_size(&self) -> i32 {
        self.rule_page_size
    }

    /// Discover the deletable rules under `load_balancers`.
    pub async fn enumerate(&self, load_balancers: &[Arc<LoadBalancer>]) -> Vec<ListenerRule> {
        self.run(load_balancers).await.rules
    }

    /// Like [`enumerate`](Self::enumerate), but also reports which branches
    /// failed.
    pub async fn run(&self, load_balancers: &[Arc<LoadBalancer>]) -> Enumeration {
        let mut outcome = Enumeration::default();
        for load_balancer in load_balancers {
            self.walk_load_balancer(load_balancer, &mut outcome).await;
        }
        info!(
            count = outcome.rules.len(),
            failed_branches = outcome.failures.len(),
            "enumerated listener rules"
        );
        outcome
    }

    #[instrument(skip_all, fields(load_balancer_arn = %load_balancer.arn()))]
    async fn walk_load_balancer(
        &self,
        load_balancer: &Arc<LoadBalancer>,
        outcome: &mut Enumeration,
    ) {
        let client = load_balancer.client();
        let mut pages = pin!(paginate(|marker| {
            let client = Arc::clone(client);
            let arn = load_balancer.arn().to_owned();
            async move { client.describe_listeners(&arn, marker).await }
        }));

        // Listeners from pages fetched before a failure are still walked.
        while let Some(page) = pages.next().await {
            match page {
                Ok(listeners) => {
                    for listener in listeners {
                        self.walk_listener(load_balancer, &listener, outcome).await;
                    }
                }
                Err(e) => {
                    error!(
                        error = %e,
                        load_balancer_arn = %load_balancer.arn(),
                        "failed to list listeners for load balancer"
                    );
                    outcome.failures.push(BranchFailure::Listeners {
                        load_balancer_arn: load_balancer.arn().to_owned(),
                        error: e,
                    });
                }
            }
        }
    }

    #[instrument(skip_all, fields(listener_arn = %listener.arn))]
    async fn walk_listener(
        &self,
        load_balancer: &Arc<LoadBalancer>,
        listener: &Listener,
        outcome: &mut Enumeration,
    ) {
        let client = load_balancer.client();
        let page_size = self.rule_page_size;
        let mut pages = pin!(paginate(|marker| {
            let client = Arc::clone(client);
            let arn = listener.arn.clone();
            async move { client.describe_rules(&arn, page_size, marker).await }
        }));

        while let Some(page) = pages.next().await {
            match page {
                Ok(rules) => {
                    let before = outcome.rules.len();
                    outcome.rules.extend(rules.into_iter().filter_map(|rule| {
                        ListenerRule::new(Arc::clone(load_balancer), listener.arn.clone(), rule)
                    }));
                    debug!(count = outcome.rules.len() - before, "collected listener rules");
                }
                Err(e) => {
                    error!(
                        error = %e,
                        listener_arn = %listener.arn,
                        "failed to list listener rules for listener"
                    );
                    outcome.failures.push(BranchFailure::Rules {
                        listener_arn: listener.arn.clone(),
                        error: e,
                    });
                }
            }
        }
    }
}

/// Registry entry point for [`KIND`]: resolves the account's load balancers,
/// then enumerates their listener rules.
pub struct ListenerRuleLister {
    client: Arc<dyn Elbv2Api>,
    enumerator: ListenerRuleEnumerator,
}

impl std::fmt::Debug for ListenerRuleLister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRuleLister")
            .field("client", &"<Elbv2Api>")
            .field("enumerator", &self.enumerator)
            .finish()
    }
}

impl ListenerRuleLister {
    pub fn new(client: Arc<dyn Elbv2Api>, enumerator: ListenerRuleEnumerator) -> Self {
        Self { client, enumerator }
    }
}

#[async_trait]
impl ResourceLister for ListenerRuleLister {
    #[instrument(skip(self), fields(kind = KIND))]
    async fn list(&self) -> Result<Vec<Box<dyn Resource>>, ResourceError> {
        let load_balancers = list_load_balancers(&self.client).await?;
        let rules = self.enumerator.enumerate(&load_balancers).await;
        Ok(rules
            .into_iter()
            .map(|rule| Box::new(rule) as Box<dyn Resource>)
            .collect())
    }
}
