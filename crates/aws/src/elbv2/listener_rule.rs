use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use cloudsweep_core::{Properties, Resource, ResourceError};
use tracing::{info, instrument};

use super::api::Rule;
use super::load_balancer::LoadBalancer;

/// Resource-kind name under which listener rules are registered.
pub const KIND: &str = "ELBv2ListenerRule";

/// A deletable, non-default rule on an ELBv2 listener.
#[derive(Debug, Clone)]
pub struct ListenerRule {
    load_balancer: Arc<LoadBalancer>,
    listener_arn: String,
    rule: Rule,
}

impl ListenerRule {
    /// Build a handle for `rule`, or `None` if it is the listener's default
    /// rule. Default rules go away with their listener and are never handed
    /// out on their own.
    pub fn new(
        load_balancer: Arc<LoadBalancer>,
        listener_arn: impl Into<String>,
        rule: Rule,
    ) -> Option<Self> {
        if rule.is_default() {
            return None;
        }
        Some(Self {
            load_balancer,
            listener_arn: listener_arn.into(),
            rule,
        })
    }

    pub fn rule_arn(&self) -> &str {
        &self.rule.arn
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn listener_arn(&self) -> &str {
        &self.listener_arn
    }

    pub fn load_balancer(&self) -> &LoadBalancer {
        &self.load_balancer
    }
}

impl fmt::Display for ListenerRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.load_balancer, self.rule.arn)
    }
}

#[async_trait]
impl Resource for ListenerRule {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn properties(&self) -> Properties {
        self.load_balancer.tags().iter().fold(
            Properties::new()
                .set("ARN", self.rule.arn.clone())
                .set("ListenerARN", self.listener_arn.clone())
                .set("LoadBalancer", self.load_balancer.name()),
            |props, tag| props.set_tag(&tag.key, tag.value.clone()),
        )
    }

    #[instrument(skip(self), fields(rule_arn = %self.rule.arn))]
    async fn remove(&self) -> Result<(), ResourceError> {
        self.load_balancer
            .client()
            .delete_rule(&self.rule.arn)
            .await?;
        info!("deleted listener rule");
        Ok(())
    }
}
