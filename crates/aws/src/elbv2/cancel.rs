use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use cloudsweep_core::ResourceError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::api::{Elbv2Api, Listener, LoadBalancerSummary, Page, Rule, TagDescription};

/// Decorates an [`Elbv2Api`] so every call aborts once `token` is cancelled.
///
/// The in-flight request is dropped and [`ResourceError::Cancelled`] is
/// returned, which enumeration treats like any other branch failure.
pub struct CancellableElbv2 {
    inner: Arc<dyn Elbv2Api>,
    token: CancellationToken,
}

impl CancellableElbv2 {
    pub fn new(inner: Arc<dyn Elbv2Api>, token: CancellationToken) -> Self {
        Self { inner, token }
    }

    async fn guard<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, ResourceError>>,
    ) -> Result<T, ResourceError> {
        tokio::select! {
            biased;
            () = self.token.cancelled() => {
                debug!(operation, "ELBv2 call cancelled");
                Err(ResourceError::Cancelled)
            }
            result = call => result,
        }
    }
}

#[async_trait]
impl Elbv2Api for CancellableElbv2 {
    async fn describe_load_balancers(
        &self,
        marker: Option<String>,
    ) -> Result<Page<LoadBalancerSummary>, ResourceError> {
        self.guard(
            "DescribeLoadBalancers",
            self.inner.describe_load_balancers(marker),
        )
        .await
    }

    async fn describe_tags(&self, arns: &[String]) -> Result<Vec<TagDescription>, ResourceError> {
        self.guard("DescribeTags", self.inner.describe_tags(arns))
            .await
    }

    async fn describe_listeners(
        &self,
        load_balancer_arn: &str,
        marker: Option<String>,
    ) -> Result<Page<Listener>, ResourceError> {
        self.guard(
            "DescribeListeners",
            self.inner.describe_listeners(load_balancer_arn, marker),
        )
        .await
    }

    async fn describe_rules(
        &self,
        listener_arn: &str,
        page_size: i32,
        marker: Option<String>,
    ) -> Result<Page<Rule>, ResourceError> {
        self.guard(
            "DescribeRules",
            self.inner.describe_rules(listener_arn, page_size, marker),
        )
        .await
    }

    async fn delete_rule(&self, rule_arn: &str) -> Result<(), ResourceError> {
        self.guard("DeleteRule", self.inner.delete_rule(rule_arn))
            .await
    }
}
