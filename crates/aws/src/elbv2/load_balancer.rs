use std::collections::HashMap;
use std::fmt;
use std::pin::pin;
use std::sync::Arc;

use cloudsweep_core::ResourceError;
use futures::StreamExt;
use tracing::{debug, instrument};

use super::api::{Elbv2Api, LoadBalancerSummary, MAX_TAG_ARNS_PER_CALL, Tag};
use super::pagination::paginate;

/// Read-only snapshot of an application or network load balancer.
///
/// Carries the client every call scoped to this load balancer goes through.
/// Snapshots are shared with the rule handles discovered under them.
pub struct LoadBalancer {
    arn: String,
    name: String,
    tags: Vec<Tag>,
    client: Arc<dyn Elbv2Api>,
}

impl fmt::Debug for LoadBalancer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadBalancer")
            .field("arn", &self.arn)
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("client", &"<Elbv2Api>")
            .finish()
    }
}

impl fmt::Display for LoadBalancer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl LoadBalancer {
    pub fn new(
        arn: impl Into<String>,
        name: impl Into<String>,
        client: Arc<dyn Elbv2Api>,
    ) -> Self {
        Self {
            arn: arn.into(),
            name: name.into(),
            tags: Vec::new(),
            client,
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn arn(&self) -> &str {
        &self.arn
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn client(&self) -> &Arc<dyn Elbv2Api> {
        &self.client
    }
}

/// Resolve every load balancer in the account together with its tags.
///
/// Unlike listener and rule discovery, any failure here is returned: without
/// the load-balancer set there is nothing to enumerate.
#[instrument(skip(client))]
pub async fn list_load_balancers(
    client: &Arc<dyn Elbv2Api>,
) -> Result<Vec<Arc<LoadBalancer>>, ResourceError> {
    let mut summaries: Vec<LoadBalancerSummary> = Vec::new();
    let mut pages = pin!(paginate(|marker| {
        let client = Arc::clone(client);
        async move { client.describe_load_balancers(marker).await }
    }));
    while let Some(page) = pages.next().await {
        summaries.extend(page?);
    }

    let arns: Vec<String> = summaries.iter().map(|lb| lb.arn.clone()).collect();
    let mut tags_by_arn: HashMap<String, Vec<Tag>> = HashMap::with_capacity(arns.len());
    for chunk in arns.chunks(MAX_TAG_ARNS_PER_CALL) {
        for description in client.describe_tags(chunk).await? {
            tags_by_arn.insert(description.resource_arn, description.tags);
        }
    }

    debug!(count = summaries.len(), "resolved load balancers");

    Ok(summaries
        .into_iter()
        .map(|summary| {
            let tags = tags_by_arn.remove(&summary.arn).unwrap_or_default();
            Arc::new(
                LoadBalancer::new(summary.arn, summary.name, Arc::clone(client)).with_tags(tags),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elbv2::mock::MockElbv2;

    #[test]
    fn display_is_the_name() {
        let client: Arc<dyn Elbv2Api> = Arc::new(MockElbv2::new());
        let lb = LoadBalancer::new("arn:lb/app/web/1", "web", client);
        assert_eq!(lb.to_string(), "web");
        assert!(format!("{lb:?}").contains("<Elbv2Api>"));
    }

    #[tokio::test]
    async fn lists_load_balancers_with_tags() {
        let mock = MockElbv2::new()
            .with_load_balancer("arn:lb/1", "web", vec![Tag::new("env", "prod")])
            .with_load_balancer("arn:lb/2", "api", vec![]);
        let client: Arc<dyn Elbv2Api> = Arc::new(mock);

        let lbs = list_load_balancers(&client).await.unwrap();
        assert_eq!(lbs.len(), 2);
        assert_eq!(lbs[0].name(), "web");
        assert_eq!(lbs[0].tags(), &[Tag::new("env", "prod")]);
        assert_eq!(lbs[1].arn(), "arn:lb/2");
        assert!(lbs[1].tags().is_empty());
    }

    #[tokio::test]
    async fn tag_lookups_are_batched() {
        let mut mock = MockElbv2::new();
        for i in 0..45 {
            mock = mock.with_load_balancer(format!("arn:lb/{i}"), format!("lb-{i}"), vec![]);
        }
        let mock = Arc::new(mock.with_page_size(10));
        let client: Arc<dyn Elbv2Api> = mock.clone();

        let lbs = list_load_balancers(&client).await.unwrap();
        assert_eq!(lbs.len(), 45);
        assert_eq!(mock.calls("DescribeLoadBalancers"), 5);
        assert_eq!(mock.calls("DescribeTags"), 3);
    }

    #[tokio::test]
    async fn failure_is_propagated() {
        let mock = MockElbv2::new()
            .with_load_balancer("arn:lb/1", "web", vec![])
            .failing_load_balancers();
        let client: Arc<dyn Elbv2Api> = Arc::new(mock);

        let err = list_load_balancers(&client).await.unwrap_err();
        assert!(matches!(err, ResourceError::Remote { .. }));
    }
}
