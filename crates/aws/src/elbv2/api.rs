//! The slice of the ELBv2 API that listener-rule discovery depends on.

use async_trait::async_trait;
use cloudsweep_core::ResourceError;

/// Maximum number of ARNs `DescribeTags` accepts per call.
pub const MAX_TAG_ARNS_PER_CALL: usize = 20;

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation marker; `None` when the provider has no further pages.
    pub next_marker: Option<String>,
}

impl<T> Page<T> {
    /// A page with no continuation marker.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_marker: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancerSummary {
    pub arn: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Tags attached to one resource, as returned by `DescribeTags`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDescription {
    pub resource_arn: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub arn: String,
    pub load_balancer_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub arn: String,
    /// Whether this is the listener's default rule. The provider may omit it.
    pub is_default: Option<bool>,
}

impl Rule {
    /// Default rules are owned by their listener and cannot be deleted on
    /// their own. An absent marker counts as non-default.
    pub fn is_default(&self) -> bool {
        self.is_default == Some(true)
    }
}

/// Remote ELBv2 operations, one method per API call.
///
/// Implemented over the AWS SDK by
/// [`SdkElbv2Client`](super::client::SdkElbv2Client) and in memory by
/// [`MockElbv2`](super::mock::MockElbv2).
#[async_trait]
pub trait Elbv2Api: Send + Sync {
    async fn describe_load_balancers(
        &self,
        marker: Option<String>,
    ) -> Result<Page<LoadBalancerSummary>, ResourceError>;

    /// Tags for up to [`MAX_TAG_ARNS_PER_CALL`] resources.
    async fn describe_tags(&self, arns: &[String]) -> Result<Vec<TagDescription>, ResourceError>;

    async fn describe_listeners(
        &self,
        load_balancer_arn: &str,
        marker: Option<String>,
    ) -> Result<Page<Listener>, ResourceError>;

    async fn describe_rules(
        &self,
        listener_arn: &str,
        page_size: i32,
        marker: Option<String>,
    ) -> Result<Page<Rule>, ResourceError>;

    async fn delete_rule(&self, rule_arn: &str) -> Result<(), ResourceError>;
}
