use async_trait::async_trait;
use aws_sdk_elasticloadbalancingv2::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_elasticloadbalancingv2::operation::describe_tags::DescribeTagsOutput;
use cloudsweep_core::ResourceError;
use tracing::{debug, error, instrument};

use super::api::{Elbv2Api, Listener, LoadBalancerSummary, Page, Rule, Tag, TagDescription};
use crate::auth::build_sdk_config;
use crate::config::Elbv2Config;
use crate::error::classify_sdk_error;

/// [`Elbv2Api`] over the AWS SDK.
#[derive(Clone)]
pub struct SdkElbv2Client {
    client: aws_sdk_elasticloadbalancingv2::Client,
}

impl std::fmt::Debug for SdkElbv2Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkElbv2Client")
            .field("client", &"<Elbv2Client>")
            .finish()
    }
}

impl SdkElbv2Client {
    /// Build a client from the account settings in `config`.
    pub async fn new(config: &Elbv2Config) -> Self {
        let sdk_config = build_sdk_config(&config.aws).await;
        Self {
            client: aws_sdk_elasticloadbalancingv2::Client::new(&sdk_config),
        }
    }

    /// Wrap a pre-built SDK client.
    pub fn with_client(client: aws_sdk_elasticloadbalancingv2::Client) -> Self {
        Self { client }
    }
}

fn sdk_failure<E, R>(operation: &'static str, err: &SdkError<E, R>) -> ResourceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    let failure = classify_sdk_error(operation, err);
    error!(operation, error = %failure, "ELBv2 call failed");
    failure
}

/// Tags without a key are dropped; a missing value becomes empty.
fn tag_descriptions(output: &DescribeTagsOutput) -> Vec<TagDescription> {
    output
        .tag_descriptions()
        .iter()
        .filter_map(|description| {
            let tags = description
                .tags()
                .iter()
                .filter_map(|tag| Some(Tag::new(tag.key()?, tag.value().unwrap_or_default())))
                .collect();
            Some(TagDescription {
                resource_arn: description.resource_arn()?.to_owned(),
                tags,
            })
        })
        .collect()
}

#[async_trait]
impl Elbv2Api for SdkElbv2Client {
    #[instrument(skip(self), level = "debug")]
    async fn describe_load_balancers(
        &self,
        marker: Option<String>,
    ) -> Result<Page<LoadBalancerSummary>, ResourceError> {
        let output = self
            .client
            .describe_load_balancers()
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| sdk_failure("DescribeLoadBalancers", &e))?;

        let items = output
            .load_balancers()
            .iter()
            .filter_map(|lb| {
                Some(LoadBalancerSummary {
                    arn: lb.load_balancer_arn()?.to_owned(),
                    name: lb.load_balancer_name().unwrap_or_default().to_owned(),
                })
            })
            .collect();
        Ok(Page {
            items,
            next_marker: output.next_marker().map(str::to_owned),
        })
    }

    #[instrument(skip(self), level = "debug", fields(count = arns.len()))]
    async fn describe_tags(&self, arns: &[String]) -> Result<Vec<TagDescription>, ResourceError> {
        let output = self
            .client
            .describe_tags()
            .set_resource_arns(Some(arns.to_vec()))
            .send()
            .await
            .map_err(|e| sdk_failure("DescribeTags", &e))?;

        Ok(tag_descriptions(&output))
    }

    #[instrument(skip(self), level = "debug")]
    async fn describe_listeners(
        &self,
        load_balancer_arn: &str,
        marker: Option<String>,
    ) -> Result<Page<Listener>, ResourceError> {
        let output = self
            .client
            .describe_listeners()
            .load_balancer_arn(load_balancer_arn)
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| sdk_failure("DescribeListeners", &e))?;

        let items = output
            .listeners()
            .iter()
            .filter_map(|listener| {
                Some(Listener {
                    arn: listener.listener_arn()?.to_owned(),
                    load_balancer_arn: load_balancer_arn.to_owned(),
                })
            })
            .collect();
        Ok(Page {
            items,
            next_marker: output.next_marker().map(str::to_owned),
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn describe_rules(
        &self,
        listener_arn: &str,
        page_size: i32,
        marker: Option<String>,
    ) -> Result<Page<Rule>, ResourceError> {
        let output = self
            .client
            .describe_rules()
            .listener_arn(listener_arn)
            .page_size(page_size)
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| sdk_failure("DescribeRules", &e))?;

        let items = output
            .rules()
            .iter()
            .filter_map(|rule| {
                Some(Rule {
                    arn: rule.rule_arn()?.to_owned(),
                    is_default: rule.is_default(),
                })
            })
            .collect();
        Ok(Page {
            items,
            next_marker: output.next_marker().map(str::to_owned),
        })
    }

    #[instrument(skip(self))]
    async fn delete_rule(&self, rule_arn: &str) -> Result<(), ResourceError> {
        self.client
            .delete_rule()
            .rule_arn(rule_arn)
            .send()
            .await
            .map_err(|e| sdk_failure("DeleteRule", &e))?;
        debug!("DeleteRule accepted");
        Ok(())
    }
}
