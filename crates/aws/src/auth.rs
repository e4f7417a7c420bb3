use aws_config::{ConfigLoader, Region};
use tracing::{debug, info};

use crate::config::AwsBaseConfig;

/// Build an AWS SDK configuration for scanning the account described by
/// `config`.
///
/// Credentials come from the standard environment chain. When `role_arn` is
/// set, the role is assumed through STS with an auto-refreshing provider so
/// long scans do not outlive their credentials.
///
/// ```no_run
/// use cloudsweep_aws::auth::build_sdk_config;
/// use cloudsweep_aws::config::AwsBaseConfig;
///
/// # async fn example() {
/// let config = AwsBaseConfig::new("us-east-1").with_endpoint_url("http://localhost:4566");
/// let sdk_config = build_sdk_config(&config).await;
/// # }
/// ```
pub async fn build_sdk_config(config: &AwsBaseConfig) -> aws_config::SdkConfig {
    let Some(role_arn) = &config.role_arn else {
        return loader(config).load().await;
    };

    let session_name = config.session_name();
    info!(session_name = %session_name, "assuming IAM role via STS");

    // STS calls use the base credentials and honor the endpoint override.
    let base_config = loader(config).load().await;

    let mut role = aws_config::sts::AssumeRoleProvider::builder(role_arn)
        .session_name(session_name)
        .region(Region::new(config.region.clone()));
    if let Some(external_id) = &config.external_id {
        role = role.external_id(external_id);
    }
    let credentials = role.configure(&base_config).build().await;

    loader(config)
        .credentials_provider(credentials)
        .load()
        .await
}

fn loader(config: &AwsBaseConfig) -> ConfigLoader {
    let mut loader = aws_config::from_env().region(Region::new(config.region.clone()));
    if let Some(endpoint) = &config.endpoint_url {
        debug!(endpoint = %endpoint, "using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }
    loader
}
