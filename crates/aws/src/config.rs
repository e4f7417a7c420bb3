use cloudsweep_core::ResourceError;
use serde::{Deserialize, Serialize};

/// Default STS session name used when assuming a role.
pub const DEFAULT_SESSION_NAME: &str = "cloudsweep";

/// Page-size hint sent with `DescribeRules`.
///
/// ELBv2 caps listeners at 100 rules, so this is an upper bound rather than a
/// value enumeration depends on.
pub const DEFAULT_RULE_PAGE_SIZE: i32 = 400;

/// Largest page size `DescribeRules` accepts.
pub const MAX_RULE_PAGE_SIZE: i32 = 400;

/// Account-level AWS settings shared by every resource kind.
///
/// Names the region to sweep and, optionally, a role to assume first so one
/// set of credentials can sweep several accounts.
#[derive(Clone, Serialize, Deserialize)]
pub struct AwsBaseConfig {
    /// AWS region to scan (e.g. `"us-east-1"`).
    pub region: String,

    /// Optional IAM role ARN to assume via STS before scanning.
    #[serde(default)]
    pub role_arn: Option<String>,

    /// Optional endpoint URL override (e.g. `LocalStack`).
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Optional STS session name (defaults to [`DEFAULT_SESSION_NAME`]).
    #[serde(default)]
    pub session_name: Option<String>,

    /// Optional external ID for cross-account trust policies.
    #[serde(default)]
    pub external_id: Option<String>,
}

impl std::fmt::Debug for AwsBaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsBaseConfig")
            .field("region", &self.region)
            .field("role_arn", &self.role_arn.as_ref().map(|_| "[REDACTED]"))
            .field("endpoint_url", &self.endpoint_url)
            .field("session_name", &self.session_name)
            .field("external_id", &self.external_id.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AwsBaseConfig {
    /// Settings for `region` using the ambient credential chain.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            role_arn: None,
            endpoint_url: None,
            session_name: None,
            external_id: None,
        }
    }

    /// Assume this role through STS before any ELBv2 call.
    #[must_use]
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    /// Send ELBv2 and STS calls to this endpoint instead of the AWS default.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Name recorded in `CloudTrail` for the assumed-role session.
    #[must_use]
    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = Some(session_name.into());
        self
    }

    /// External ID required by the target role's trust policy.
    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// STS session name, falling back to [`DEFAULT_SESSION_NAME`].
    pub fn session_name(&self) -> &str {
        self.session_name.as_deref().unwrap_or(DEFAULT_SESSION_NAME)
    }
}

impl Default for AwsBaseConfig {
    fn default() -> Self {
        Self::new("us-east-1")
    }
}

/// Settings for the ELBv2 resource kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Elbv2Config {
    /// Shared AWS configuration (region, role ARN, endpoint URL).
    #[serde(flatten)]
    pub aws: AwsBaseConfig,

    /// Page-size hint for `DescribeRules`.
    #[serde(default = "default_rule_page_size")]
    pub rule_page_size: i32,
}

fn default_rule_page_size() -> i32 {
    DEFAULT_RULE_PAGE_SIZE
}

impl Elbv2Config {
    /// Default ELBv2 settings for `region`.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            aws: AwsBaseConfig::new(region),
            rule_page_size: DEFAULT_RULE_PAGE_SIZE,
        }
    }

    /// Override the `DescribeRules` page size. Checked by [`validate`](Self::validate).
    #[must_use]
    pub fn with_rule_page_size(mut self, rule_page_size: i32) -> Self {
        self.rule_page_size = rule_page_size;
        self
    }

    /// Send ELBv2 and STS calls to this endpoint instead of the AWS default.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.aws.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Assume this role through STS before any ELBv2 call.
    #[must_use]
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.aws.role_arn = Some(role_arn.into());
        self
    }

    /// Reject a `rule_page_size` outside `1..=MAX_RULE_PAGE_SIZE`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Configuration`] naming the bad value.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if !(1..=MAX_RULE_PAGE_SIZE).contains(&self.rule_page_size) {
            return Err(ResourceError::Configuration(format!(
                "rule_page_size must be between 1 and {MAX_RULE_PAGE_SIZE}, got {}",
                self.rule_page_size
            )));
        }
        Ok(())
    }
}

impl Default for Elbv2Config {
    fn default() -> Self {
        Self {
            aws: AwsBaseConfig::default(),
            rule_page_size: DEFAULT_RULE_PAGE_SIZE,
        }
    }
}
