//! Configuration file for the CLI.

use std::path::Path;

use cloudsweep_aws::Elbv2Config;
use serde::Deserialize;

/// Top-level configuration, loaded from a TOML file.
///
/// ```toml
/// [elbv2]
/// region = "eu-west-1"
/// role_arn = "arn:aws:iam::123456789012:role/cleanup"
/// rule_page_size = 100
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct SweepConfig {
    /// ELBv2 account settings.
    #[serde(default)]
    pub elbv2: Elbv2Config,
}

impl SweepConfig {
    /// Load configuration from `path`, or use defaults if the file does not
    /// exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: Self = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            Self::default()
        };
        config.elbv2.validate()?;
        Ok(config)
    }

    /// Override the region of every configured kind.
    #[must_use]
    pub fn with_region(mut self, region: Option<String>) -> Self {
        if let Some(region) = region {
            self.elbv2.aws.region = region;
        }
        self
    }
}
