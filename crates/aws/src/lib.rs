//! AWS resource kinds for cloudsweep.
//!
//! - **`ELBv2ListenerRule`** ([`elbv2`]): non-default rules on application and
//!   network load balancer listeners.
//!
//! Kinds share an [`AwsBaseConfig`](config::AwsBaseConfig) for region,
//! endpoint override, and optional STS assume-role credentials.

pub mod auth;
pub mod config;
pub mod elbv2;
pub mod error;

// Re-exports for convenience.
pub use config::{AwsBaseConfig, Elbv2Config};
pub use error::classify_sdk_error;
