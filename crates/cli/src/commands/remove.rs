use std::collections::HashSet;

use clap::Args;
use cloudsweep_core::ResourceKindRegistry;
use serde_json::json;
use tracing::{error, warn};

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Resource kind the ARNs belong to.
    #[arg(long)]
    pub kind: String,

    /// ARN of a resource to remove. May be repeated.
    #[arg(long = "arn", required = true)]
    pub arns: Vec<String>,

    /// Actually delete. Without this flag the command only reports what it
    /// would remove.
    #[arg(long)]
    pub no_dry_run: bool,
}

pub async fn run(
    registry: &ResourceKindRegistry,
    args: &RemoveArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let wanted: HashSet<&str> = args.arns.iter().map(String::as_str).collect();
    let resources = registry.lister(&args.kind)?.list().await?;
    let targets: Vec<_> = resources
        .iter()
        .filter(|r| r.properties().get("ARN").is_some_and(|arn| wanted.contains(arn)))
        .collect();

    let found: HashSet<String> = targets
        .iter()
        .filter_map(|r| r.properties().get("ARN").map(str::to_owned))
        .collect();
    for arn in wanted.iter().filter(|arn| !found.contains(**arn)) {
        warn!(arn = %arn, kind = %args.kind, "requested resource was not discovered");
    }

    let mut results = Vec::with_capacity(targets.len());
    let mut failed = 0usize;
    for resource in &targets {
        let outcome = if args.no_dry_run {
            match resource.remove().await {
                Ok(()) => "removed".to_owned(),
                Err(e) => {
                    error!(resource = %resource, error = %e, "removal failed");
                    failed += 1;
                    format!("failed: {e}")
                }
            }
        } else {
            "would remove".to_owned()
        };
        results.push((resource.to_string(), outcome));
    }

    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = results
                .iter()
                .map(|(resource, outcome)| json!({"resource": resource, "outcome": outcome}))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            for (resource, outcome) in &results {
                println!("  {resource} - {outcome}");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} removals failed", targets.len());
    }
    Ok(())
}
