use clap::Args;
use cloudsweep_core::{Resource, ResourceKindRegistry};
use serde::Serialize;
use tracing::info;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Resource kinds to scan. Scans every registered kind when omitted.
    #[arg(long = "kind")]
    pub kinds: Vec<String>,
}

#[derive(Serialize)]
struct ScannedResource<'a> {
    kind: &'a str,
    resource: String,
    properties: cloudsweep_core::Properties,
}

impl<'a> ScannedResource<'a> {
    fn new(resource: &'a dyn Resource) -> Self {
        Self {
            kind: resource.kind(),
            resource: resource.to_string(),
            properties: resource.properties(),
        }
    }
}

/// Kinds named on the command line, or every registered kind.
pub fn selected_kinds(registry: &ResourceKindRegistry, requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        registry.names().into_iter().map(str::to_owned).collect()
    } else {
        requested.to_vec()
    }
}

pub async fn run(
    registry: &ResourceKindRegistry,
    args: &ScanArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut discovered: Vec<Box<dyn Resource>> = Vec::new();
    for kind in selected_kinds(registry, &args.kinds) {
        let resources = registry.lister(&kind)?.list().await?;
        info!(kind = %kind, count = resources.len(), "scanned resource kind");
        discovered.extend(resources);
    }

    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = discovered
                .iter()
                .map(|r| ScannedResource::new(r.as_ref()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            println!("{} resources:", discovered.len());
            for resource in &discovered {
                println!(
                    "  {kind} - {resource} - {props}",
                    kind = resource.kind(),
                    props = resource.properties(),
                );
            }
        }
    }
    Ok(())
}
