use cloudsweep_core::ResourceKindRegistry;

use crate::OutputFormat;

pub fn run(registry: &ResourceKindRegistry, format: &OutputFormat) -> anyhow::Result<()> {
    let names = registry.names();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Text => {
            println!("{} resource kinds:", names.len());
            for name in names {
                println!("  {name}");
            }
        }
    }
    Ok(())
}
