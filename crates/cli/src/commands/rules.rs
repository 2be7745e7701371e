use anyhow::Result;
use clap::Args;
use colored::Colorize;
use vigil_scanners::{ScannerConfig, ScannerRegistry, ScanningEngine};

#[derive(Args, Clone)]
pub struct RulesArgs {
    /// Emit the rule table as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: RulesArgs) -> Result<()> {
    let registry = ScannerRegistry::with_builtin();
    let engine = ScanningEngine::new(ScannerConfig::default()).with_scanners(registry.all());
    let mut infos = engine.list_scanners();
    infos.sort_by(|a, b| a.id.cmp(&b.id));

    if args.json {
        let entries: Vec<serde_json::Value> = infos
            .iter()
            .map(|info| {
                serde_json::json!({
                    "id": info.id,
                    "name": info.name,
                    "description": info.description,
                    "cwe": info.cwe,
                    "severity": info.severity.to_string(),
                    "confidence": info.confidence.to_string(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{} built-in rules:\n", infos.len());
    for info in &infos {
        let severity = info
            .severity
            .to_string()
            .color(info.severity.color())
            .bold();
        println!(
            "{:<32} [{}] {}",
            info.id.bold(),
            severity,
            info.cwe.unwrap_or("-")
        );
        println!("    {}", info.description);
    }
    Ok(())
}
