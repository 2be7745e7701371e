use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use vigil_scanners::{
    lower_file_lossy, AnalysisContext, ContractModel, ScanReport, ScannerConfig, ScannerRegistry,
    ScanningEngine, ScopeConfig, Severity,
};
use walkdir::WalkDir;

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Contract file or source tree to scan
    pub input: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Drop findings below this severity
    #[arg(long, value_enum)]
    pub min_severity: Option<SeverityLevel>,

    /// Run only the named rule; repeatable
    #[arg(long = "rule")]
    pub rules: Vec<String>,

    /// Run rules one at a time instead of in parallel
    #[arg(long)]
    pub serial: bool,

    /// Report findings but always exit zero
    #[arg(long)]
    pub no_fail: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum SeverityLevel {
    Informational,
    Low,
    Medium,
    High,
    Critical,
}

impl From<SeverityLevel> for Severity {
    fn from(level: SeverityLevel) -> Self {
        match level {
            SeverityLevel::Informational => Severity::Informational,
            SeverityLevel::Low => Severity::Low,
            SeverityLevel::Medium => Severity::Medium,
            SeverityLevel::High => Severity::High,
            SeverityLevel::Critical => Severity::Critical,
        }
    }
}

pub fn execute(args: ScanArgs) -> Result<i32> {
    let scope = ScopeConfig::default();
    let files = collect_rust_files(&args.input, &scope)?;

    if files.is_empty() {
        println!("No Rust source files found in {}", args.input.display());
        return Ok(0);
    }

    if args.verbose {
        println!("Scanning {} files under {}", files.len(), args.input.display());
    }

    let mut model = ContractModel::new();
    for path in &files {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read file");
                continue;
            }
        };
        lower_file_lossy(&mut model, &path.to_string_lossy(), &source);
    }

    let config = ScannerConfig {
        parallel_execution: !args.serial,
        deduplication_enabled: true,
        min_severity: args.min_severity.map(Severity::from),
    };
    let context = AnalysisContext::with_config(model, scope, config.clone());

    let registry = ScannerRegistry::with_builtin();
    let scanners = if args.rules.is_empty() {
        registry.enabled()
    } else {
        let mut selected = Vec::new();
        for id in &args.rules {
            match registry.get(id) {
                Some(scanner) => selected.push(scanner),
                None => bail!("unknown rule: {id}"),
            }
        }
        selected
    };

    let engine = ScanningEngine::new(config).with_scanners(scanners);
    let report = engine.run(&context)?;

    output_report(&report, args.format, args.verbose)?;

    if report.has_errors() && !args.no_fail {
        Ok(1)
    } else {
        Ok(0)
    }
}

/// In-scope `.rs` files under `input`, sorted so the model is filled in a
/// stable order.
fn collect_rust_files(input: &Path, scope: &ScopeConfig) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("input path does not exist: {}", input.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("rs"))
        .filter(|path| scope.is_in_scope(&path.to_string_lossy()))
        .collect();
    files.sort();
    Ok(files)
}

fn output_report(report: &ScanReport, format: OutputFormat, verbose: bool) -> Result<()> {
    match format {
        OutputFormat::Console => print_console_report(report, verbose),
        OutputFormat::Json => {
            let json = report.to_json().context("failed to serialize report")?;
            println!("{}", json);
        }
        OutputFormat::Markdown => {
            println!("{}", report.to_markdown());
        }
    }
    Ok(())
}

fn print_console_report(report: &ScanReport, verbose: bool) {
    let findings = report.findings();
    if findings.is_empty() {
        println!("{}", "No issues found".green());
        return;
    }

    println!("Found {} issues:", findings.len());
    for (i, finding) in findings.iter().enumerate() {
        let severity = finding
            .severity
            .to_string()
            .color(finding.severity.color())
            .bold();
        println!("\n{}. [{}] {}", i + 1, severity, finding.title);
        if let Some(loc) = finding.primary_location() {
            println!("   at {}:{}:{}", loc.file, loc.line, loc.column);
        }
        if verbose {
            println!("   Rule: {}", finding.scanner_id);
            if let Some(ref cwe) = finding.cwe_id {
                println!("   CWE: {}", cwe);
            }
            println!("   Confidence: {}", finding.confidence);
            println!("   {}", finding.description);
            if let Some(rec) = finding
                .metadata
                .as_ref()
                .and_then(|m| m.recommendation.as_ref())
            {
                println!("   Recommendation: {}", rec);
            }
        }
    }

    let count = report.count_by_severity();
    println!(
        "\n{} critical, {} high, {} medium, {} low, {} informational",
        count.critical, count.high, count.medium, count.low, count.informational
    );
}
