use crate::core::{AnalysisContext, Finding, Scanner, ScannerConfig, Severity};
use anyhow::Result;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

pub struct ScanningEngine {
    scanners: Vec<Arc<dyn Scanner>>,
    config: ScannerConfig,
}

impl ScanningEngine {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            scanners: Vec::new(),
            config,
        }
    }

    pub fn add_scanner<S: Scanner + 'static>(mut self, scanner: S) -> Self {
        self.scanners.push(Arc::new(scanner));
        self
    }

    pub fn with_scanners(mut self, scanners: Vec<Arc<dyn Scanner>>) -> Self {
        self.scanners.extend(scanners);
        self
    }

    pub fn run(&self, context: &AnalysisContext) -> Result<ScanReport> {
        let mut findings: Vec<Finding> = if self.config.parallel_execution {
            self.scanners
                .par_iter()
                .filter_map(|scanner| match scanner.scan(context) {
                    Ok(findings) => Some(findings),
                    Err(e) => {
                        warn!(scanner = scanner.id(), error = %e, "scanner failed");
                        None
                    }
                })
                .flatten()
                .collect()
        } else {
            let mut all = Vec::new();
            for scanner in &self.scanners {
                match scanner.scan(context) {
                    Ok(findings) => all.extend(findings),
                    Err(e) => warn!(scanner = scanner.id(), error = %e, "scanner failed"),
                }
            }
            all
        };

        if let Some(min) = self.config.min_severity {
            findings.retain(|f| f.severity >= min);
        }

        if self.config.deduplication_enabled {
            let mut seen = HashSet::new();
            findings.retain(|f| seen.insert(f.dedup_key()));
        }

        Ok(ScanReport::new(findings))
    }

    pub fn run_scanners(&self, scanner_ids: &[&str], context: &AnalysisContext) -> Result<ScanReport> {
        let selected = Self {
            scanners: self
                .scanners
                .iter()
                .filter(|s| scanner_ids.contains(&s.id()))
                .cloned()
                .collect(),
            config: self.config.clone(),
        };
        selected.run(context)
    }

    pub fn list_scanners(&self) -> Vec<ScannerInfo> {
        self.scanners
            .iter()
            .map(|s| ScannerInfo {
                id: s.id().to_string(),
                name: s.name().to_string(),
                description: s.description().to_string(),
                cwe: s.cwe(),
                severity: s.severity(),
                confidence: s.confidence(),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ScannerInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cwe: Option<&'static str>,
    pub severity: Severity,
    pub confidence: crate::core::Confidence,
}

#[derive(Debug)]
pub struct ScanReport {
    findings: Vec<Finding>,
}

impl ScanReport {
    /// Findings are ordered by file, then line, then rule id. The same input
    /// always yields the same report.
    pub fn new(mut findings: Vec<Finding>) -> Self {
        findings.sort_by(|a, b| {
            let ka = Self::sort_key(a);
            let kb = Self::sort_key(b);
            ka.cmp(&kb)
        });
        Self { findings }
    }

    fn sort_key(f: &Finding) -> (String, usize, String, usize) {
        match f.primary_location() {
            Some(loc) => (loc.file.clone(), loc.line, f.scanner_id.clone(), loc.column),
            None => (String::new(), 0, f.scanner_id.clone(), 0),
        }
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// True when any finding is at a severity the CLI treats as a failure.
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity.is_error())
    }

    pub fn count_by_severity(&self) -> SeverityCount {
        let mut count = SeverityCount::default();
        for finding in &self.findings {
            match finding.severity {
                Severity::Critical => count.critical += 1,
                Severity::High => count.high += 1,
                Severity::Medium => count.medium += 1,
                Severity::Low => count.low += 1,
                Severity::Informational => count.informational += 1,
            }
        }
        count
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.findings)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Scan Report\n\n");

        let count = self.count_by_severity();
        md.push_str("## Summary\n\n");
        md.push_str(&format!("- Critical: {}\n", count.critical));
        md.push_str(&format!("- High: {}\n", count.high));
        md.push_str(&format!("- Medium: {}\n", count.medium));
        md.push_str(&format!("- Low: {}\n", count.low));
        md.push_str(&format!("- Informational: {}\n\n", count.informational));

        if !self.findings.is_empty() {
            md.push_str("## Findings\n\n");

            for finding in &self.findings {
                md.push_str(&format!(
                    "### {}: {}\n\n",
                    finding.severity, finding.title
                ));
                md.push_str(&format!("**Rule:** {}\n", finding.scanner_id));
                if let Some(ref cwe) = finding.cwe_id {
                    md.push_str(&format!("**CWE:** {}\n", cwe));
                }
                md.push_str(&format!("**Confidence:** {}\n\n", finding.confidence));
                md.push_str(&format!("{}\n\n", finding.description));

                if !finding.locations.is_empty() {
                    md.push_str("**Locations:**\n");
                    for loc in &finding.locations {
                        md.push_str(&format!("- {}:{}:{}\n", loc.file, loc.line, loc.column));
                        if let Some(ref snippet) = loc.snippet {
                            md.push_str(&format!("  ```\n  {}\n  ```\n", snippet));
                        }
                    }
                    md.push('\n');
                }

                if let Some(rec) = finding
                    .metadata
                    .as_ref()
                    .and_then(|m| m.recommendation.as_ref())
                {
                    md.push_str(&format!("**Recommendation:** {}\n\n", rec));
                }
            }
        }

        md
    }
}

#[derive(Debug, Default)]
pub struct SeverityCount {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub informational: usize,
}

impl SeverityCount {
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.informational
    }
}
