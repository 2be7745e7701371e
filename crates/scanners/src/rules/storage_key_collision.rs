//! Two storage handles declared over the same namespace key silently alias
//! each other's data.

use crate::analysis::storage_declaration_key;
use crate::core::{AnalysisContext, Confidence, Finding, Location, Scanner, Severity};
use anyhow::Result;

pub struct StorageKeyCollisionScanner;

impl StorageKeyCollisionScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StorageKeyCollisionScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for StorageKeyCollisionScanner {
    fn id(&self) -> &'static str {
        "storage-key-collision"
    }

    fn name(&self) -> &'static str {
        "Storage Key Collision"
    }

    fn description(&self) -> &'static str {
        "Detects two storage declarations in one file sharing the same key literal"
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-694")
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn confidence(&self) -> Confidence {
        Confidence::High
    }

    fn scan(&self, context: &AnalysisContext) -> Result<Vec<Finding>> {
        let model = context.model();
        let mut findings = Vec::new();

        for (file, source) in model.files() {
            if !context.scope().is_in_scope(&source.path) {
                continue;
            }
            let mut decls: Vec<(String, crate::model::Span)> = model
                .initializer_exprs(file)
                .filter_map(|(id, e)| storage_declaration_key(model, id).map(|key| (key, e.span)))
                .collect();
            // Line order makes the earlier declaration the anchor and keeps
            // symmetric pairs from double-reporting.
            decls.sort_by_key(|(_, span)| (span.start_line, span.start_column));

            for i in 0..decls.len() {
                for j in (i + 1)..decls.len() {
                    if decls[i].0 != decls[j].0 {
                        continue;
                    }
                    let (key, first) = &decls[i];
                    let (_, second) = &decls[j];
                    findings.push(
                        Finding::new(
                            self.id().to_string(),
                            self.severity(),
                            self.confidence(),
                            format!("storage key \"{}\" declared twice", key),
                            format!(
                                "Two storage declarations in {} use the key \"{}\"; \
                                 writes through one handle overwrite the other's data.",
                                source.path, key
                            ),
                        )
                        .with_cwe("CWE-694")
                        .with_location(Location::from_span(&source.path, first))
                        .with_location(Location::from_span(&source.path, second))
                        .with_recommendation("Give every storage handle a unique namespace key"),
                    );
                }
            }
        }
        Ok(findings)
    }
}
