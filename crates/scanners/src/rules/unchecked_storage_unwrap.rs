//! `.unwrap()` directly on a storage read. A missing key panics the whole
//! message instead of surfacing a contract error.

use crate::analysis::{classify_storage_op, StorageOpKind};
use crate::core::{AnalysisContext, Confidence, Finding, Location, Scanner, Severity};
use crate::model::ExprKind;
use anyhow::Result;

pub struct UncheckedStorageUnwrapScanner;

impl UncheckedStorageUnwrapScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UncheckedStorageUnwrapScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for UncheckedStorageUnwrapScanner {
    fn id(&self) -> &'static str {
        "unchecked-storage-unwrap"
    }

    fn name(&self) -> &'static str {
        "Unchecked Storage Unwrap"
    }

    fn description(&self) -> &'static str {
        "Detects unwrap() applied directly to a storage read"
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-252")
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn confidence(&self) -> Confidence {
        Confidence::High
    }

    fn scan(&self, context: &AnalysisContext) -> Result<Vec<Finding>> {
        let model = context.model();
        let mut findings = Vec::new();

        for (func, f) in context.scoped_functions() {
            if context.is_test_function(func) {
                continue;
            }
            for (_, e) in model.exprs_of(func) {
                let receiver = match &e.kind {
                    ExprKind::MethodCall {
                        receiver, method, ..
                    } if method == "unwrap" => *receiver,
                    _ => continue,
                };
                let is_storage_read = matches!(
                    &model.expr(receiver).kind,
                    ExprKind::MethodCall { method, .. }
                        if classify_storage_op(method) == Some(StorageOpKind::Read)
                );
                if !is_storage_read {
                    continue;
                }
                let path = context.file_path(f.file);
                findings.push(
                    Finding::new(
                        self.id().to_string(),
                        self.severity(),
                        self.confidence(),
                        format!("storage read unwrapped in '{}'", f.name),
                        "A storage load is unwrapped directly; an absent key panics \
                         the contract instead of returning an error."
                            .to_string(),
                    )
                    .with_cwe("CWE-252")
                    .with_location(Location::from_span(path, &e.span).with_snippet(e.text.clone()))
                    .with_function(&f.name)
                    .with_recommendation("Propagate the StdResult with `?` or handle the None case"),
                );
            }
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lower_file;
    use crate::model::ContractModel;

    fn scan_at(path: &str, src: &str) -> Vec<Finding> {
        let mut model = ContractModel::new();
        lower_file(&mut model, path, src).unwrap();
        UncheckedStorageUnwrapScanner::new()
            .scan(&AnalysisContext::new(model))
            .unwrap()
    }

    const VULNERABLE: &str = r#"
fn execute_mint(deps: DepsMut, amount: Uint128) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage).unwrap();
    Ok(Response::new())
}
"#;

    #[test]
    fn test_unwrapped_load_flagged() {
        let findings = scan_at("src/contract.rs", VULNERABLE);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_question_mark_load_clean() {
        let findings = scan_at(
            "src/contract.rs",
            r#"
fn execute_mint(deps: DepsMut, amount: Uint128) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    Ok(Response::new())
}
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unwrap_on_non_storage_receiver_clean() {
        let findings = scan_at(
            "src/contract.rs",
            r#"
fn parse(deps: DepsMut, raw: String) -> Result<Response, ContractError> {
    let n: u64 = raw.parse().unwrap();
    Ok(Response::new())
}
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_test_file_excluded() {
        let findings = scan_at("src/contract_test.rs", VULNERABLE);
        assert!(findings.is_empty());
    }
}
