//! Migrate entry points without an authorization gate. Migration replaces
//! the contract's code, so an open migrate handler is a full takeover.

use crate::analysis::{classify_entry_point, AuthEvaluator, CallGraph, EntryKind};
use crate::core::{AnalysisContext, Confidence, Finding, Location, Scanner, Severity};
use anyhow::Result;

pub struct MissingMigrateAuthorizationScanner;

impl MissingMigrateAuthorizationScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MissingMigrateAuthorizationScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for MissingMigrateAuthorizationScanner {
    fn id(&self) -> &'static str {
        "missing-migrate-authorization"
    }

    fn name(&self) -> &'static str {
        "Missing Migrate Authorization"
    }

    fn description(&self) -> &'static str {
        "Detects migrate entry points with no structural authorization check"
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-862")
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn confidence(&self) -> Confidence {
        Confidence::Medium
    }

    fn scan(&self, context: &AnalysisContext) -> Result<Vec<Finding>> {
        let model = context.model();
        let graph = CallGraph::build(model, context.scope());
        let mut eval = AuthEvaluator::new(model, &graph);

        let mut findings = Vec::new();
        for (id, f) in context.scoped_functions() {
            if classify_entry_point(model, id) != Some(EntryKind::Migrate) {
                continue;
            }
            if eval.has_check(id) {
                continue;
            }
            let path = context.file_path(f.file);
            findings.push(
                Finding::new(
                    self.id().to_string(),
                    self.severity(),
                    self.confidence(),
                    format!("migrate handler '{}' has no authorization check", f.name),
                    "The migrate entry point can be invoked without any caller \
                     verification. On chains where migration is delegated to the \
                     contract, this allows anyone to swap the code."
                        .to_string(),
                )
                .with_cwe("CWE-862")
                .with_location(Location::from_span(path, &f.span))
                .with_function(&f.name)
                .with_recommendation("Verify the caller against the stored admin before migrating"),
            );
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lower_file;
    use crate::model::ContractModel;

    fn scan(src: &str) -> Vec<Finding> {
        let mut model = ContractModel::new();
        lower_file(&mut model, "src/contract.rs", src).unwrap();
        MissingMigrateAuthorizationScanner::new()
            .scan(&AnalysisContext::new(model))
            .unwrap()
    }

    #[test]
    fn test_open_migrate_is_flagged() {
        let findings = scan(
            r#"
#[entry_point]
pub fn migrate(deps: DepsMut, env: Env, msg: MigrateMsg) -> Result<Response, ContractError> {
    Ok(Response::new())
}
"#,
        );
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_helper_guarded_migrate_is_clean() {
        let findings = scan(
            r#"
#[entry_point]
pub fn migrate(deps: DepsMut, env: Env, msg: MigrateMsg) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref())?;
    Ok(Response::new())
}

fn ensure_admin(deps: Deps) -> Result<(), ContractError> {
    Ok(())
}
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_non_migrate_functions_ignored() {
        let findings = scan(
            r#"
#[entry_point]
pub fn instantiate(deps: DepsMut, env: Env, info: MessageInfo, msg: InstantiateMsg) -> Result<Response, ContractError> {
    Ok(Response::new())
}
"#,
        );
        assert!(findings.is_empty());
    }
}
