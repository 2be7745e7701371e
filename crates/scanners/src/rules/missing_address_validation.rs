//! Addresses constructed with `Addr::unchecked` inside entry points that
//! never run them through address validation.

use crate::analysis::{call_name, classify_entry_point, CallGraph};
use crate::core::{AnalysisContext, Confidence, Finding, Location, Scanner, Severity};
use crate::model::{ContractModel, ExprId, FuncId};
use anyhow::Result;
use std::collections::BTreeSet;

pub struct MissingAddressValidationScanner;

impl MissingAddressValidationScanner {
    pub fn new() -> Self {
        Self
    }

    /// `unchecked` constructions, minus the `unchecked_into` conversions
    /// that merely change the type of an already-validated value.
    fn unchecked_sites(model: &ContractModel, func: FuncId) -> Vec<ExprId> {
        model
            .exprs_of(func)
            .filter_map(|(id, _)| {
                let name = call_name(model, id)?;
                if name.contains("unchecked") && !name.contains("unchecked_into") {
                    Some(id)
                } else {
                    None
                }
            })
            .collect()
    }

    fn validates_addresses(model: &ContractModel, func: FuncId) -> bool {
        model.exprs_of(func).any(|(id, _)| {
            call_name(model, id)
                .map(|name| name.contains("addr_validate"))
                .unwrap_or(false)
        })
    }
}

impl Default for MissingAddressValidationScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for MissingAddressValidationScanner {
    fn id(&self) -> &'static str {
        "missing-address-validation"
    }

    fn name(&self) -> &'static str {
        "Missing Address Validation"
    }

    fn description(&self) -> &'static str {
        "Detects Addr::unchecked on externally supplied values in entry points that never call addr_validate"
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-20")
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn confidence(&self) -> Confidence {
        Confidence::Medium
    }

    fn scan(&self, context: &AnalysisContext) -> Result<Vec<Finding>> {
        let model = context.model();
        let graph = CallGraph::build(model, context.scope());

        let mut candidates: BTreeSet<FuncId> = BTreeSet::new();
        for (id, _) in context.scoped_functions() {
            if classify_entry_point(model, id).is_some() {
                candidates.insert(id);
                candidates.extend(graph.resolved_callees(model, id));
            }
        }

        let mut findings = Vec::new();
        for func in candidates {
            if context.is_test_function(func) {
                continue;
            }
            if Self::validates_addresses(model, func) {
                continue;
            }
            let f = model.func(func);
            let path = context.file_path(f.file);
            for site in Self::unchecked_sites(model, func) {
                let e = model.expr(site);
                findings.push(
                    Finding::new(
                        self.id().to_string(),
                        self.severity(),
                        self.confidence(),
                        format!("unvalidated address in '{}'", f.name),
                        "An address is constructed with Addr::unchecked and the \
                         function never validates it. Malformed or wrong-chain \
                         addresses flow into state."
                            .to_string(),
                    )
                    .with_cwe("CWE-20")
                    .with_location(Location::from_span(path, &e.span).with_snippet(e.text.clone()))
                    .with_function(&f.name)
                    .with_recommendation("Use deps.api.addr_validate on externally supplied addresses"),
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

    fn scan(src: &str) -> Vec<Finding> {
        let mut model = ContractModel::new();
        lower_file(&mut model, "src/contract.rs", src).unwrap();
        MissingAddressValidationScanner::new()
            .scan(&AnalysisContext::new(model))
            .unwrap()
    }

    #[test]
    fn test_unchecked_in_dispatched_handler_flagged() {
        let findings = scan(
            r#"
#[entry_point]
pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::SetAdmin { new_admin } => set_admin(deps, new_admin),
    }
}

fn set_admin(deps: DepsMut, new_admin: String) -> Result<Response, ContractError> {
    let admin = Addr::unchecked(new_admin);
    CONFIG.save(deps.storage, &admin)?;
    Ok(Response::new())
}
"#,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].title.contains("set_admin"));
    }

    #[test]
    fn test_validated_function_clean() {
        let findings = scan(
            r#"
#[entry_point]
pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> Result<Response, ContractError> {
    let admin = deps.api.addr_validate(&msg.new_admin)?;
    CONFIG.save(deps.storage, &admin)?;
    Ok(Response::new())
}
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unchecked_into_conversion_not_flagged() {
        let findings = scan(
            r#"
#[entry_point]
pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> Result<Response, ContractError> {
    let typed = raw_channel.unchecked_into();
    Ok(Response::new())
}
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_non_entry_helper_not_scanned() {
        // Helpers only count when reachable from an entry point.
        let findings = scan(
            r#"
fn builder(new_admin: String) -> Addr {
    Addr::unchecked(new_admin)
}
"#,
        );
        assert!(findings.is_empty());
    }
}
