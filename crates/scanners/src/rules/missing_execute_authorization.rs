//! Execute handlers that write persistent state without any recognizable
//! authorization gate.

use crate::analysis::{classify_entry_point, writes_storage, AuthEvaluator, CallGraph, EntryKind};
use crate::core::{AnalysisContext, Confidence, Finding, Location, Scanner, Severity};
use crate::model::FuncId;
use anyhow::Result;
use std::collections::BTreeSet;

pub struct MissingExecuteAuthorizationScanner;

impl MissingExecuteAuthorizationScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MissingExecuteAuthorizationScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for MissingExecuteAuthorizationScanner {
    fn id(&self) -> &'static str {
        "missing-execute-authorization"
    }

    fn name(&self) -> &'static str {
        "Missing Execute Authorization"
    }

    fn description(&self) -> &'static str {
        "Detects execute handlers (and functions they dispatch to) that mutate storage without any structural authorization check"
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

        // Execute handlers plus everything statically reachable from one,
        // one hop deep. BTreeSet keeps the candidate order deterministic.
        let mut candidates: BTreeSet<FuncId> = BTreeSet::new();
        for (id, _) in context.scoped_functions() {
            if classify_entry_point(model, id) == Some(EntryKind::Execute) {
                candidates.insert(id);
                candidates.extend(graph.resolved_callees(model, id));
            }
        }

        let mut findings = Vec::new();
        for func in candidates {
            if context.is_test_function(func) {
                continue;
            }
            if !writes_storage(model, func) {
                continue;
            }
            if eval.is_query_only(func) || eval.is_self_serve(func) {
                continue;
            }
            if eval.has_check_transitive(func) {
                continue;
            }
            let f = model.func(func);
            let path = context.file_path(f.file);
            findings.push(
                Finding::new(
                    self.id().to_string(),
                    self.severity(),
                    self.confidence(),
                    format!("'{}' writes storage without authorization", f.name),
                    format!(
                        "Function '{}' is an execute handler or is reachable from one, \
                         performs a storage write, and contains no recognizable check of \
                         the message sender. Any account can invoke it.",
                        f.name
                    ),
                )
                .with_cwe("CWE-862")
                .with_location(Location::from_span(path, &f.span))
                .with_function(&f.name)
                .with_recommendation(
                    "Compare info.sender against a stored admin/owner before mutating state",
                ),
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
        MissingExecuteAuthorizationScanner::new()
            .scan(&AnalysisContext::new(model))
            .unwrap()
    }

    #[test]
    fn test_unguarded_write_is_flagged() {
        let findings = scan(
            r#"
#[entry_point]
pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::UpdateConfig { new_admin } => execute_update_config(deps, new_admin),
    }
}

fn execute_update_config(deps: DepsMut, new_admin: String) -> Result<Response, ContractError> {
    CONFIG.save(deps.storage, &new_admin)?;
    Ok(Response::new())
}
"#,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].title.contains("execute_update_config"));
    }

    #[test]
    fn test_guarded_write_is_clean() {
        let findings = scan(
            r#"
#[entry_point]
pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {});
    }
    CONFIG.save(deps.storage, &config)?;
    Ok(Response::new())
}
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_self_serve_handler_is_exempt() {
        // Writes only the caller's own record and performs no admin lookup.
        let findings = scan(
            r#"
#[entry_point]
pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Withdraw { amount } => execute_withdraw(deps, info, amount),
    }
}

fn execute_withdraw(deps: DepsMut, info: MessageInfo, amount: Uint128) -> Result<Response, ContractError> {
    BALANCES.save(deps.storage, &info.sender, &amount)?;
    Ok(Response::new())
}
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_handler_guarded_by_called_helper() {
        // The check lives one hop away; transitive evaluation must find it.
        let findings = scan(
            r#"
#[entry_point]
pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> Result<Response, ContractError> {
    assert_owner(deps.as_ref(), &info)?;
    CONFIG.save(deps.storage, &msg)?;
    Ok(Response::new())
}

fn assert_owner(deps: Deps, info: &MessageInfo) -> Result<(), ContractError> {
    Ok(())
}
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_test_function_excluded() {
        let findings = scan(
            r#"
#[cfg(test)]
mod tests {
    pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> Result<Response, ContractError> {
        CONFIG.save(deps.storage, &msg)?;
        Ok(Response::new())
    }
}
"#,
        );
        assert!(findings.is_empty());
    }
}
