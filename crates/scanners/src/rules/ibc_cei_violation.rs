//! IBC handlers that mutate storage and dispatch outgoing messages in the
//! same body — the checks-effects-interactions ordering that enables
//! reentrant exploitation across the channel.

use crate::analysis::{classify_entry_point, classify_storage_op, StorageOpKind};
use crate::core::{AnalysisContext, Confidence, Finding, Location, Scanner, Severity};
use crate::model::{ContractModel, ExprId, ExprKind, FuncId};
use anyhow::Result;

const OUTGOING_MESSAGE_METHODS: &[&str] =
    &["add_message", "add_messages", "add_submessage", "add_submessages"];

pub struct IbcCeiViolationScanner;

impl IbcCeiViolationScanner {
    pub fn new() -> Self {
        Self
    }

    fn mutates_storage(model: &ContractModel, func: FuncId) -> bool {
        model.exprs_of(func).any(|(_, e)| match &e.kind {
            ExprKind::MethodCall { method, .. } => matches!(
                classify_storage_op(method),
                Some(StorageOpKind::Write) | Some(StorageOpKind::Delete)
            ),
            _ => false,
        })
    }

    fn first_outgoing_message(model: &ContractModel, func: FuncId) -> Option<ExprId> {
        model
            .exprs_of(func)
            .find(|(_, e)| match &e.kind {
                ExprKind::MethodCall { method, .. } => {
                    OUTGOING_MESSAGE_METHODS.contains(&method.as_str())
                }
                _ => false,
            })
            .map(|(id, _)| id)
    }
}

impl Default for IbcCeiViolationScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for IbcCeiViolationScanner {
    fn id(&self) -> &'static str {
        "ibc-cei-violation"
    }

    fn name(&self) -> &'static str {
        "IBC Checks-Effects-Interactions Violation"
    }

    fn description(&self) -> &'static str {
        "Detects IBC entry points that both mutate storage and dispatch outgoing messages"
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-696")
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn confidence(&self) -> Confidence {
        Confidence::Medium
    }

    fn scan(&self, context: &AnalysisContext) -> Result<Vec<Finding>> {
        let model = context.model();
        let mut findings = Vec::new();

        for (func, f) in context.scoped_functions() {
            let is_ibc = classify_entry_point(model, func)
                .map(|kind| kind.is_ibc())
                .unwrap_or(false);
            if !is_ibc {
                continue;
            }
            if !Self::mutates_storage(model, func) {
                continue;
            }
            let Some(site) = Self::first_outgoing_message(model, func) else {
                continue;
            };
            let e = model.expr(site);
            let path = context.file_path(f.file);
            findings.push(
                Finding::new(
                    self.id().to_string(),
                    self.severity(),
                    self.confidence(),
                    format!("IBC handler '{}' mixes state change and dispatch", f.name),
                    format!(
                        "'{}' mutates storage and also emits outgoing messages. If the \
                         message round-trip re-enters this contract, it observes \
                         half-applied state.",
                        f.name
                    ),
                )
                .with_cwe("CWE-696")
                .with_location(Location::from_span(path, &e.span).with_snippet(e.text.clone()))
                .with_function(&f.name)
                .with_recommendation(
                    "Finish all state mutation before constructing outgoing messages, \
                     or defer the mutation to the acknowledgement handler",
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
        lower_file(&mut model, "src/ibc.rs", src).unwrap();
        IbcCeiViolationScanner::new()
            .scan(&AnalysisContext::new(model))
            .unwrap()
    }

    const VULNERABLE: &str = r#"
#[entry_point]
pub fn ibc_packet_timeout(deps: DepsMut, env: Env, msg: IbcPacketTimeoutMsg) -> Result<IbcBasicResponse, ContractError> {
    CONFIG.remove(deps.storage);
    let refund = BankMsg::Send { to_address: "sender".to_string(), amount: vec![] };
    Ok(IbcBasicResponse::new().add_message(refund))
}
"#;

    #[test]
    fn test_state_change_plus_dispatch_flagged_once() {
        let findings = scan(VULNERABLE);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].scanner_id, "ibc-cei-violation");
    }

    #[test]
    fn test_dispatch_without_state_change_clean() {
        let clean = VULNERABLE.replace("CONFIG.remove(deps.storage);", "");
        assert!(scan(&clean).is_empty());
    }

    #[test]
    fn test_state_change_without_dispatch_clean() {
        let clean = VULNERABLE.replace(".add_message(refund)", "");
        assert!(scan(&clean).is_empty());
    }

    #[test]
    fn test_non_ibc_entry_point_ignored() {
        let findings = scan(
            r#"
#[entry_point]
pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> Result<Response, ContractError> {
    CONFIG.save(deps.storage, &msg)?;
    Ok(Response::new().add_message(BankMsg::Send { to_address: info.sender.to_string(), amount: vec![] }))
}
"#,
        );
        assert!(findings.is_empty());
    }
}
