//! Reply handlers that never look at the submessage result. Error replies
//! carry the failure of the spawned call; ignoring them turns a failed
//! cross-contract interaction into silent success.

use crate::analysis::{classify_entry_point, EntryKind};
use crate::core::{AnalysisContext, Confidence, Finding, Location, Scanner, Severity};
use crate::model::ExprKind;
use anyhow::Result;

pub struct ReplyIgnoresErrorsScanner;

impl ReplyIgnoresErrorsScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReplyIgnoresErrorsScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for ReplyIgnoresErrorsScanner {
    fn id(&self) -> &'static str {
        "reply-ignores-errors"
    }

    fn name(&self) -> &'static str {
        "Reply Handler Ignoring Errors"
    }

    fn description(&self) -> &'static str {
        "Detects reply entry points that neither read the result field nor match on anything"
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-252")
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn confidence(&self) -> Confidence {
        Confidence::Medium
    }

    fn scan(&self, context: &AnalysisContext) -> Result<Vec<Finding>> {
        let model = context.model();
        let mut findings = Vec::new();

        for (func, f) in context.scoped_functions() {
            if context.is_test_function(func) {
                continue;
            }
            if classify_entry_point(model, func) != Some(EntryKind::Reply) {
                continue;
            }
            let inspects_result = model.exprs_of(func).any(|(_, e)| {
                matches!(&e.kind, ExprKind::Field { field, .. } if field == "result")
                    || matches!(e.kind, ExprKind::Match { .. })
            });
            if inspects_result {
                continue;
            }
            let path = context.file_path(f.file);
            findings.push(
                Finding::new(
                    self.id().to_string(),
                    self.severity(),
                    self.confidence(),
                    format!("reply handler '{}' ignores the submessage result", f.name),
                    "The reply entry point never reads msg.result and contains no \
                     match; failed submessages are indistinguishable from \
                     successful ones."
                        .to_string(),
                )
                .with_cwe("CWE-252")
                .with_location(Location::from_span(path, &f.span))
                .with_function(&f.name)
                .with_recommendation("Match on msg.result and propagate the error arm"),
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
        ReplyIgnoresErrorsScanner::new()
            .scan(&AnalysisContext::new(model))
            .unwrap()
    }

    #[test]
    fn test_blind_reply_flagged() {
        let findings = scan(
            r#"
#[entry_point]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    Ok(Response::new())
}
"#,
        );
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_result_matching_reply_clean() {
        let findings = scan(
            r#"
#[entry_point]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.result {
        SubMsgResult::Ok(_) => Ok(Response::new()),
        SubMsgResult::Err(err) => Err(ContractError::Std(StdError::generic_err(err))),
    }
}
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_result_field_read_clean() {
        let findings = scan(
            r#"
#[entry_point]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    let outcome = msg.result.into_result().map_err(ContractError::ReplyFailure)?;
    Ok(Response::new())
}
"#,
        );
        assert!(findings.is_empty());
    }
}
