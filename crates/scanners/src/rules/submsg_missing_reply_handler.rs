//! Submessages created with a reply callback in a contract that defines no
//! reply entry point: the callback variant is a promise nobody keeps, and on
//! reply_on_error the failure is silently dropped.
//!
//! This is the one genuinely global rule: the "does any reply handler
//! exist" fact covers the whole in-scope set and must be settled before a
//! finding can be emitted for any file.

use crate::analysis::{call_name, classify_entry_point, EntryKind};
use crate::core::{AnalysisContext, Confidence, Finding, Location, Scanner, Severity};
use anyhow::Result;

const REPLY_VARIANTS: &[&str] = &["reply_on_success", "reply_on_error", "reply_always"];

pub struct SubmsgMissingReplyHandlerScanner;

impl SubmsgMissingReplyHandlerScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SubmsgMissingReplyHandlerScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for SubmsgMissingReplyHandlerScanner {
    fn id(&self) -> &'static str {
        "submsg-missing-reply-handler"
    }

    fn name(&self) -> &'static str {
        "Submessage Without Reply Handler"
    }

    fn description(&self) -> &'static str {
        "Detects reply-callback submessages in contracts that define no reply entry point"
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-754")
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn confidence(&self) -> Confidence {
        Confidence::High
    }

    fn scan(&self, context: &AnalysisContext) -> Result<Vec<Finding>> {
        let model = context.model();

        // Global pass first: any reply entry point anywhere in scope
        // suppresses every finding of this rule.
        let reply_handler_exists = context
            .scoped_functions()
            .any(|(id, _)| classify_entry_point(model, id) == Some(EntryKind::Reply));
        if reply_handler_exists {
            return Ok(Vec::new());
        }

        let mut findings = Vec::new();
        for (func, f) in context.scoped_functions() {
            for (id, e) in model.exprs_of(func) {
                let is_reply_site = call_name(model, id)
                    .map(|name| REPLY_VARIANTS.contains(&name.as_str()))
                    .unwrap_or(false);
                if !is_reply_site {
                    continue;
                }
                let path = context.file_path(f.file);
                findings.push(
                    Finding::new(
                        self.id().to_string(),
                        self.severity(),
                        self.confidence(),
                        format!("submessage in '{}' expects a reply nobody handles", f.name),
                        "A submessage is created with a reply callback variant, but no \
                         reply entry point exists anywhere in the contract. The runtime \
                         will fail the transaction when the callback fires."
                            .to_string(),
                    )
                    .with_cwe("CWE-754")
                    .with_location(Location::from_span(path, &e.span).with_snippet(e.text.clone()))
                    .with_function(&f.name),
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

    const SUBMSG_SITE: &str = r#"
pub fn execute_swap(deps: DepsMut, env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    let msg = SubMsg::reply_on_success(swap_msg, 1);
    Ok(Response::new().add_submessage(msg))
}
"#;

    fn scan(files: &[(&str, &str)]) -> Vec<Finding> {
        let mut model = ContractModel::new();
        for (path, src) in files {
            lower_file(&mut model, path, src).unwrap();
        }
        SubmsgMissingReplyHandlerScanner::new()
            .scan(&AnalysisContext::new(model))
            .unwrap()
    }

    #[test]
    fn test_orphan_submsg_flagged() {
        let findings = scan(&[("src/contract.rs", SUBMSG_SITE)]);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_reply_handler_anywhere_in_scope_suppresses() {
        let reply = r#"
#[entry_point]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    Ok(Response::new())
}
"#;
        let findings = scan(&[("src/contract.rs", SUBMSG_SITE), ("src/reply.rs", reply)]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_plain_submsg_without_callback_clean() {
        let findings = scan(&[(
            "src/contract.rs",
            r#"
pub fn execute_swap(deps: DepsMut, env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    Ok(Response::new().add_submessage(SubMsg::new(swap_msg)))
}
"#,
        )]);
        assert!(findings.is_empty());
    }
}
