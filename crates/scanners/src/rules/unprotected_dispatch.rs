//! Dispatch arms inside execute handlers that route to storage-writing
//! targets with no gate on either side of the dispatch.

use crate::analysis::{
    classify_entry_point, is_dispatch_match, writes_storage, AuthEvaluator, CallGraph, EntryKind,
};
use crate::core::{AnalysisContext, Confidence, Finding, Location, Scanner, Severity};
use crate::model::{ExprKind, FuncId};
use anyhow::Result;

pub struct UnprotectedDispatchScanner;

impl UnprotectedDispatchScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnprotectedDispatchScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for UnprotectedDispatchScanner {
    fn id(&self) -> &'static str {
        "unprotected-execute-dispatch"
    }

    fn name(&self) -> &'static str {
        "Unprotected Execute Dispatch"
    }

    fn description(&self) -> &'static str {
        "Detects message-dispatch arms whose storage-writing targets are reachable with no authorization check in the target or the handler"
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
        for (handler, f) in context.scoped_functions() {
            if context.is_test_function(handler) {
                continue;
            }
            if classify_entry_point(model, handler) != Some(EntryKind::Execute) {
                continue;
            }
            let matches: Vec<_> = model
                .exprs_of(handler)
                .filter(|(id, e)| {
                    matches!(e.kind, ExprKind::Match { .. })
                        && is_dispatch_match(model, *id, handler)
                })
                .map(|(id, _)| id)
                .collect();

            for m in matches {
                let arms = match &model.expr(m).kind {
                    ExprKind::Match { arms, .. } => arms.clone(),
                    _ => continue,
                };
                for arm in arms {
                    let mut targets: Vec<FuncId> = Vec::new();
                    for site in model.descendants(arm.body) {
                        if let Some(target) = graph.resolve_target(model, site) {
                            if !targets.contains(&target) {
                                targets.push(target);
                            }
                        }
                    }
                    for target in targets {
                        if !writes_storage(model, target) {
                            continue;
                        }
                        if eval.is_self_serve(target) {
                            continue;
                        }
                        if eval.has_check(target) || eval.has_check(handler) {
                            continue;
                        }
                        let t = model.func(target);
                        let arm_span = model.expr(arm.body).span;
                        let path = context.file_path(f.file);
                        findings.push(
                            Finding::new(
                                self.id().to_string(),
                                self.severity(),
                                self.confidence(),
                                format!("dispatch arm routes to unguarded '{}'", t.name),
                                format!(
                                    "The '{}' arm of the execute dispatch in '{}' invokes \
                                     '{}', which writes storage; neither the target nor the \
                                     handler checks the sender.",
                                    arm.pat, f.name, t.name
                                ),
                            )
                            .with_cwe("CWE-862")
                            .with_location(Location::from_span(path, &arm_span))
                            .with_function(&t.name),
                        );
                    }
                }
            }
        }
        Ok(findings)
    }
}
