//! Bare `+`/`-`/`*` on financial quantities inside state-touching handlers.
//! CosmWasm's Uint types saturate into panics on overflow in release builds,
//! so unchecked arithmetic on balances is an abort-the-handler bug at best.

use crate::analysis::storage_ops;
use crate::core::{AnalysisContext, Confidence, Finding, Location, Scanner, Severity};
use crate::model::{ContractModel, ExprId, ExprKind};
use anyhow::Result;

/// Operand-name heuristic for value-bearing quantities.
const FINANCIAL_NAMES: &[&str] = &[
    "amount", "balance", "supply", "total", "shares", "debt", "reward", "fee", "price", "funds",
];

/// Large-integer type markers in operand text.
const WIDE_INT_MARKERS: &[&str] = &["Uint", "Int128", "Int256"];

pub struct UncheckedArithmeticScanner;

impl UncheckedArithmeticScanner {
    pub fn new() -> Self {
        Self
    }

    fn operand_is_financial(text: &str) -> bool {
        let lower = text.to_lowercase();
        FINANCIAL_NAMES.iter().any(|n| lower.contains(n))
            || WIDE_INT_MARKERS.iter().any(|m| text.contains(m))
    }

    fn is_already_checked(model: &ContractModel, expr: ExprId) -> bool {
        let text = &model.expr(expr).text;
        text.contains("checked_") || text.contains("saturating_") || text.contains("wrapping_")
    }

    /// Chained arithmetic like `a + b + c` lowers to nested binaries; only
    /// the outermost one is reported.
    fn nested_in_arithmetic(model: &ContractModel, expr: ExprId) -> bool {
        model.ancestors(expr).into_iter().any(|anc| {
            matches!(&model.expr(anc).kind, ExprKind::Binary { op, .. } if op.is_arithmetic())
        })
    }
}

impl Default for UncheckedArithmeticScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for UncheckedArithmeticScanner {
    fn id(&self) -> &'static str {
        "unchecked-arithmetic"
    }

    fn name(&self) -> &'static str {
        "Unchecked Arithmetic"
    }

    fn description(&self) -> &'static str {
        "Detects unchecked add/sub/mul on financial or wide-integer operands in state-touching handlers"
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-190")
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
            // A parameterless function is compile-time data shaping, not a
            // handler.
            if f.params.is_empty() {
                continue;
            }
            let touches_state = !storage_ops(model, func).is_empty();
            let handler_like =
                touches_state || f.ret.contains("Response") || f.ret.contains("Result");
            if !handler_like {
                continue;
            }

            for (id, e) in model.exprs_of(func) {
                let (lhs, rhs) = match &e.kind {
                    ExprKind::Binary { op, lhs, rhs } if op.is_arithmetic() => (*lhs, *rhs),
                    _ => continue,
                };
                if Self::is_already_checked(model, id) {
                    continue;
                }
                if Self::nested_in_arithmetic(model, id) {
                    continue;
                }
                let financial = Self::operand_is_financial(&model.expr(lhs).text)
                    || Self::operand_is_financial(&model.expr(rhs).text);
                if !financial {
                    continue;
                }
                let path = context.file_path(f.file);
                findings.push(
                    Finding::new(
                        self.id().to_string(),
                        self.severity(),
                        self.confidence(),
                        format!("unchecked arithmetic in '{}'", f.name),
                        format!(
                            "'{}' performs unchecked arithmetic on a value-bearing \
                             operand. Overflow panics abort the message instead of \
                             returning a contract error.",
                            e.text
                        ),
                    )
                    .with_cwe("CWE-190")
                    .with_location(
                        Location::from_span(path, &e.span).with_snippet(e.text.clone()),
                    )
                    .with_function(&f.name)
                    .with_recommendation("Use checked_add/checked_sub/checked_mul and map the error"),
                );
            }
        }
        Ok(findings)
    }
}
