//! Structural authorization-gate recognition.
//!
//! Eight independent strategies, evaluated in order with short-circuiting
//! OR. Each one is a total, side-effect-free predicate; an ambiguous or
//! unresolvable pattern evaluates to false, which is the flag-it direction
//! for a security tool. Several strategies accept co-occurrence (a sender
//! access plus an "Unauthorized" error path somewhere in the same body) as
//! evidence without verifying any data-flow link between the two; that is a
//! documented precision/recall trade-off, kept as specified in the rule
//! catalog rather than silently tightened.

use crate::analysis::call_graph::CallGraph;
use crate::analysis::classify::{
    call_name, classify_storage_op, contains_word, is_sender_access, sender_accesses,
    StorageOpKind,
};
use crate::model::{BinOp, ContractModel, ExprId, ExprKind, FuncId};
use std::collections::HashMap;

/// Guard names recognized on method calls, beyond the assert/ensure/require
/// prefixes and the check-auth / verify-owner / only-owner pairs.
const GUARD_METHOD_NAMES: &[&str] = &[
    "is_admin",
    "can_execute",
    "can_modify",
    "check_permission",
    "validate_sender",
    "deduct_allowance",
];

/// Guard names recognized on free-function calls.
const GUARD_FREE_NAMES: &[&str] = &[
    "check_auth",
    "verify_sender",
    "assert_owner",
    "ensure_admin",
    "only_admin",
    "only_owner",
    "require_admin",
    "is_admin",
    "can_execute",
    "can_modify",
    "check_permission",
    "validate_sender",
    "assert_admin",
    "deduct_allowance",
];

fn subtree_has_sender_access(model: &ContractModel, root: ExprId) -> bool {
    model
        .descendants(root)
        .into_iter()
        .any(|id| is_sender_access(model, id))
}

fn has_unauthorized_text(model: &ContractModel, func: FuncId) -> bool {
    model
        .exprs_of(func)
        .any(|(_, e)| e.text.contains("Unauthorized"))
}

/// Strategy 1: an equality or inequality comparison keyed on the sender.
fn sender_comparison(model: &ContractModel, func: FuncId) -> bool {
    model.exprs_of(func).any(|(_, e)| match &e.kind {
        ExprKind::Binary { op, lhs, rhs } if op.is_comparison() => {
            subtree_has_sender_access(model, *lhs) || subtree_has_sender_access(model, *rhs)
        }
        _ => false,
    })
}

fn is_guard_method_name(method: &str) -> bool {
    method.starts_with("assert")
        || method.starts_with("ensure")
        || method.starts_with("require")
        || (method.contains("check") && method.contains("auth"))
        || (method.contains("verify") && method.contains("owner"))
        || (method.contains("only") && method.contains("owner"))
        || GUARD_METHOD_NAMES.iter().any(|g| method.contains(g))
}

/// Strategy 2: a method call carrying an assertion/guard vocabulary name.
fn guard_method_call(model: &ContractModel, func: FuncId) -> bool {
    model.exprs_of(func).any(|(_, e)| match &e.kind {
        ExprKind::MethodCall { method, .. } => is_guard_method_name(method),
        _ => false,
    })
}

/// Strategy 3: sender access and an "Unauthorized" error path co-occur.
fn sender_unauthorized_cooccurrence(model: &ContractModel, func: FuncId) -> bool {
    !sender_accesses(model, func).is_empty() && has_unauthorized_text(model, func)
}

/// Strategy 4: a free-function call into a known guard helper.
fn guard_free_call(model: &ContractModel, func: FuncId) -> bool {
    model.exprs_of(func).any(|(id, e)| match &e.kind {
        ExprKind::Call { .. } => call_name(model, id)
            .map(|name| GUARD_FREE_NAMES.iter().any(|g| name.contains(g)))
            .unwrap_or(false),
        _ => false,
    })
}

/// Strategy 5: membership-style authorization — a storage read keyed by the
/// sender ("look myself up or fail") plus an "Unauthorized" path. The
/// argument check is source-range containment, not text equality, because
/// borrow syntax elides the inner expression's printed form.
fn sender_keyed_storage_read(model: &ContractModel, func: FuncId) -> bool {
    if !has_unauthorized_text(model, func) {
        return false;
    }
    let senders = sender_accesses(model, func);
    if senders.is_empty() {
        return false;
    }
    model.exprs_of(func).any(|(_, e)| match &e.kind {
        ExprKind::MethodCall { method, args, .. }
            if classify_storage_op(method) == Some(StorageOpKind::Read) =>
        {
            args.iter().any(|arg| {
                let arg_span = model.expr(*arg).span;
                senders
                    .iter()
                    .any(|s| arg_span.contains(&model.expr(*s).span))
            })
        }
        _ => false,
    })
}

/// Strategy 6: state-machine gating — the function reads a `status` field
/// and branches on it.
fn status_gate(model: &ContractModel, func: FuncId) -> bool {
    let reads_status = model.exprs_of(func).any(
        |(_, e)| matches!(&e.kind, ExprKind::Field { field, .. } if field == "status"),
    );
    if !reads_status {
        return false;
    }
    model.exprs_of(func).any(|(_, e)| match &e.kind {
        ExprKind::Binary { op, lhs, rhs } if op.is_comparison() => {
            model.expr(*lhs).text.contains("status") || model.expr(*rhs).text.contains("status")
        }
        ExprKind::Match { scrutinee, .. } => model.expr(*scrutinee).text.contains("status"),
        _ => false,
    })
}

/// Strategy 7: a dispatcher extracted the caller identity and passed it down
/// as a parameter literally named `sender`.
fn sender_parameter(model: &ContractModel, func: FuncId) -> bool {
    model.func(func).has_param_named("sender") && has_unauthorized_text(model, func)
}

/// Strategy 8: voting-power or permission-gate helpers.
fn permission_gate_call(model: &ContractModel, func: FuncId) -> bool {
    model.exprs_of(func).any(|(id, e)| match &e.kind {
        ExprKind::MethodCall { method, .. } => {
            method.contains("voting_power") || method.contains("is_permitted")
        }
        ExprKind::Call { .. } => call_name(model, id)
            .map(|name| name.contains("voting_power"))
            .unwrap_or(false),
        _ => false,
    })
}

type Strategy = fn(&ContractModel, FuncId) -> bool;

/// Ordered strategy list; presence of any one is sufficient. Kept as named
/// independent functions so a single heuristic can be adjusted or removed
/// without destabilizing the others.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("sender-comparison", sender_comparison),
    ("guard-method-call", guard_method_call),
    ("sender-unauthorized-cooccurrence", sender_unauthorized_cooccurrence),
    ("guard-free-call", guard_free_call),
    ("sender-keyed-storage-read", sender_keyed_storage_read),
    ("status-gate", status_gate),
    ("sender-parameter", sender_parameter),
    ("permission-gate-call", permission_gate_call),
];

/// Authorization decisions over a fixed model, memoized by function index.
pub struct AuthEvaluator<'a> {
    model: &'a ContractModel,
    graph: &'a CallGraph,
    memo: HashMap<FuncId, bool>,
}

impl<'a> AuthEvaluator<'a> {
    pub fn new(model: &'a ContractModel, graph: &'a CallGraph) -> Self {
        Self {
            model,
            graph,
            memo: HashMap::new(),
        }
    }

    /// True iff any structural authorization pattern is present in the body.
    pub fn has_check(&mut self, func: FuncId) -> bool {
        if let Some(&cached) = self.memo.get(&func) {
            return cached;
        }
        let result = STRATEGIES
            .iter()
            .any(|(_, strategy)| strategy(self.model, func));
        self.memo.insert(func, result);
        result
    }

    /// One call-level hop, never recursive: a check in a callee-of-a-callee
    /// does not count.
    pub fn has_check_transitive(&mut self, func: FuncId) -> bool {
        if self.has_check(func) {
            return true;
        }
        let callees = self.graph.resolved_callees(self.model, func);
        callees.into_iter().any(|callee| self.has_check(callee))
    }

    /// A handler that only ever mutates the caller's own record needs no
    /// gate. The ADMIN/OWNER read exclusion guards against handlers that are
    /// self-serve for one record but also consult privileged configuration.
    pub fn is_self_serve(&self, func: FuncId) -> bool {
        let model = self.model;
        let writes: Vec<Vec<ExprId>> = model
            .exprs_of(func)
            .filter_map(|(_, e)| match &e.kind {
                ExprKind::MethodCall { method, args, .. }
                    if classify_storage_op(method) == Some(StorageOpKind::Write) =>
                {
                    Some(args.clone())
                }
                _ => None,
            })
            .collect();
        if writes.is_empty() {
            return false;
        }

        let senders = sender_accesses(model, func);
        let sender_keyed_write = writes.iter().any(|args| {
            args.iter().any(|arg| {
                let arg_span = model.expr(*arg).span;
                senders
                    .iter()
                    .any(|s| arg_span.contains(&model.expr(*s).span))
            })
        });
        let sender_param_write = model.func(func).has_param_named("sender")
            && writes.iter().any(|args| {
                args.iter()
                    .any(|arg| contains_word(&model.expr(*arg).text, "sender"))
            });
        if !sender_keyed_write && !sender_param_write {
            return false;
        }

        let privileged_read = model.exprs_of(func).any(|(_, e)| match &e.kind {
            ExprKind::MethodCall {
                receiver, method, ..
            } if classify_storage_op(method) == Some(StorageOpKind::Read) => {
                let recv = &model.expr(*receiver).text;
                recv.contains("ADMIN") || recv.contains("OWNER")
            }
            _ => false,
        });
        !privileged_read
    }

    /// Query-side helpers are not privileged writers even when reachable
    /// from an execute handler.
    pub fn is_query_only(&self, func: FuncId) -> bool {
        let f = self.model.func(func);
        f.name.starts_with("query") || f.ret.contains("Binary")
    }
}
