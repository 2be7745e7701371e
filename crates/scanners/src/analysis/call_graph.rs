//! Static call resolution for one-hop transitive checks.
//!
//! Only direct path calls to uniquely-named in-scope functions resolve.
//! Calls through variables, trait objects, or methods resolve to nothing —
//! silently, because missing evidence is the conservative direction here.

use crate::analysis::classify::path_tail;
use crate::core::ScopeConfig;
use crate::model::{ContractModel, ExprId, ExprKind, FuncId};
use std::collections::HashMap;

pub struct CallGraph {
    /// Function name to definition; `None` marks a name defined more than
    /// once, which stays unresolvable.
    targets: HashMap<String, Option<FuncId>>,
}

impl CallGraph {
    pub fn build(model: &ContractModel, scope: &ScopeConfig) -> Self {
        let mut targets: HashMap<String, Option<FuncId>> = HashMap::new();
        for (id, f) in model.functions() {
            if !scope.is_in_scope(&model.file(f.file).path) {
                continue;
            }
            targets
                .entry(f.name.clone())
                .and_modify(|slot| *slot = None)
                .or_insert(Some(id));
        }
        Self { targets }
    }

    /// Resolves a call site to its static target, if any.
    pub fn resolve_target(&self, model: &ContractModel, call: ExprId) -> Option<FuncId> {
        match &model.expr(call).kind {
            ExprKind::Call { callee, .. } => {
                self.targets.get(path_tail(callee)).copied().flatten()
            }
            _ => None,
        }
    }

    /// Unique resolved callees of a function, in call-site order. This is
    /// the single hop the transitive checks are allowed; callers never walk
    /// further.
    pub fn resolved_callees(&self, model: &ContractModel, func: FuncId) -> Vec<FuncId> {
        let mut out = Vec::new();
        for (id, _) in model.exprs_of(func) {
            if let Some(target) = self.resolve_target(model, id) {
                if target != func && !out.contains(&target) {
                    out.push(target);
                }
            }
        }
        out
    }
}
