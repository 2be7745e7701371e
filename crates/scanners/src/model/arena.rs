//! Arena-indexed syntax model.
//!
//! Nodes are referenced by integer index rather than pointer, which keeps the
//! tree trivially shareable across scanner threads and makes memoization
//! keyed by node identity cheap. The tree is built once by the front end and
//! read-only during analysis.

use crate::model::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub usize);

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    /// Return type as token text; empty for `()`.
    pub ret: String,
    /// Full token text of each attribute, so `entry_point` stays visible
    /// even when wrapped in `cfg_attr`.
    pub attrs: Vec<String>,
    pub body: Option<ExprId>,
    pub file: FileId,
    pub span: Span,
    /// `#[test]` functions and functions inside `#[cfg(test)]`/`mod tests`.
    pub is_test: bool,
}

impl Function {
    pub fn has_param_named(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    pub fn last_param(&self) -> Option<&Param> {
        self.params.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Eq,
    Ne,
    Other,
}

impl BinOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne)
    }
}

#[derive(Debug, Clone)]
pub struct MatchArm {
    pub pat: String,
    pub body: ExprId,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Binary {
        op: BinOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Field {
        base: ExprId,
        field: String,
    },
    MethodCall {
        receiver: ExprId,
        method: String,
        args: Vec<ExprId>,
    },
    /// Free or path call. Macro invocations lower here as well, with the
    /// macro path as callee.
    Call {
        callee: String,
        args: Vec<ExprId>,
    },
    Match {
        scrutinee: ExprId,
        arms: Vec<MatchArm>,
    },
    Lit {
        str_value: Option<String>,
    },
    Path,
    /// Catch-all composite: blocks, if/loops, struct literals, references,
    /// anything the rules only ever look through.
    Block {
        children: Vec<ExprId>,
    },
}

#[derive(Debug, Clone)]
pub struct ExprNode {
    pub kind: ExprKind,
    /// Token text of the expression, used by the deliberately loose textual
    /// heuristics. Tokens are space-separated (`info . sender`).
    pub text: String,
    pub span: Span,
    /// `None` for const/static initializers; this is the discriminator
    /// between real code and compile-time data.
    pub func: Option<FuncId>,
    pub file: FileId,
    pub parent: Option<ExprId>,
}

/// The immutable tree every classifier and rule reads.
#[derive(Debug, Default)]
pub struct ContractModel {
    files: Vec<SourceFile>,
    functions: Vec<Function>,
    exprs: Vec<ExprNode>,
}

impl ContractModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<String>) -> FileId {
        self.files.push(SourceFile { path: path.into() });
        FileId(self.files.len() - 1)
    }

    pub(crate) fn push_function(&mut self, function: Function) -> FuncId {
        self.functions.push(function);
        FuncId(self.functions.len() - 1)
    }

    pub(crate) fn set_body(&mut self, func: FuncId, body: ExprId) {
        self.functions[func.0].body = Some(body);
    }

    pub(crate) fn push_expr(&mut self, node: ExprNode) -> ExprId {
        self.exprs.push(node);
        ExprId(self.exprs.len() - 1)
    }

    pub(crate) fn set_expr_kind(&mut self, id: ExprId, kind: ExprKind) {
        self.exprs[id.0].kind = kind;
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.0]
    }

    pub fn func(&self, id: FuncId) -> &Function {
        &self.functions[id.0]
    }

    pub fn expr(&self, id: ExprId) -> &ExprNode {
        &self.exprs[id.0]
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files.iter().enumerate().map(|(i, f)| (FileId(i), f))
    }

    pub fn functions(&self) -> impl Iterator<Item = (FuncId, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FuncId(i), f))
    }

    /// All expressions belonging to a function body, in lowering order.
    pub fn exprs_of(&self, func: FuncId) -> impl Iterator<Item = (ExprId, &ExprNode)> {
        self.exprs
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.func == Some(func))
            .map(|(i, e)| (ExprId(i), e))
    }

    /// Expressions lowered outside any function (const/static initializers).
    pub fn initializer_exprs(&self, file: FileId) -> impl Iterator<Item = (ExprId, &ExprNode)> {
        self.exprs
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.func.is_none() && e.file == file)
            .map(|(i, e)| (ExprId(i), e))
    }

    pub fn children(&self, id: ExprId) -> Vec<ExprId> {
        match &self.exprs[id.0].kind {
            ExprKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            ExprKind::Field { base, .. } => vec![*base],
            ExprKind::MethodCall { receiver, args, .. } => {
                let mut out = vec![*receiver];
                out.extend(args.iter().copied());
                out
            }
            ExprKind::Call { args, .. } => args.clone(),
            ExprKind::Match { scrutinee, arms } => {
                let mut out = vec![*scrutinee];
                out.extend(arms.iter().map(|a| a.body));
                out
            }
            ExprKind::Lit { .. } | ExprKind::Path => Vec::new(),
            ExprKind::Block { children } => children.clone(),
        }
    }

    pub fn parent_of(&self, id: ExprId) -> Option<ExprId> {
        self.exprs[id.0].parent
    }

    /// Parent chain from an expression up to its body root, nearest first.
    /// The expression itself is not included.
    pub fn ancestors(&self, id: ExprId) -> Vec<ExprId> {
        let mut out = Vec::new();
        let mut cur = self.exprs[id.0].parent;
        while let Some(p) = cur {
            out.push(p);
            cur = self.exprs[p.0].parent;
        }
        out
    }

    /// Pre-order walk of a subtree, the root included.
    pub fn descendants(&self, root: ExprId) -> Vec<ExprId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut kids = self.children(id);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }
}
