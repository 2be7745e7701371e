use crate::frontend::FrontendError;
use crate::model::{
    BinOp, ContractModel, ExprId, ExprKind, ExprNode, FileId, FuncId, Function, MatchArm, Param,
    Span,
};
use quote::ToTokens;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use tracing::warn;

/// Parses one source file and lowers it into the model. Const and static
/// initializers lower with no enclosing function, which is what marks them
/// as compile-time data downstream.
pub fn lower_file(
    model: &mut ContractModel,
    path: &str,
    source: &str,
) -> Result<FileId, FrontendError> {
    let ast = syn::parse_file(source).map_err(|source| FrontendError::Parse {
        path: path.to_string(),
        source,
    })?;
    let file = model.add_file(path);
    let mut lowerer = Lowerer { model, file };
    lowerer.lower_items(&ast.items, false);
    Ok(file)
}

/// Parse-failure-tolerant variant: a malformed file is logged and skipped,
/// never fatal for the rest of the session.
pub fn lower_file_lossy(model: &mut ContractModel, path: &str, source: &str) -> Option<FileId> {
    match lower_file(model, path, source) {
        Ok(file) => Some(file),
        Err(err) => {
            warn!(%err, "skipping unparseable file");
            None
        }
    }
}

fn tokens_text<T: ToTokens>(t: &T) -> String {
    t.to_token_stream().to_string()
}

fn span_of<T: Spanned>(t: &T) -> Span {
    let s = t.span();
    Span::new(s.start().line, s.start().column, s.end().line, s.end().column)
}

fn is_cfg_test(attr: &syn::Attribute) -> bool {
    attr.path().is_ident("cfg") && tokens_text(attr).contains("test")
}

fn pat_name(pat: &syn::Pat) -> String {
    match pat {
        syn::Pat::Ident(p) => p.ident.to_string(),
        other => tokens_text(other),
    }
}

struct Lowerer<'a> {
    model: &'a mut ContractModel,
    file: FileId,
}

impl Lowerer<'_> {
    fn lower_items(&mut self, items: &[syn::Item], in_test_mod: bool) {
        for item in items {
            match item {
                syn::Item::Fn(f) => {
                    self.lower_fn(&f.sig, &f.attrs, &f.block, in_test_mod);
                }
                syn::Item::Impl(imp) => {
                    for member in &imp.items {
                        if let syn::ImplItem::Fn(m) = member {
                            self.lower_fn(&m.sig, &m.attrs, &m.block, in_test_mod);
                        }
                    }
                }
                syn::Item::Mod(m) => {
                    if let Some((_, items)) = &m.content {
                        let test_mod = in_test_mod
                            || m.ident == "tests"
                            || m.attrs.iter().any(is_cfg_test);
                        self.lower_items(items, test_mod);
                    }
                }
                syn::Item::Const(c) => {
                    self.lower_expr(&c.expr, None, None);
                }
                syn::Item::Static(s) => {
                    self.lower_expr(&s.expr, None, None);
                }
                _ => {}
            }
        }
    }

    fn lower_fn(
        &mut self,
        sig: &syn::Signature,
        attrs: &[syn::Attribute],
        block: &syn::Block,
        in_test_mod: bool,
    ) {
        let params = sig
            .inputs
            .iter()
            .map(|input| match input {
                syn::FnArg::Typed(pt) => Param {
                    name: pat_name(&pt.pat),
                    ty: tokens_text(&pt.ty),
                },
                syn::FnArg::Receiver(_) => Param {
                    name: "self".to_string(),
                    ty: "Self".to_string(),
                },
            })
            .collect();

        let ret = match &sig.output {
            syn::ReturnType::Default => String::new(),
            syn::ReturnType::Type(_, ty) => tokens_text(ty),
        };

        let is_test = in_test_mod || attrs.iter().any(|a| a.path().is_ident("test"));

        let func = self.model.push_function(Function {
            name: sig.ident.to_string(),
            params,
            ret,
            attrs: attrs.iter().map(tokens_text).collect(),
            body: None,
            file: self.file,
            span: span_of(sig).merge(&span_of(block)),
            is_test,
        });

        let body = self.reserve(
            tokens_text(block),
            span_of(block),
            Some(func),
            None,
        );
        let children = self.lower_stmts(block, Some(func), body);
        self.model.set_expr_kind(body, ExprKind::Block { children });
        self.model.set_body(func, body);
    }

    fn reserve(
        &mut self,
        text: String,
        span: Span,
        func: Option<FuncId>,
        parent: Option<ExprId>,
    ) -> ExprId {
        self.model.push_expr(ExprNode {
            kind: ExprKind::Block {
                children: Vec::new(),
            },
            text,
            span,
            func,
            file: self.file,
            parent,
        })
    }

    fn lower_stmts(
        &mut self,
        block: &syn::Block,
        func: Option<FuncId>,
        parent: ExprId,
    ) -> Vec<ExprId> {
        let mut children = Vec::new();
        for stmt in &block.stmts {
            match stmt {
                syn::Stmt::Local(local) => {
                    if let Some(init) = &local.init {
                        children.push(self.lower_expr(&init.expr, func, Some(parent)));
                        if let Some((_, diverge)) = &init.diverge {
                            children.push(self.lower_expr(diverge, func, Some(parent)));
                        }
                    }
                }
                syn::Stmt::Expr(e, _) => {
                    children.push(self.lower_expr(e, func, Some(parent)));
                }
                syn::Stmt::Macro(sm) => {
                    children.push(self.lower_macro(&sm.mac, func, Some(parent)));
                }
                syn::Stmt::Item(_) => {}
            }
        }
        children
    }

    /// Macro invocations become free calls keyed by the macro path. The
    /// arguments are re-parsed as expressions when they form a valid
    /// comma-separated list, so sender accesses and error paths inside
    /// `ensure!`-style guards stay visible to the evaluator.
    fn lower_macro(
        &mut self,
        mac: &syn::Macro,
        func: Option<FuncId>,
        parent: Option<ExprId>,
    ) -> ExprId {
        let id = self.reserve(tokens_text(mac), span_of(mac), func, parent);
        let args = match Punctuated::<syn::Expr, syn::Token![,]>::parse_terminated
            .parse2(mac.tokens.clone())
        {
            Ok(parsed) => parsed
                .iter()
                .map(|a| self.lower_expr(a, func, Some(id)))
                .collect(),
            Err(_) => Vec::new(),
        };
        self.model.set_expr_kind(
            id,
            ExprKind::Call {
                callee: tokens_text(&mac.path),
                args,
            },
        );
        id
    }

    fn lower_expr(&mut self, e: &syn::Expr, func: Option<FuncId>, parent: Option<ExprId>) -> ExprId {
        let id = self.reserve(tokens_text(e), span_of(e), func, parent);
        let kind = match e {
            syn::Expr::Binary(b) => ExprKind::Binary {
                op: match b.op {
                    syn::BinOp::Add(_) | syn::BinOp::AddAssign(_) => BinOp::Add,
                    syn::BinOp::Sub(_) | syn::BinOp::SubAssign(_) => BinOp::Sub,
                    syn::BinOp::Mul(_) | syn::BinOp::MulAssign(_) => BinOp::Mul,
                    syn::BinOp::Eq(_) => BinOp::Eq,
                    syn::BinOp::Ne(_) => BinOp::Ne,
                    _ => BinOp::Other,
                },
                lhs: self.lower_expr(&b.left, func, Some(id)),
                rhs: self.lower_expr(&b.right, func, Some(id)),
            },
            syn::Expr::Field(f) => ExprKind::Field {
                base: self.lower_expr(&f.base, func, Some(id)),
                field: match &f.member {
                    syn::Member::Named(ident) => ident.to_string(),
                    syn::Member::Unnamed(index) => index.index.to_string(),
                },
            },
            syn::Expr::MethodCall(m) => ExprKind::MethodCall {
                receiver: self.lower_expr(&m.receiver, func, Some(id)),
                method: m.method.to_string(),
                args: m
                    .args
                    .iter()
                    .map(|a| self.lower_expr(a, func, Some(id)))
                    .collect(),
            },
            syn::Expr::Call(c) => ExprKind::Call {
                callee: tokens_text(&c.func),
                args: c
                    .args
                    .iter()
                    .map(|a| self.lower_expr(a, func, Some(id)))
                    .collect(),
            },
            syn::Expr::Match(m) => {
                let scrutinee = self.lower_expr(&m.expr, func, Some(id));
                let arms = m
                    .arms
                    .iter()
                    .map(|arm| MatchArm {
                        pat: tokens_text(&arm.pat),
                        body: self.lower_expr(&arm.body, func, Some(id)),
                    })
                    .collect();
                ExprKind::Match { scrutinee, arms }
            }
            syn::Expr::Lit(l) => ExprKind::Lit {
                str_value: match &l.lit {
                    syn::Lit::Str(s) => Some(s.value()),
                    _ => None,
                },
            },
            syn::Expr::Path(_) => ExprKind::Path,
            syn::Expr::Macro(m) => {
                // lower_macro reserves its own node; drop the outer reservation
                // by reusing it as a single-child wrapper.
                let inner = self.lower_macro(&m.mac, func, Some(id));
                ExprKind::Block {
                    children: vec![inner],
                }
            }
            syn::Expr::Block(b) => ExprKind::Block {
                children: self.lower_stmts(&b.block, func, id),
            },
            other => ExprKind::Block {
                children: self.lower_composite(other, func, id),
            },
        };
        self.model.set_expr_kind(id, kind);
        id
    }

    /// Child expressions of composite forms the rules only look through.
    fn lower_composite(
        &mut self,
        e: &syn::Expr,
        func: Option<FuncId>,
        parent: ExprId,
    ) -> Vec<ExprId> {
        let p = Some(parent);
        match e {
            syn::Expr::Array(a) => a.elems.iter().map(|x| self.lower_expr(x, func, p)).collect(),
            syn::Expr::Assign(a) => vec![
                self.lower_expr(&a.left, func, p),
                self.lower_expr(&a.right, func, p),
            ],
            syn::Expr::Async(a) => self.lower_stmts(&a.block, func, parent),
            syn::Expr::Await(a) => vec![self.lower_expr(&a.base, func, p)],
            syn::Expr::Break(b) => b
                .expr
                .iter()
                .map(|x| self.lower_expr(x, func, p))
                .collect(),
            syn::Expr::Cast(c) => vec![self.lower_expr(&c.expr, func, p)],
            syn::Expr::Closure(c) => vec![self.lower_expr(&c.body, func, p)],
            syn::Expr::ForLoop(f) => {
                let mut out = vec![self.lower_expr(&f.expr, func, p)];
                out.extend(self.lower_stmts(&f.body, func, parent));
                out
            }
            syn::Expr::Group(g) => vec![self.lower_expr(&g.expr, func, p)],
            syn::Expr::If(i) => {
                let mut out = vec![self.lower_expr(&i.cond, func, p)];
                out.extend(self.lower_stmts(&i.then_branch, func, parent));
                if let Some((_, else_branch)) = &i.else_branch {
                    out.push(self.lower_expr(else_branch, func, p));
                }
                out
            }
            syn::Expr::Index(i) => vec![
                self.lower_expr(&i.expr, func, p),
                self.lower_expr(&i.index, func, p),
            ],
            syn::Expr::Let(l) => vec![self.lower_expr(&l.expr, func, p)],
            syn::Expr::Loop(l) => self.lower_stmts(&l.body, func, parent),
            syn::Expr::Paren(x) => vec![self.lower_expr(&x.expr, func, p)],
            syn::Expr::Range(r) => {
                let mut out = Vec::new();
                if let Some(start) = &r.start {
                    out.push(self.lower_expr(start, func, p));
                }
                if let Some(end) = &r.end {
                    out.push(self.lower_expr(end, func, p));
                }
                out
            }
            syn::Expr::Reference(r) => vec![self.lower_expr(&r.expr, func, p)],
            syn::Expr::Repeat(r) => vec![
                self.lower_expr(&r.expr, func, p),
                self.lower_expr(&r.len, func, p),
            ],
            syn::Expr::Return(r) => r
                .expr
                .iter()
                .map(|x| self.lower_expr(x, func, p))
                .collect(),
            syn::Expr::Struct(s) => {
                let mut out: Vec<ExprId> = s
                    .fields
                    .iter()
                    .map(|f| self.lower_expr(&f.expr, func, p))
                    .collect();
                if let Some(rest) = &s.rest {
                    out.push(self.lower_expr(rest, func, p));
                }
                out
            }
            syn::Expr::Try(t) => vec![self.lower_expr(&t.expr, func, p)],
            syn::Expr::TryBlock(t) => self.lower_stmts(&t.block, func, parent),
            syn::Expr::Tuple(t) => t.elems.iter().map(|x| self.lower_expr(x, func, p)).collect(),
            syn::Expr::Unary(u) => vec![self.lower_expr(&u.expr, func, p)],
            syn::Expr::Unsafe(u) => self.lower_stmts(&u.block, func, parent),
            syn::Expr::While(w) => {
                let mut out = vec![self.lower_expr(&w.cond, func, p)];
                out.extend(self.lower_stmts(&w.body, func, parent));
                out
            }
            syn::Expr::Yield(y) => y
                .expr
                .iter()
                .map(|x| self.lower_expr(x, func, p))
                .collect(),
            _ => Vec::new(),
        }
    }
}
