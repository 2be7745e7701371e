//! Immutable syntax model consumed by every classifier and rule.
//!
//! One arena per analysis session holds all files, functions, and
//! expressions; the front end fills it, everything downstream only reads.

pub mod arena;
pub mod span;

pub use arena::{
    BinOp, ContractModel, ExprId, ExprKind, ExprNode, FileId, FuncId, Function, MatchArm, Param,
    SourceFile,
};
pub use span::Span;
