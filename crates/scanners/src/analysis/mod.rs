//! Classification and heuristic evaluation over the syntax model
//!
//! The layer every rule composes: entry-point and storage-operation
//! classification, static call resolution, and the multi-strategy
//! authorization evaluator. All of it is pure reads over the immutable
//! arena, so rules can run concurrently without coordination.

pub mod authorization;
pub mod call_graph;
pub mod classify;

pub use authorization::AuthEvaluator;
pub use call_graph::CallGraph;
pub use classify::{
    call_name, classify_entry_point, classify_storage_op, contains_word, is_dispatch_match,
    is_sender_access, path_tail, sender_accesses, storage_declaration_key, storage_ops,
    writes_storage, EntryKind, StorageOpKind,
};
