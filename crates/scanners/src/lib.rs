//! Vigil Scanners - CosmWasm Vulnerability Detection
//!
//! This crate lowers CosmWasm contract sources into an arena-indexed model and
//! runs a set of trait-based rules over it: entry-point classification,
//! storage-operation classification, call-graph resolution, and layered
//! authorization heuristics feed ten built-in vulnerability rules.

pub mod analysis;
pub mod core;
pub mod frontend;
pub mod model;
pub mod rules;
pub mod runner;

pub use core::{
    AnalysisContext, Confidence, Finding, Location, Scanner, ScannerConfig, ScopeConfig, Severity,
};

pub use frontend::{lower_file, lower_file_lossy, FrontendError};

pub use model::{ContractModel, ExprId, ExprKind, FileId, FuncId, Span};

pub use rules::{
    IbcCeiViolationScanner, MissingAddressValidationScanner, MissingExecuteAuthorizationScanner,
    MissingMigrateAuthorizationScanner, ReplyIgnoresErrorsScanner, StorageKeyCollisionScanner,
    SubmsgMissingReplyHandlerScanner, UncheckedArithmeticScanner, UncheckedStorageUnwrapScanner,
    UnprotectedDispatchScanner,
};

pub use runner::{ScanReport, ScannerRegistry, ScanningEngine};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
