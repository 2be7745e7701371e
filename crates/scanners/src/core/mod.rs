//! Core abstractions for the rule framework
//!
//! The Scanner trait defines the interface all rules implement, Finding is
//! the immutable result value they emit, and AnalysisContext carries the
//! shared syntax model plus the scope configuration every rule consults.

pub mod context;
pub mod result;
pub mod scanner;
pub mod severity;

pub use context::{AnalysisContext, ScannerConfig, ScopeConfig};
pub use result::{Finding, FindingMetadata, Location};
pub use scanner::Scanner;
pub use severity::{Confidence, Severity};
