//! Scanner trait for pluggable rule implementations.
//!
//! Each rule is an independent scanner over the shared immutable context.
//! Scanners have no mutable state of their own, which is what lets the
//! engine run them in parallel with nothing but read sharing. A scanner
//! that cannot decide emits nothing; "no finding" and "provably clean" are
//! indistinguishable on purpose.

use crate::core::{AnalysisContext, Confidence, Finding, Severity};
use anyhow::Result;

pub trait Scanner: Send + Sync {
    /// Stable rule identifier, used in reports and deduplication.
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "No description provided"
    }

    /// CWE reference for the vulnerability class, where one applies.
    fn cwe(&self) -> Option<&'static str> {
        None
    }

    fn severity(&self) -> Severity;

    fn confidence(&self) -> Confidence;

    fn scan(&self, context: &AnalysisContext) -> Result<Vec<Finding>>;

    fn enabled_by_default(&self) -> bool {
        true
    }
}
