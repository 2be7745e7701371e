//! Rule execution and orchestration.
//!
//! The engine runs registered rules over a shared analysis context, in
//! parallel when configured, and folds their findings into one report with a
//! stable ordering. The registry provides rule discovery so the CLI can list
//! and select rules without knowing their concrete types.

pub mod engine;
pub mod registry;

pub use engine::{ScanReport, ScannerInfo, ScanningEngine, SeverityCount};
pub use registry::ScannerRegistry;
