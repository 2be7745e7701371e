//! Front end: lowers CosmWasm contract source into the arena model.
//!
//! Parse-then-extract: `syn` parses the raw text, and the lowerer pulls out
//! only the shapes the rules reason about.

pub mod lower;

use thiserror::Error;

pub use lower::{lower_file, lower_file_lossy};

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: syn::Error,
    },
}
