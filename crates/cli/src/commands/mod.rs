//! Command implementations for the vigil CLI.
//!
//! `scan` walks a contract source tree, lowers every in-scope Rust file into
//! one shared model, and runs the rule engine over it; its exit code gates
//! CI on High and Critical findings. `rules` lists the built-in rules with
//! their identifiers, severities, and CWE mappings.

pub mod rules;
pub mod scan;
