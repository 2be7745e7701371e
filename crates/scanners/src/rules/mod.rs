//! Built-in vulnerability rules.
//!
//! Each rule is a standalone [`Scanner`](crate::core::Scanner) over the lowered
//! contract model. Rules are independent: none consumes another's findings, and
//! the same storage access may surface in several of them.

pub mod ibc_cei_violation;
pub mod missing_address_validation;
pub mod missing_execute_authorization;
pub mod missing_migrate_authorization;
pub mod reply_ignores_errors;
pub mod storage_key_collision;
pub mod submsg_missing_reply_handler;
pub mod unchecked_arithmetic;
pub mod unchecked_storage_unwrap;
pub mod unprotected_dispatch;

pub use ibc_cei_violation::IbcCeiViolationScanner;
pub use missing_address_validation::MissingAddressValidationScanner;
pub use missing_execute_authorization::MissingExecuteAuthorizationScanner;
pub use missing_migrate_authorization::MissingMigrateAuthorizationScanner;
pub use reply_ignores_errors::ReplyIgnoresErrorsScanner;
pub use storage_key_collision::StorageKeyCollisionScanner;
pub use submsg_missing_reply_handler::SubmsgMissingReplyHandlerScanner;
pub use unchecked_arithmetic::UncheckedArithmeticScanner;
pub use unchecked_storage_unwrap::UncheckedStorageUnwrapScanner;
pub use unprotected_dispatch::UnprotectedDispatchScanner;

use crate::runner::ScannerRegistry;

/// Registers every built-in rule into `registry`.
pub fn register_builtin(registry: &mut ScannerRegistry) {
    registry.register(MissingExecuteAuthorizationScanner::new());
    registry.register(MissingMigrateAuthorizationScanner::new());
    registry.register(UnprotectedDispatchScanner::new());
    registry.register(UncheckedArithmeticScanner::new());
    registry.register(UncheckedStorageUnwrapScanner::new());
    registry.register(MissingAddressValidationScanner::new());
    registry.register(StorageKeyCollisionScanner::new());
    registry.register(IbcCeiViolationScanner::new());
    registry.register(SubmsgMissingReplyHandlerScanner::new());
    registry.register(ReplyIgnoresErrorsScanner::new());
}
