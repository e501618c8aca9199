//! Core business logic - framework-agnostic wallet, ledger, rule, and
//! reporting operations.

pub mod ledger;
pub mod report;
pub mod rules;
pub mod wallet;
