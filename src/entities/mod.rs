//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod ledger_entry;
pub mod wallet;
pub mod wallet_rule;

// Re-export specific types to avoid conflicts
pub use ledger_entry::{
    Column as LedgerEntryColumn, Entity as LedgerEntry, Model as LedgerEntryModel,
};
pub use wallet::{Column as WalletColumn, Entity as Wallet, Model as WalletModel};
pub use wallet_rule::{Column as WalletRuleColumn, Entity as WalletRule, Model as WalletRuleModel};
