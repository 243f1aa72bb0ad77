pub mod coa_tree;
pub mod ledger_service;
pub mod posting_service;
pub mod reversal_service;
pub mod trial_balance_service;
