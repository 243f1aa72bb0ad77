pub mod accounts;
pub mod journal;
pub mod ledger;
pub mod trial_balance;
