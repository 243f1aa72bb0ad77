pub mod account_repo;
pub mod journal_repo;
pub mod ledger_query_repo;
