pub mod journal_draft_v1;
