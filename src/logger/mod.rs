//! Activity logging: JSONL append-only with graceful degradation, fed by a
//! background logger thread.

pub mod activity;
pub mod jsonl;
