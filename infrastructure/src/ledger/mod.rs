//! File-backed decision ledger

pub mod store;
