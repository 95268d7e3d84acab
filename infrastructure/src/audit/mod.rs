//! Audit log adapters

pub mod jsonl;
