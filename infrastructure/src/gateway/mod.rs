//! Reasoning gateway adapters

pub mod scripted;
