//! Database models backing the document store.

pub mod config;
pub mod document;
