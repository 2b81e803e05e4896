//! Domain types shared by the server, the seed tool and the HTTP client.

pub mod auth;
pub mod collection;
pub mod document;
pub mod pharmacy;
pub mod records;
pub mod types;
