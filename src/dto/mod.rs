//! Wire shapes shared by the HTTP routes and the resource client.

pub mod api;
