//! Adapters binding the domain ports to SQLite and HTTP.

pub mod http;
pub mod sqlite;
