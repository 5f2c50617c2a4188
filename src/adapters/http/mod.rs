//! Read-only HTTP query API over the accumulated results.

pub mod blocklist;
pub mod handlers;
pub mod server;

pub use blocklist::Blocklist;
pub use handlers::ApiContext;
pub use server::{build_router, serve};
