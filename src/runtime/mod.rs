//! Runtime adapters: HTTP API surface and server lifecycle.

pub mod api;
pub mod server;

pub use api::{router, ApiError, Health};
pub use server::{serve, shutdown_signal};
