//! Configuration models for the gateway, its queue, and its timeouts.

pub mod gateway;

pub use gateway::{GatewayConfig, ENV_PREFIX};
