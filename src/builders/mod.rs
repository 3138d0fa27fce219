//! Builders to construct gateway components from configuration.

pub mod gateway_builder;

pub use gateway_builder::{build_gateway, build_http_gateway};
