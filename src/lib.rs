//! # PatentPulse Gateway
//!
//! A load-shedding gateway for document analysis. Uploaded documents become
//! jobs on a small bounded queue; a fixed pool of workers hands each one to an
//! external analysis service under a hard deadline and returns the result to
//! the waiting caller.
//!
//! ## Core Problem Solved
//!
//! Document analysis is slow and the analysis service is easy to overload:
//!
//! - **Bounded Load**: at most `worker_count` analysis calls are ever in flight
//! - **Load Shedding**: when the queue stays full for the admission window,
//!   the request is rejected immediately instead of piling up
//! - **Hung Dependencies**: every downstream call is abandoned at its deadline,
//!   so one slow analysis never pins a worker
//! - **Uniform Failures**: anything that goes wrong after admission is reported
//!   as a result with `risk_score = -1` and an error message
//!
//! ## Gateway
//!
//! ```rust,ignore
//! use patentpulse_gateway::builders::build_gateway;
//! use patentpulse_gateway::config::GatewayConfig;
//! use patentpulse_gateway::infra::HttpAnalysisBackend;
//! use std::time::Duration;
//!
//! let config = GatewayConfig::new()
//!     .with_worker_count(3)
//!     .with_queue_capacity(10)
//!     .with_admission_wait_timeout(Duration::from_secs(2))
//!     .with_downstream_deadline(Duration::from_secs(5));
//!
//! let backend = HttpAnalysisBackend::new("http://localhost:5000/analyze")?;
//! let gateway = build_gateway(&config, backend)?;
//!
//! match gateway.submit("claims.pdf", bytes).await {
//!     Ok(result) if result.is_sentinel() => eprintln!("analysis failed: {:?}", result.error),
//!     Ok(result) => println!("risk {}", result.risk_score),
//!     Err(GatewayError::Busy { .. }) => eprintln!("try again later"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
//!
//! For complete examples, see:
//! - `tests/gateway_test.rs` - admission, concurrency and deadline behavior
//! - `tests/http_api_test.rs` - the HTTP upload surface end to end

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core admission control, job queue, and worker pool.
pub mod core;
/// Configuration models for the gateway and its timeouts.
pub mod config;
/// Builders to construct a gateway from configuration.
pub mod builders;
/// Infrastructure adapters for the analysis service.
pub mod infra;
/// HTTP API surface and server lifecycle.
pub mod runtime;
/// Shared utilities.
pub mod util;
