//! Infrastructure adapters for reaching the external analysis service.

pub mod http_backend;

pub use http_backend::HttpAnalysisBackend;
