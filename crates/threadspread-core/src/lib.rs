//! Threadspread Core - shared types for the threadspread scheduler
//!
//! This crate provides:
//! - CPU quantity parsing (milli-core fixed point)
//! - Per-pod CPU limit/request totals
//! - Error types with miette diagnostics

pub mod error;
pub mod quantities;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use quantities::{parse_cpu, pod_cpu_totals, CpuTotals};

// Re-export k8s-openapi types for convenience
pub use k8s_openapi;
pub use k8s_openapi::api::core::v1::{Node, Pod};
pub use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
