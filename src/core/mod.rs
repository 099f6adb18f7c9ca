//! Core business logic - framework-agnostic capacity and distance planning.
//!
//! Each submodule takes an explicit tenant (`company_id`) and a database connection;
//! nothing here keeps global state.

/// Tenant-scoped unit availability with a request-scoped cache
pub mod availability;
/// Pairwise distance cache maintenance for route planning
pub mod distance;
/// Uncached availability of every unit type over one window
pub mod summary;
/// Trailer, water and septage usage per service event
pub mod usage;
