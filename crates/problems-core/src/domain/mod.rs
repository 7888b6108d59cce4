//! Domain types for problem records
//!
//! - [`ProblemData`] - key/value fields describing one problem
//! - [`fields`] - item names the daemon stores in a dump directory
//! - [`ProblemError`] - errors surfaced by every transport

pub mod errors;
pub mod problem;

pub use errors::ProblemError;
pub use problem::{fields, ProblemData};
