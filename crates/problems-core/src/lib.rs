//! Problems Core - Domain types and ports for the problems client
//!
//! This crate contains the transport-independent half of the client:
//! - **Domain** - `ProblemData`, well-known field names, `ProblemError`
//! - **Ports** - `IProblemService` and the bus binding traits the
//!   adapters in `problems-ipc` implement
//! - **Configuration** - transport selection and logging settings
//!
//! # Architecture
//!
//! Ports define the seams. `problems-ipc` provides the D-Bus and socket
//! adapters; tests provide in-memory bus bindings.

pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
