//! Port definitions (hexagonal architecture interfaces)
//!
//! - [`IProblemService`] - the operations every transport exposes
//! - [`IBusBinding`] / [`IBusObject`] / [`IBusInterface`] - the message
//!   bus surface `BusTransport` drives, injected so it can be swapped for
//!   an in-memory binding

pub mod bus;
pub mod problem_service;

pub use bus::{BusFault, BusReply, BusRequest, IBusBinding, IBusInterface, IBusObject};
pub use problem_service::IProblemService;
