//! Problems IPC - transports to the system problem daemon
//!
//! Provides the client side of the daemon's two entry points:
//!
//! - [`bus::BusTransport`] - the `org.freedesktop.problems` interface on
//!   the system bus, with reconnect-and-retry when the daemon restarts
//! - [`socket::SocketTransport`] - the creation-only Unix socket fallback
//!
//! [`client::get_client`] picks one at startup and returns it as a
//! [`client::ProblemClient`].
//!
//! # Features
//! - `dbus` (default) - builds the zbus system bus binding. Without it the
//!   client always falls back to the socket.

pub mod bus;
pub mod client;
#[cfg(feature = "dbus")]
pub mod dbus;
pub mod socket;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{get_client, select_client, ProblemClient, SharedProblemClient};
