//! Transport selection and the client facade
//!
//! The transport is chosen once, when the client is built, and never
//! revisited. Build the client at startup and pass it (or a
//! [`SharedProblemClient`] handle) to whatever needs it; there is no
//! process-wide instance behind this API.

use std::sync::Arc;

use problems_core::config::{TransportConfig, TransportMode};
use problems_core::domain::{ProblemData, ProblemError};
use problems_core::ports::bus::IBusBinding;
use problems_core::ports::IProblemService;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::bus::BusTransport;
use crate::socket::SocketTransport;

/// A client handle meant to live in process-wide state
pub type SharedProblemClient = Arc<Mutex<ProblemClient>>;

/// The selected transport behind one interface
pub enum ProblemClient {
    /// Full access through the system bus
    Bus(BusTransport),
    /// Creation-only fallback
    Socket(SocketTransport),
}

impl ProblemClient {
    /// `"dbus"` or `"socket"`
    pub fn transport_name(&self) -> &'static str {
        match self {
            ProblemClient::Bus(_) => "dbus",
            ProblemClient::Socket(_) => "socket",
        }
    }

    /// Whether calls beyond `create` can succeed
    pub fn is_connected(&self) -> bool {
        match self {
            ProblemClient::Bus(bus) => bus.is_connected(),
            ProblemClient::Socket(_) => false,
        }
    }

    pub fn into_shared(self) -> SharedProblemClient {
        Arc::new(Mutex::new(self))
    }
}

impl std::fmt::Debug for ProblemClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemClient::Bus(bus) => f
                .debug_struct("Bus")
                .field("connected", &bus.is_connected())
                .finish(),
            ProblemClient::Socket(socket) => f.debug_tuple("Socket").field(socket).finish(),
        }
    }
}

/// Picks a transport given an optional bus binding
///
/// `binding` is `None` when bus support is unavailable altogether. In
/// [`TransportMode::Auto`] a bus client is returned only if it connected;
/// [`TransportMode::Bus`] returns it regardless.
pub async fn select_client(
    binding: Option<Arc<dyn IBusBinding>>,
    socket: SocketTransport,
    mode: TransportMode,
) -> ProblemClient {
    if mode == TransportMode::Socket {
        debug!("Socket transport forced by configuration");
        return ProblemClient::Socket(socket);
    }

    match binding {
        Some(binding) => {
            let bus = BusTransport::new(binding).await;
            if bus.is_connected() {
                info!("Using D-Bus transport for problems");
                return ProblemClient::Bus(bus);
            }
            if mode == TransportMode::Bus {
                warn!("Problems service not reachable on the bus, keeping D-Bus transport");
                return ProblemClient::Bus(bus);
            }
        }
        None => debug!("D-Bus not found"),
    }

    info!(
        path = %socket.path().display(),
        "Falling back to creation-only socket transport"
    );
    ProblemClient::Socket(socket)
}

/// Builds the client for the system problem daemon
pub async fn get_client(config: &TransportConfig) -> ProblemClient {
    select_client(
        system_bus_binding(),
        SocketTransport::from_config(config),
        config.mode,
    )
    .await
}

#[cfg(feature = "dbus")]
fn system_bus_binding() -> Option<Arc<dyn IBusBinding>> {
    Some(Arc::new(crate::dbus::ZbusBinding::system()))
}

#[cfg(not(feature = "dbus"))]
fn system_bus_binding() -> Option<Arc<dyn IBusBinding>> {
    None
}

#[async_trait::async_trait]
impl IProblemService for ProblemClient {
    async fn get_item(
        &mut self,
        dump_dir: &str,
        name: &str,
    ) -> Result<Option<String>, ProblemError> {
        match self {
            ProblemClient::Bus(t) => t.get_item(dump_dir, name).await,
            ProblemClient::Socket(t) => t.get_item(dump_dir, name).await,
        }
    }

    async fn set_item(
        &mut self,
        dump_dir: &str,
        name: &str,
        value: &str,
    ) -> Result<(), ProblemError> {
        match self {
            ProblemClient::Bus(t) => t.set_item(dump_dir, name, value).await,
            ProblemClient::Socket(t) => t.set_item(dump_dir, name, value).await,
        }
    }

    async fn delete_item(&mut self, dump_dir: &str, name: &str) -> Result<(), ProblemError> {
        match self {
            ProblemClient::Bus(t) => t.delete_item(dump_dir, name).await,
            ProblemClient::Socket(t) => t.delete_item(dump_dir, name).await,
        }
    }

    async fn create(&mut self, data: &ProblemData) -> Result<Option<String>, ProblemError> {
        match self {
            ProblemClient::Bus(t) => t.create(data).await,
            ProblemClient::Socket(t) => t.create(data).await,
        }
    }

    async fn delete(&mut self, dump_dir: &str) -> Result<(), ProblemError> {
        match self {
            ProblemClient::Bus(t) => t.delete(dump_dir).await,
            ProblemClient::Socket(t) => t.delete(dump_dir).await,
        }
    }

    async fn list(&mut self) -> Result<Vec<String>, ProblemError> {
        match self {
            ProblemClient::Bus(t) => t.list().await,
            ProblemClient::Socket(t) => t.list().await,
        }
    }

    async fn list_all(&mut self) -> Result<Vec<String>, ProblemError> {
        match self {
            ProblemClient::Bus(t) => t.list_all().await,
            ProblemClient::Socket(t) => t.list_all().await,
        }
    }
}
