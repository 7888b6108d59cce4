//! System bus binding backed by zbus
//!
//! Implements the bus port on top of a `zbus::Connection`. Acquiring the
//! object checks that the daemon's name is owned or activatable, so a
//! missing daemon is detected at connect time rather than on first call.

use std::collections::HashMap;

use problems_core::ports::bus::{
    BusFault, BusReply, BusRequest, IBusBinding, IBusInterface, IBusObject,
    ERROR_SERVICE_UNKNOWN,
};
use tracing::debug;
use zbus::names::BusName;
use zbus::DBusError;

/// Converts a zbus error into a bus fault, keeping the D-Bus error name
fn fault(err: zbus::Error) -> BusFault {
    match err {
        zbus::Error::MethodError(name, description, _) => {
            let name = name.as_str().to_string();
            let message = description.unwrap_or_else(|| name.clone());
            BusFault::named(name, message)
        }
        zbus::Error::FDO(fdo) => BusFault::named(
            fdo.name().as_str(),
            fdo.description().unwrap_or_default().to_string(),
        ),
        other => BusFault::unnamed(other.to_string()),
    }
}

fn fdo_fault(err: zbus::fdo::Error) -> BusFault {
    BusFault::named(
        err.name().as_str(),
        err.description().unwrap_or_default().to_string(),
    )
}

// ============================================================================
// Binding
// ============================================================================

/// Binding to the system bus
#[derive(Debug, Default, Clone, Copy)]
pub struct ZbusBinding;

impl ZbusBinding {
    pub fn system() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl IBusBinding for ZbusBinding {
    async fn get_object(&self, name: &str, path: &str) -> Result<Box<dyn IBusObject>, BusFault> {
        let connection = zbus::Connection::system().await.map_err(fault)?;
        let dbus_proxy = zbus::fdo::DBusProxy::new(&connection)
            .await
            .map_err(fault)?;

        let bus_name =
            BusName::try_from(name).map_err(|e| BusFault::unnamed(e.to_string()))?;
        let owned = dbus_proxy
            .name_has_owner(bus_name)
            .await
            .map_err(fdo_fault)?;
        if !owned {
            let activatable = dbus_proxy
                .list_activatable_names()
                .await
                .map_err(fdo_fault)?;
            if !activatable.iter().any(|n| n.as_str() == name) {
                return Err(BusFault::named(
                    ERROR_SERVICE_UNKNOWN,
                    format!("The name {name} was not provided by any .service files"),
                ));
            }
            debug!(name, "Service not running but activatable");
        }

        Ok(Box::new(ZbusObject {
            connection: Some(connection),
            destination: name.to_string(),
            path: path.to_string(),
        }))
    }
}

// ============================================================================
// Object and interface
// ============================================================================

struct ZbusObject {
    connection: Option<zbus::Connection>,
    destination: String,
    path: String,
}

#[async_trait::async_trait]
impl IBusObject for ZbusObject {
    async fn interface(&self, name: &str) -> Result<Box<dyn IBusInterface>, BusFault> {
        let connection = self
            .connection
            .as_ref()
            .ok_or_else(|| BusFault::unnamed("bus object already closed"))?;

        let proxy: zbus::Proxy<'static> = zbus::Proxy::new(
            connection,
            self.destination.clone(),
            self.path.clone(),
            name.to_string(),
        )
        .await
        .map_err(fault)?;

        Ok(Box::new(ZbusInterface { proxy }))
    }

    async fn close(&mut self) {
        // Dropping the last handle closes the socket to the bus daemon.
        self.connection.take();
    }
}

struct ZbusInterface {
    proxy: zbus::Proxy<'static>,
}

#[async_trait::async_trait]
impl IBusInterface for ZbusInterface {
    async fn call(&self, request: &BusRequest) -> Result<BusReply, BusFault> {
        let method = request.method();
        let reply = match request {
            BusRequest::GetInfo { dump_dir, names } => {
                let info: HashMap<String, String> = self
                    .proxy
                    .call(method, &(dump_dir.as_str(), names))
                    .await
                    .map_err(fault)?;
                BusReply::Info(info)
            }
            BusRequest::SetElement {
                dump_dir,
                name,
                value,
            } => {
                let () = self
                    .proxy
                    .call(method, &(dump_dir.as_str(), name.as_str(), value.as_str()))
                    .await
                    .map_err(fault)?;
                BusReply::Unit
            }
            BusRequest::DeleteElement { dump_dir, name } => {
                let () = self
                    .proxy
                    .call(method, &(dump_dir.as_str(), name.as_str()))
                    .await
                    .map_err(fault)?;
                BusReply::Unit
            }
            BusRequest::NewProblem { fields } => {
                let dump_dir: String = self
                    .proxy
                    .call(method, &(fields,))
                    .await
                    .map_err(fault)?;
                BusReply::Handle(dump_dir)
            }
            BusRequest::DeleteProblem { dump_dir } => {
                // The daemon takes a list of directories.
                let () = self
                    .proxy
                    .call(method, &(vec![dump_dir.as_str()],))
                    .await
                    .map_err(fault)?;
                BusReply::Unit
            }
            BusRequest::GetProblems | BusRequest::GetAllProblems => {
                let handles: Vec<String> = self.proxy.call(method, &()).await.map_err(fault)?;
                BusReply::Handles(handles)
            }
        };
        Ok(reply)
    }
}
