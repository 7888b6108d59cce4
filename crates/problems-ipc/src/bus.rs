//! Bus transport for the problems interface
//!
//! Holds the object and interface handles obtained from an injected
//! [`IBusBinding`]. Connection failures never surface as errors here:
//! they leave the transport disconnected and the caller checks
//! [`BusTransport::is_connected`].

use std::collections::HashMap;
use std::sync::Arc;

use problems_core::domain::{ProblemData, ProblemError};
use problems_core::ports::bus::{
    BusReply, BusRequest, IBusBinding, IBusInterface, IBusObject, PROBLEMS_BUS_NAME,
    PROBLEMS_INTERFACE, PROBLEMS_OBJECT_PATH,
};
use problems_core::ports::IProblemService;
use tracing::{debug, info};

/// Client of `org.freedesktop.problems` on a message bus
pub struct BusTransport {
    binding: Arc<dyn IBusBinding>,
    object: Option<Box<dyn IBusObject>>,
    interface: Option<Box<dyn IBusInterface>>,
    connected: bool,
}

impl BusTransport {
    /// Creates the transport and attempts the first connection
    pub async fn new(binding: Arc<dyn IBusBinding>) -> Self {
        let mut transport = Self {
            binding,
            object: None,
            interface: None,
            connected: false,
        };
        transport.connect().await;
        transport
    }

    /// Whether both the object and the interface handle were acquired
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// (Re)acquires the object and interface handles
    ///
    /// A previously held object is closed first. On any failure the
    /// transport stays disconnected and the fault is only logged.
    pub async fn connect(&mut self) {
        self.connected = false;
        self.interface = None;
        if let Some(mut object) = self.object.take() {
            object.close().await;
        }

        let object = match self
            .binding
            .get_object(PROBLEMS_BUS_NAME, PROBLEMS_OBJECT_PATH)
            .await
        {
            Ok(object) => self.object.insert(object),
            Err(fault) => {
                debug!(%fault, "Unable to get D-Bus proxy");
                return;
            }
        };

        match object.interface(PROBLEMS_INTERFACE).await {
            Ok(interface) => self.interface = Some(interface),
            Err(fault) => {
                debug!(%fault, "Unable to get D-Bus interface");
                return;
            }
        }

        self.connected = true;
        debug!(name = PROBLEMS_BUS_NAME, "Connected to problems service");
    }

    /// Invokes `request`, reconnecting and retrying once if the daemon's
    /// name has disappeared from the bus
    ///
    /// A transport left disconnected by an earlier failed reconnect gets
    /// the same single reconnect before the call, so it recovers once the
    /// daemon is back.
    async fn dispatch(&mut self, request: BusRequest) -> Result<BusReply, ProblemError> {
        if self.interface.is_none() {
            debug!(
                method = request.method(),
                "Not connected to problems service, reconnecting before call"
            );
            self.connect().await;
            return self.invoke(&request).await;
        }

        match self.invoke(&request).await {
            Err(err) if err.is_service_unknown() => {
                info!(
                    method = request.method(),
                    "Problems service unknown, reconnecting and retrying once"
                );
                self.connect().await;
                self.invoke(&request).await
            }
            result => result,
        }
    }

    async fn invoke(&self, request: &BusRequest) -> Result<BusReply, ProblemError> {
        let interface = self.interface.as_ref().ok_or(ProblemError::NotConnected)?;
        interface.call(request).await.map_err(ProblemError::from)
    }
}

fn unexpected(method: &'static str, reply: &BusReply) -> ProblemError {
    ProblemError::UnexpectedReply {
        method,
        reply: reply.kind().to_string(),
    }
}

fn expect_unit(method: &'static str, reply: BusReply) -> Result<(), ProblemError> {
    match reply {
        BusReply::Unit => Ok(()),
        other => Err(unexpected(method, &other)),
    }
}

fn expect_handles(method: &'static str, reply: BusReply) -> Result<Vec<String>, ProblemError> {
    match reply {
        BusReply::Handles(handles) => Ok(handles),
        other => Err(unexpected(method, &other)),
    }
}

#[async_trait::async_trait]
impl IProblemService for BusTransport {
    async fn get_item(
        &mut self,
        dump_dir: &str,
        name: &str,
    ) -> Result<Option<String>, ProblemError> {
        let reply = self
            .dispatch(BusRequest::GetInfo {
                dump_dir: dump_dir.to_string(),
                names: vec![name.to_string()],
            })
            .await?;

        match reply {
            BusReply::Info(mut info) => Ok(info.remove(name)),
            other => Err(unexpected("GetInfo", &other)),
        }
    }

    async fn set_item(
        &mut self,
        dump_dir: &str,
        name: &str,
        value: &str,
    ) -> Result<(), ProblemError> {
        let reply = self
            .dispatch(BusRequest::SetElement {
                dump_dir: dump_dir.to_string(),
                name: name.to_string(),
                value: value.to_string(),
            })
            .await?;
        expect_unit("SetElement", reply)
    }

    async fn delete_item(&mut self, dump_dir: &str, name: &str) -> Result<(), ProblemError> {
        let reply = self
            .dispatch(BusRequest::DeleteElement {
                dump_dir: dump_dir.to_string(),
                name: name.to_string(),
            })
            .await?;
        expect_unit("DeleteElement", reply)
    }

    async fn create(&mut self, data: &ProblemData) -> Result<Option<String>, ProblemError> {
        let fields: HashMap<String, String> = data
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        match self.dispatch(BusRequest::NewProblem { fields }).await? {
            BusReply::Handle(dump_dir) => {
                debug!(%dump_dir, "Created problem");
                Ok(Some(dump_dir))
            }
            other => Err(unexpected("NewProblem", &other)),
        }
    }

    async fn delete(&mut self, dump_dir: &str) -> Result<(), ProblemError> {
        let reply = self
            .dispatch(BusRequest::DeleteProblem {
                dump_dir: dump_dir.to_string(),
            })
            .await?;
        expect_unit("DeleteProblem", reply)
    }

    async fn list(&mut self) -> Result<Vec<String>, ProblemError> {
        let reply = self.dispatch(BusRequest::GetProblems).await?;
        expect_handles("GetProblems", reply)
    }

    async fn list_all(&mut self) -> Result<Vec<String>, ProblemError> {
        let reply = self.dispatch(BusRequest::GetAllProblems).await?;
        expect_handles("GetAllProblems", reply)
    }
}

// ============================================================================
// Tests
// ============================================================================
