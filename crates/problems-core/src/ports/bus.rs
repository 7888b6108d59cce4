//! Message bus port (driven/secondary port)
//!
//! Models the three steps a bus client goes through: obtain an object
//! for a well-known name and path, narrow it to an interface, then call
//! methods on that interface. The zbus adapter lives in `problems-ipc`.
//!
//! Requests and replies are closed enums over the seven methods of the
//! `org.freedesktop.problems` interface rather than generic variants, so
//! adapters know the exact signature of every call.

use std::collections::HashMap;
use std::fmt;

/// Well-known bus name of the problem daemon
pub const PROBLEMS_BUS_NAME: &str = "org.freedesktop.problems";

/// Object path the daemon serves its interface at
pub const PROBLEMS_OBJECT_PATH: &str = "/org/freedesktop/problems";

/// Interface exposing the problem operations
pub const PROBLEMS_INTERFACE: &str = "org.freedesktop.problems";

/// Fault raised by the bus when the destination name has no owner
pub const ERROR_SERVICE_UNKNOWN: &str = "org.freedesktop.DBus.Error.ServiceUnknown";

/// Fault raised by the daemon when polkit denies the caller
pub const ERROR_AUTH_FAILURE: &str = "org.freedesktop.problems.AuthFailure";

/// Fault raised by the daemon for an unknown dump directory
pub const ERROR_INVALID_PROBLEM_DIR: &str = "org.freedesktop.problems.InvalidProblemDir";

// ============================================================================
// Faults
// ============================================================================

/// A bus-level error: the error name (if the bus supplied one) and its message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusFault {
    pub name: Option<String>,
    pub message: String,
}

impl BusFault {
    /// Fault carrying a D-Bus error name
    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: message.into(),
        }
    }

    /// Fault without an error name (transport or marshalling failure)
    pub fn unnamed(message: impl Into<String>) -> Self {
        Self {
            name: None,
            message: message.into(),
        }
    }

    pub fn is_service_unknown(&self) -> bool {
        self.name.as_deref() == Some(ERROR_SERVICE_UNKNOWN)
    }
}

impl fmt::Display for BusFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}: {}", name, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for BusFault {}

// ============================================================================
// Requests and replies
// ============================================================================

/// A call on the problems interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusRequest {
    /// `GetInfo(s dump_dir, as names) -> a{ss}`
    GetInfo { dump_dir: String, names: Vec<String> },
    /// `SetElement(s dump_dir, s name, s value)`
    SetElement {
        dump_dir: String,
        name: String,
        value: String,
    },
    /// `DeleteElement(s dump_dir, s name)`
    DeleteElement { dump_dir: String, name: String },
    /// `NewProblem(a{ss} fields) -> s`
    NewProblem { fields: HashMap<String, String> },
    /// `DeleteProblem(as dump_dirs)`
    DeleteProblem { dump_dir: String },
    /// `GetProblems() -> as`
    GetProblems,
    /// `GetAllProblems() -> as`
    GetAllProblems,
}

impl BusRequest {
    /// D-Bus member name of this call
    pub fn method(&self) -> &'static str {
        match self {
            BusRequest::GetInfo { .. } => "GetInfo",
            BusRequest::SetElement { .. } => "SetElement",
            BusRequest::DeleteElement { .. } => "DeleteElement",
            BusRequest::NewProblem { .. } => "NewProblem",
            BusRequest::DeleteProblem { .. } => "DeleteProblem",
            BusRequest::GetProblems => "GetProblems",
            BusRequest::GetAllProblems => "GetAllProblems",
        }
    }
}

/// The decoded body of a method return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusReply {
    /// Empty return
    Unit,
    /// Item name to value mapping (`GetInfo`)
    Info(HashMap<String, String>),
    /// A single dump directory handle (`NewProblem`)
    Handle(String),
    /// A list of dump directory handles (`GetProblems`, `GetAllProblems`)
    Handles(Vec<String>),
}

impl BusReply {
    /// Short shape description used in `UnexpectedReply` errors
    pub fn kind(&self) -> &'static str {
        match self {
            BusReply::Unit => "unit",
            BusReply::Info(_) => "info map",
            BusReply::Handle(_) => "handle",
            BusReply::Handles(_) => "handle list",
        }
    }
}

// ============================================================================
// Binding traits
// ============================================================================

/// Entry point to a message bus
#[async_trait::async_trait]
pub trait IBusBinding: Send + Sync {
    /// Obtains an object for `name` at `path`
    async fn get_object(&self, name: &str, path: &str) -> Result<Box<dyn IBusObject>, BusFault>;
}

/// A remote object on the bus
#[async_trait::async_trait]
pub trait IBusObject: Send + Sync {
    /// Narrows the object to one of its interfaces
    async fn interface(&self, name: &str) -> Result<Box<dyn IBusInterface>, BusFault>;

    /// Releases the object. Called at most once, before reacquiring.
    async fn close(&mut self);
}

/// An interface of a remote object, ready for method calls
#[async_trait::async_trait]
pub trait IBusInterface: Send + Sync {
    async fn call(&self, request: &BusRequest) -> Result<BusReply, BusFault>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dbus_constants() {
        assert_eq!(PROBLEMS_BUS_NAME, "org.freedesktop.problems");
        assert_eq!(PROBLEMS_OBJECT_PATH, "/org/freedesktop/problems");
        assert_eq!(PROBLEMS_INTERFACE, "org.freedesktop.problems");
    }

    #[test]
    fn test_fault_display() {
        let fault = BusFault::named(ERROR_AUTH_FAILURE, "denied");
        assert_eq!(
            fault.to_string(),
            "org.freedesktop.problems.AuthFailure: denied"
        );
        assert_eq!(BusFault::unnamed("connection reset").to_string(), "connection reset");
    }

    #[test]
    fn test_request_method_names() {
        let requests = [
            (
                BusRequest::GetInfo {
                    dump_dir: "/d".into(),
                    names: vec!["reason".into()],
                },
                "GetInfo",
            ),
            (
                BusRequest::SetElement {
                    dump_dir: "/d".into(),
                    name: "comment".into(),
                    value: "x".into(),
                },
                "SetElement",
            ),
            (
                BusRequest::DeleteElement {
                    dump_dir: "/d".into(),
                    name: "comment".into(),
                },
                "DeleteElement",
            ),
            (
                BusRequest::NewProblem {
                    fields: HashMap::new(),
                },
                "NewProblem",
            ),
            (
                BusRequest::DeleteProblem {
                    dump_dir: "/d".into(),
                },
                "DeleteProblem",
            ),
            (BusRequest::GetProblems, "GetProblems"),
            (BusRequest::GetAllProblems, "GetAllProblems"),
        ];

        for (request, expected) in requests {
            assert_eq!(request.method(), expected);
        }
    }
}
