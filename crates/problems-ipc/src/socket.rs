//! Socket transport
//!
//! The daemon accepts new problems on a Unix stream socket using a tiny
//! HTTP-like request: a `PUT` preamble followed by NUL-terminated
//! `KEY=value` records. Nothing else is available on this channel, so
//! every other operation fails with `NotImplemented`.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use problems_core::config::TransportConfig;
use problems_core::domain::{ProblemData, ProblemError};
use problems_core::ports::IProblemService;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::{debug, error};

/// Default path of the daemon socket
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/abrt/abrt.socket";

/// Default send/receive timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// First bytes of every request
pub const REQUEST_PREAMBLE: &[u8] = b"PUT / HTTP/1.1\r\n\r\n";

const READ_CHUNK: usize = 256;

/// Encodes `data` as a creation request
///
/// Keys are upper-cased; every record is terminated by a NUL byte.
pub fn encode_request(data: &ProblemData) -> Vec<u8> {
    let mut request = REQUEST_PREAMBLE.to_vec();
    for (name, value) in data.iter() {
        request.extend_from_slice(name.to_uppercase().as_bytes());
        request.push(b'=');
        request.extend_from_slice(value.as_bytes());
        request.push(0);
    }
    request
}

/// Creation-only fallback client. Holds no connection between calls.
#[derive(Debug, Clone)]
pub struct SocketTransport {
    path: PathBuf,
    timeout: Duration,
}

impl Default for SocketTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_PATH)
    }
}

impl SocketTransport {
    /// Transport for the socket at `path` with the default timeout
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(&config.socket_path).with_timeout(Duration::from_secs(config.socket_timeout_secs))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `request`, half-closes, and collects the reply until EOF
    async fn exchange(&self, request: &[u8]) -> io::Result<Vec<u8>> {
        let mut stream = bounded(self.timeout, UnixStream::connect(&self.path)).await?;
        bounded(self.timeout, stream.write_all(request)).await?;
        bounded(self.timeout, stream.shutdown()).await?;

        let mut response = Vec::new();
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let n = bounded(self.timeout, stream.read(&mut buf)).await?;
            if n == 0 {
                break;
            }
            response.extend_from_slice(&buf[..n]);
        }
        Ok(response)
    }
}

/// Applies the per-operation timeout, reporting expiry as `TimedOut`
async fn bounded<T>(limit: Duration, op: impl Future<Output = io::Result<T>>) -> io::Result<T> {
    match tokio::time::timeout(limit, op).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("no answer within {limit:?}"),
        )),
    }
}

#[async_trait::async_trait]
impl IProblemService for SocketTransport {
    async fn get_item(
        &mut self,
        _dump_dir: &str,
        _name: &str,
    ) -> Result<Option<String>, ProblemError> {
        Err(ProblemError::NotImplemented("get_item"))
    }

    async fn set_item(
        &mut self,
        _dump_dir: &str,
        _name: &str,
        _value: &str,
    ) -> Result<(), ProblemError> {
        Err(ProblemError::NotImplemented("set_item"))
    }

    async fn delete_item(&mut self, _dump_dir: &str, _name: &str) -> Result<(), ProblemError> {
        Err(ProblemError::NotImplemented("delete_item"))
    }

    /// Returns the daemon's raw response, or `None` on timeout.
    ///
    /// A daemon that closes without answering yields `Some("")`.
    async fn create(&mut self, data: &ProblemData) -> Result<Option<String>, ProblemError> {
        let request = encode_request(data);
        debug!(
            path = %self.path.display(),
            fields = data.len(),
            "Sending problem over socket"
        );

        match self.exchange(&request).await {
            Ok(response) => Ok(Some(String::from_utf8_lossy(&response).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                error!(error = %e, "communication with daemon failed");
                Ok(None)
            }
            Err(e) => Err(ProblemError::Io(e)),
        }
    }

    async fn delete(&mut self, _dump_dir: &str) -> Result<(), ProblemError> {
        Err(ProblemError::NotImplemented("delete"))
    }

    async fn list(&mut self) -> Result<Vec<String>, ProblemError> {
        Err(ProblemError::NotImplemented("list"))
    }

    async fn list_all(&mut self) -> Result<Vec<String>, ProblemError> {
        Err(ProblemError::NotImplemented("list_all"))
    }
}
