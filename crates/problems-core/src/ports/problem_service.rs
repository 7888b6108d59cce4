//! Problem service port (driving port)
//!
//! The capability set offered to callers regardless of which transport
//! was selected. Dump directory handles are opaque strings assigned by
//! the daemon.
//!
//! Methods take `&mut self`: the bus transport may reconnect in the middle
//! of a call. Share a client between tasks through an external mutex.

use crate::domain::{ProblemData, ProblemError};

#[async_trait::async_trait]
pub trait IProblemService: Send {
    /// Reads one item of a problem; `None` when the daemon has no such item
    async fn get_item(&mut self, dump_dir: &str, name: &str)
        -> Result<Option<String>, ProblemError>;

    /// Writes one item of a problem
    async fn set_item(&mut self, dump_dir: &str, name: &str, value: &str)
        -> Result<(), ProblemError>;

    /// Removes one item of a problem
    async fn delete_item(&mut self, dump_dir: &str, name: &str) -> Result<(), ProblemError>;

    /// Reports a new problem
    ///
    /// Over the bus this is the new dump directory handle. Over the
    /// socket it is the raw daemon response, or `None` when the daemon
    /// did not answer in time.
    async fn create(&mut self, data: &ProblemData) -> Result<Option<String>, ProblemError>;

    /// Deletes a whole problem
    async fn delete(&mut self, dump_dir: &str) -> Result<(), ProblemError>;

    /// Handles of the problems visible to the caller, in daemon order
    async fn list(&mut self) -> Result<Vec<String>, ProblemError>;

    /// Handles of all problems on the system, in daemon order
    async fn list_all(&mut self) -> Result<Vec<String>, ProblemError>;
}
