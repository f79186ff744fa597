use std::{io, result::Result as StdResult};

use thiserror::Error;

use crate::{EntityId, WindowId};

/// Result type for grove operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("platform: {0}")]
    /// The platform rejected a request.
    Platform(String),
    #[error("connection: {0}")]
    /// Connecting to the windowing system failed.
    Connection(String),
    #[error("config: {0}")]
    /// Configuration could not be parsed.
    Config(String),
    #[error("io: {0}")]
    /// Reading or writing a file failed.
    Io(String),
    #[error("geometry: {0}")]
    /// Geometry failure.
    Geometry(String),
    #[error("window not found: {0:?}")]
    /// The window id is stale or was never issued.
    WindowNotFound(WindowId),
    #[error("entity not found: {0:?}")]
    /// The entity id is stale or was never issued.
    EntityNotFound(EntityId),
    #[error("widget is busy: {0:?}")]
    /// The entity's widget is currently running a callback further up the
    /// stack.
    WidgetBusy(EntityId),
    #[error("type mismatch: expected {0}")]
    /// A typed widget access named the wrong type.
    TypeMismatch(&'static str),
    #[error("backend closed")]
    /// The event loop is no longer running.
    Closed,
    #[error("internal: {0}")]
    /// Internal error.
    Internal(String),
}

impl From<geom::Error> for Error {
    fn from(e: geom::Error) -> Self {
        Self::Geometry(e.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
