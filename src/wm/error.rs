//! Error types for the window manager core

use thiserror::Error;
use x11rb::errors::{ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::protocol::xproto::Window;

/// Failure of a single display-server request
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Reply(#[from] ReplyError),

    #[error(transparent)]
    ReplyOrId(#[from] ReplyOrIdError),

    /// The server refused a request for this window
    #[error("{request} failed for window 0x{window:x}")]
    Request { request: &'static str, window: Window },
}

pub type DisplayResult<T> = Result<T, DisplayError>;

/// Why a window could not be adopted
#[derive(Debug, Error)]
pub enum AdoptError {
    /// Caller asked to adopt a window that already has a client
    #[error("window 0x{0:x} is already managed")]
    AlreadyManaged(Window),

    #[error("window 0x{window:x} disappeared before it could be adopted")]
    WindowGone {
        window: Window,
        #[source]
        source: DisplayError,
    },

    #[error("could not create a frame for window 0x{window:x}")]
    FrameCreation {
        window: Window,
        #[source]
        source: DisplayError,
    },

    #[error("display request failed while adopting window 0x{window:x}")]
    Request {
        window: Window,
        #[source]
        source: DisplayError,
    },
}

/// Registry invariant violations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("window 0x{0:x} already has a client")]
    Duplicate(Window),
}
