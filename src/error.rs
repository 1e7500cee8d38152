//! Error types for surface creation, association and configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::platform::SurfaceHandle;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the dispatcher and its surface systems.
///
/// Native failures carry the raw OS error code reported by the surface system.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to register surface class {class:?} (os error {code})")]
    ClassRegistration { class: String, code: u32 },

    #[error("failed to unregister surface class {class:?} (os error {code})")]
    ClassUnregistration { class: String, code: u32 },

    #[error("failed to create message surface {name:?} (os error {code})")]
    SurfaceCreation { name: String, code: u32 },

    #[error("failed to destroy message surface {handle} (os error {code})")]
    SurfaceDestruction { handle: SurfaceHandle, code: u32 },

    #[error("failed to set window pointer for {handle} (os error {code})")]
    Association { handle: SurfaceHandle, code: u32 },

    #[error("surface {handle} is already associated with another instance")]
    AlreadyAssociated { handle: SurfaceHandle },

    #[error("failed to get window pointer for {handle} (os error {code})")]
    Resolution { handle: SurfaceHandle, code: u32 },

    #[error("failed to register event name {name:?} (os error {code})")]
    EventName { name: String, code: u32 },

    #[error("invalid config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Log an unrecoverable error and abort the process.
///
/// Used where no error channel back to the caller exists, such as inside the
/// window procedure. A broken association would misroute every later event
/// for the surface, so continuing is not an option.
pub fn fatal(err: &Error) -> ! {
    log::error!("fatal: {}", err);
    std::process::abort()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_include_os_code() {
        let err = Error::Association {
            handle: SurfaceHandle::from_raw(0x10),
            code: 1400,
        };
        assert_eq!(
            err.to_string(),
            "failed to set window pointer for surface 0x10 (os error 1400)"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
