//! Back-reference from a native surface handle to the window that owns it.
//!
//! The pointer lives in the handle's user slot. It is a lookup, not
//! ownership: the window sets it once while its surface is being created and
//! clears it before the surface is destroyed.

use std::ptr::NonNull;

use crate::error::{Error, Result};
use crate::platform::{SurfaceHandle, SurfaceSystem};

use super::MessageWindow;

/// Record `instance` as the owner of `handle`.
///
/// Fails if the slot write reports an error, or if the handle already belongs
/// to a different window (the previous owner is left in place).
pub fn associate(
    system: &dyn SurfaceSystem,
    handle: SurfaceHandle,
    instance: *const MessageWindow,
) -> Result<()> {
    let value = instance as isize;
    let previous = system
        .write_slot(handle, value)
        .map_err(|e| Error::Association { handle, code: e.code })?;

    if previous != 0 && previous != value {
        system
            .write_slot(handle, previous)
            .map_err(|e| Error::Association { handle, code: e.code })?;
        return Err(Error::AlreadyAssociated { handle });
    }

    log::trace!("associated {} with window at {:#x}", handle, value);
    Ok(())
}

/// Look up the window that owns `handle`.
///
/// `Ok(None)` covers events delivered before association and handles that
/// were never associated. A slot read that reports an error is an `Err`.
pub fn resolve(
    system: &dyn SurfaceSystem,
    handle: SurfaceHandle,
) -> Result<Option<NonNull<MessageWindow>>> {
    let value = system
        .read_slot(handle)
        .map_err(|e| Error::Resolution { handle, code: e.code })?;
    Ok(NonNull::new(value as *mut MessageWindow))
}

/// Clear the back-reference so later events fall back to default processing.
pub fn dissociate(system: &dyn SurfaceSystem, handle: SurfaceHandle) -> Result<()> {
    system
        .write_slot(handle, 0)
        .map(|_| ())
        .map_err(|e| Error::Association { handle, code: e.code })
}
