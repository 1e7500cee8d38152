//! The single event procedure shared by every message surface.
//!
//! Holds no state of its own: it resolves the owning window from the handle,
//! fans the event out to that window's callbacks and aggregates, or falls
//! back to the system's default processing.

use crate::error::fatal;
use crate::events::EventCode;
use crate::platform::{SurfaceHandle, SurfaceSystem};

use super::{association, MessageWindow};

/// Route one event to the callbacks of the window owning `handle`.
///
/// Every registered callback runs; the result is the largest value returned,
/// never less than 0. With no owning window, or no callbacks for `code`, the
/// result of default processing is returned instead.
///
/// The creation event associates the handle with the window passed as
/// creation context before anything else is dispatched for it. Association
/// and slot-read failures abort the process.
///
/// # Safety
/// For the creation event, `lparam` must be the creation payload produced by
/// `system`, and its context must be null or point to a live, pinned
/// [`MessageWindow`]. Any window associated with `handle` must still be alive.
pub unsafe fn dispatch(
    system: &dyn SurfaceSystem,
    handle: SurfaceHandle,
    code: EventCode,
    wparam: usize,
    lparam: isize,
) -> isize {
    let instance = if code == system.creation_event() {
        let context = system.creation_context(lparam) as *const MessageWindow;
        if !context.is_null() {
            if let Err(err) = association::associate(system, handle, context) {
                fatal(&err);
            }
        }
        std::ptr::NonNull::new(context as *mut MessageWindow)
    } else {
        match association::resolve(system, handle) {
            Ok(instance) => instance,
            Err(err) => fatal(&err),
        }
    };

    let Some(instance) = instance else {
        return system.default_procedure(handle, code, wparam, lparam);
    };
    let window = instance.as_ref();

    let callbacks = window.callbacks_for(code);
    if callbacks.is_empty() {
        return system.default_procedure(handle, code, wparam, lparam);
    }

    callbacks
        .iter()
        .fold(0, |result, callback| callback(window, wparam, lparam).max(result))
}
