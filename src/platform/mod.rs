//! Native windowing systems a message window can be hosted on.
//!
//! [`SurfaceSystem`] is everything the dispatcher needs from the platform:
//! class registration, surface creation and destruction, a per-handle user
//! storage slot, the name-to-code registry and default event processing.
//!
//! - [`windows`]: Win32 message windows (Windows only)
//! - [`headless`]: in-process simulation with the same protocol, used by tests
//!   and on hosts without a native backend

use std::ffi::c_void;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::events::EventCode;
use crate::model::constants::EVENT_NCCREATE;

pub mod headless;

#[cfg(target_os = "windows")]
pub mod windows;

pub use headless::HeadlessSurfaces;

#[cfg(target_os = "windows")]
pub use self::windows::Win32Surfaces;

/// Opaque, pointer-sized native surface handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SurfaceHandle(isize);

impl SurfaceHandle {
    /// Never identifies a live surface.
    pub const NULL: SurfaceHandle = SurfaceHandle(0);

    pub fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    pub fn into_raw(self) -> isize {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface {:#x}", self.0)
    }
}

/// Class descriptor every surface is created from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceClass {
    name: String,
    icon_resource: Option<u16>,
}

impl SurfaceClass {
    pub fn new(name: impl Into<String>, icon_resource: Option<u16>) -> Self {
        Self {
            name: name.into(),
            icon_resource,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numeric icon resource in the current module, if any.
    pub fn icon_resource(&self) -> Option<u16> {
        self.icon_resource
    }
}

/// A per-handle slot read or write reported a native error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotError {
    pub code: u32,
}

/// Slot value, or the native error reported while accessing it.
pub type SlotResult = std::result::Result<isize, SlotError>;

/// The windowing collaborator.
///
/// Implementations route every event delivered to a surface they created
/// through [`crate::window::trampoline::dispatch`].
pub trait SurfaceSystem {
    /// Code of the event sent while a surface is under construction.
    fn creation_event(&self) -> EventCode {
        EVENT_NCCREATE
    }

    /// Register `class` with the trampoline as its event procedure.
    /// Registering a class name that already exists succeeds.
    fn register_class(&self, class: &SurfaceClass) -> Result<()>;

    fn unregister_class(&self, class: &SurfaceClass) -> Result<()>;

    /// Create a hidden, zero-size, parentless surface.
    ///
    /// `context` is handed back in the payload of the creation event.
    fn create_surface(
        &self,
        class: &SurfaceClass,
        name: &str,
        context: *const c_void,
    ) -> Result<SurfaceHandle>;

    fn destroy_surface(&self, handle: SurfaceHandle) -> Result<()>;

    /// Map `name` to a code in the process-wide namespace.
    /// The same name always yields the same code.
    fn resolve_event_name(&self, name: &str) -> Result<EventCode>;

    /// Extract the creation context from the creation event's `lparam`.
    ///
    /// # Safety
    /// `lparam` must be the payload of a creation event produced by this system.
    unsafe fn creation_context(&self, lparam: isize) -> *const c_void;

    /// Store `value` in the handle's user slot, returning the previous value.
    fn write_slot(&self, handle: SurfaceHandle, value: isize) -> SlotResult;

    /// Read the handle's user slot. `Ok(0)` means nothing was stored.
    fn read_slot(&self, handle: SurfaceHandle) -> SlotResult;

    /// Native fallback processing for events nobody handled.
    fn default_procedure(
        &self,
        handle: SurfaceHandle,
        code: EventCode,
        wparam: usize,
        lparam: isize,
    ) -> isize;
}

/// The surface system native to this host.
#[cfg(target_os = "windows")]
pub fn native() -> Rc<dyn SurfaceSystem> {
    Rc::new(Win32Surfaces)
}

/// The surface system native to this host.
#[cfg(not(target_os = "windows"))]
pub fn native() -> Rc<dyn SurfaceSystem> {
    headless::current()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handle() {
        assert!(SurfaceHandle::NULL.is_null());
        assert!(SurfaceHandle::default().is_null());
        assert!(!SurfaceHandle::from_raw(1).is_null());
    }

    #[test]
    fn handle_display_is_hex() {
        assert_eq!(SurfaceHandle::from_raw(255).to_string(), "surface 0xff");
    }

    #[test]
    fn class_accessors() {
        let class = SurfaceClass::new("Tray", Some(1));
        assert_eq!(class.name(), "Tray");
        assert_eq!(class.icon_resource(), Some(1));
    }
}
