//! Event codes and defaults shared by every surface system.
//!
//! Values mirror the Win32 message numbering so that codes registered on a
//! headless host mean the same thing as on Windows.

use crate::events::EventCode;

// === Reserved Event Codes ===

/// Sent once while a surface is being created, before it is visible.
/// Carries the creation context in its `lparam` payload.
pub const EVENT_NCCREATE: EventCode = 0x0081;

/// Sent after the creation event, once the surface exists. A result of -1
/// aborts creation.
pub const EVENT_CREATE: EventCode = 0x0001;

/// Sent when a surface is being destroyed.
pub const EVENT_DESTROY: EventCode = 0x0002;

/// Sent after the surface's client area has been destroyed.
pub const EVENT_NCDESTROY: EventCode = 0x0082;

/// Broadcast when the display resolution changes.
pub const EVENT_DISPLAYCHANGE: EventCode = 0x007E;

/// First code available for private, application-defined events.
pub const EVENT_USER: EventCode = 0x0400;

/// First code handed out by the name-to-code registration service.
pub const FIRST_REGISTERED_EVENT: EventCode = 0xC000;

/// Last code handed out by the name-to-code registration service.
pub const LAST_REGISTERED_EVENT: EventCode = 0xFFFF;

// === Well-Known Event Names ===

/// Broadcast by the shell whenever the taskbar is (re)created.
pub const TASKBAR_CREATED: &str = "TaskbarCreated";

// === Surface Defaults ===

/// Default class name for message surfaces.
pub const DEFAULT_CLASS_NAME: &str = "SurfaceMuxMessageWindow";

/// Default title for message surfaces.
pub const DEFAULT_SURFACE_NAME: &str = "SurfaceMux";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "SURFACEMUX_CONFIG";

/// Config file name used when no override is set.
pub const CONFIG_FILE_NAME: &str = "surfacemux.json";

// === Token Layout ===

/// Bits of a token holding the event code.
pub const TOKEN_CODE_MASK: u64 = 0xFFFF_FFFF;

/// Shift of the secret inside a token.
pub const TOKEN_SECRET_SHIFT: u32 = 32;

/// Mask of the secret after shifting it down.
pub const TOKEN_SECRET_MASK: u64 = 0xFFFF;

/// Returns true if `code` lies in the registered-name range.
pub fn is_registered_event(code: EventCode) -> bool {
    (FIRST_REGISTERED_EVENT..=LAST_REGISTERED_EVENT).contains(&code)
}
