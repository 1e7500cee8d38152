//! Hidden message window with multiplexed callbacks.
//!
//! The native system allows exactly one event procedure per surface. A
//! [`MessageWindow`] owns one surface and lets any number of independent
//! subscribers register for the codes they care about:
//!
//! ```ignore
//! use surfacemux::MessageWindow;
//!
//! let window = MessageWindow::new("TrayHost", "Tray host", None)?;
//! let token = window.register_named_callback("TaskbarCreated", |_, _, _| {
//!     // Re-add the tray icon...
//!     0
//! })?;
//!
//! // Later
//! window.unregister_callback(token);
//! ```
//!
//! - [`association`]: handle to window back-reference
//! - [`trampoline`]: the shared event procedure

use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomPinned;
use std::pin::Pin;
use std::rc::Rc;

use crate::config::WindowConfig;
use crate::error::Result;
use crate::events::{CallbackRegistry, CallbackToken, EventCode};
use crate::platform::{self, SurfaceClass, SurfaceHandle, SurfaceSystem};

pub mod association;
pub mod trampoline;

/// Callback invoked with the owning window and the event's two parameters.
/// Non-zero results conventionally mean "handled".
pub type Callback = Rc<dyn Fn(&MessageWindow, usize, isize) -> isize>;

/// A hidden surface whose events are routed to registered callbacks.
///
/// The window's address is stored in its surface's user slot, so it is
/// always pinned. It is neither `Send` nor `Sync`: events, registration and
/// teardown all happen on the thread that created it.
pub struct MessageWindow {
    system: Rc<dyn SurfaceSystem>,
    class: SurfaceClass,
    handle: Cell<SurfaceHandle>,
    callbacks: RefCell<CallbackRegistry<Callback>>,
    _pin: PhantomPinned,
}

impl MessageWindow {
    /// Create a window on the host's native surface system.
    ///
    /// Off Windows this is the calling thread's
    /// [`crate::platform::headless::current`] system, which delivers events.
    pub fn new(
        class_name: &str,
        surface_name: &str,
        icon_resource: Option<u16>,
    ) -> Result<Pin<Box<Self>>> {
        let config = WindowConfig {
            class_name: class_name.to_string(),
            surface_name: surface_name.to_string(),
            icon_resource,
            ..WindowConfig::default()
        };
        Self::with_system(platform::native(), &config)
    }

    /// Create a window on `system`.
    ///
    /// Registers the class, then creates the surface with this window as the
    /// creation context so the trampoline can associate the two before any
    /// other event arrives.
    pub fn with_system(
        system: Rc<dyn SurfaceSystem>,
        config: &WindowConfig,
    ) -> Result<Pin<Box<Self>>> {
        let class = SurfaceClass::new(&config.class_name, config.icon_resource);
        system.register_class(&class)?;

        let window = Box::pin(Self {
            system,
            class,
            handle: Cell::new(SurfaceHandle::NULL),
            callbacks: RefCell::new(CallbackRegistry::with_policies(
                config.secret_policy,
                config.removal_policy,
            )),
            _pin: PhantomPinned,
        });

        let context = &*window as *const Self as *const c_void;
        let handle = window
            .system
            .create_surface(&window.class, &config.surface_name, context)?;
        window.handle.set(handle);

        log::debug!(
            "message window {:?} created as {}",
            config.surface_name,
            handle
        );
        Ok(window)
    }

    /// Subscribe `callback` to `code`.
    ///
    /// The window is detached from its surface before the surface is
    /// destroyed, so `EVENT_DESTROY` and `EVENT_NCDESTROY` never reach callbacks.
    pub fn register_callback<F>(&self, code: EventCode, callback: F) -> CallbackToken
    where
        F: Fn(&MessageWindow, usize, isize) -> isize + 'static,
    {
        let callback: Callback = Rc::new(callback);
        let token = self.callbacks.borrow_mut().register(code, callback);
        log::trace!("registered callback {}", token);
        token
    }

    /// Subscribe `callback` to the code registered for `name`.
    pub fn register_named_callback<F>(&self, name: &str, callback: F) -> Result<CallbackToken>
    where
        F: Fn(&MessageWindow, usize, isize) -> isize + 'static,
    {
        let code = self.system.resolve_event_name(name)?;
        log::debug!("event {:?} resolved to {:#06x}", name, code);
        Ok(self.register_callback(code, callback))
    }

    /// Remove the callback `token` refers to. Returns false if it is gone.
    pub fn unregister_callback(&self, token: CallbackToken) -> bool {
        let removed = self.callbacks.borrow_mut().unregister(token);
        if !removed {
            log::trace!("no callback for token {}", token);
        }
        removed
    }

    /// Number of callbacks subscribed to `code`.
    pub fn callback_count(&self, code: EventCode) -> usize {
        self.callbacks.borrow().len_for(code)
    }

    pub fn handle(&self) -> SurfaceHandle {
        self.handle.get()
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    // Snapshot, so callbacks can register or unregister while being invoked.
    fn callbacks_for(&self, code: EventCode) -> Vec<Callback> {
        self.callbacks.borrow().lookup(code).cloned().collect()
    }
}

impl fmt::Debug for MessageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageWindow")
            .field("class", &self.class)
            .field("handle", &self.handle.get())
            .field("callbacks", &self.callbacks.borrow().len())
            .finish()
    }
}

impl Drop for MessageWindow {
    fn drop(&mut self) {
        let handle = self.handle.get();
        if !handle.is_null() {
            // Events sent during destruction must not reach a window being dropped.
            if let Err(err) = association::dissociate(&*self.system, handle) {
                log::warn!("{}", err);
            }
            if let Err(err) = self.system.destroy_surface(handle) {
                log::warn!("{}", err);
            }
        }

        if let Err(err) = self.system.unregister_class(&self.class) {
            log::debug!("{}", err);
        }
        self.callbacks.get_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessSurfaces;

    fn window_on(system: &Rc<HeadlessSurfaces>) -> Pin<Box<MessageWindow>> {
        MessageWindow::with_system(system.clone(), &WindowConfig::default()).unwrap()
    }

    #[test]
    fn test_window_is_associated_after_construction() {
        let system = Rc::new(HeadlessSurfaces::new());
        let window = window_on(&system);

        let owner = association::resolve(&*system, window.handle()).unwrap().unwrap();
        assert!(std::ptr::eq(owner.as_ptr(), &*window));
    }

    #[test]
    fn test_callback_receives_owning_window_and_params() {
        let system = Rc::new(HeadlessSurfaces::new());
        let window = window_on(&system);
        let expected = window.handle();

        window.register_callback(0x500, move |w, wparam, lparam| {
            assert_eq!(w.handle(), expected);
            (wparam as isize) + lparam
        });
        assert_eq!(system.send(window.handle(), 0x500, 2, 40), 42);
    }

    #[test]
    fn test_callback_can_unregister_itself() {
        let system = Rc::new(HeadlessSurfaces::new());
        let window = window_on(&system);

        let slot: Rc<Cell<Option<CallbackToken>>> = Rc::new(Cell::new(None));
        let own = slot.clone();
        let token = window.register_callback(0x501, move |w, _, _| {
            if let Some(token) = own.get() {
                w.unregister_callback(token);
            }
            1
        });
        slot.set(Some(token));

        assert_eq!(system.send(window.handle(), 0x501, 0, 0), 1);
        assert_eq!(window.callback_count(0x501), 0);
    }

    #[test]
    fn test_callback_registered_during_dispatch_runs_next_time() {
        let system = Rc::new(HeadlessSurfaces::new());
        let window = window_on(&system);

        window.register_callback(0x502, |w, _, _| {
            w.register_callback(0x502, |_, _, _| 9);
            1
        });

        assert_eq!(system.send(window.handle(), 0x502, 0, 0), 1);
        assert_eq!(window.callback_count(0x502), 2);
    }

    #[test]
    fn test_drop_destroys_surface_and_class() {
        let system = Rc::new(HeadlessSurfaces::new());
        let window = window_on(&system);
        let handle = window.handle();
        assert!(system.is_alive(handle));

        drop(window);
        assert!(!system.is_alive(handle));
        assert!(!system.has_class(&WindowConfig::default().class_name));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_new_window_receives_events_from_current_system() {
        let window = MessageWindow::new("NativeHostClass", "native host", None).unwrap();
        window.register_callback(0x503, |_, wparam, _| wparam as isize);

        let system = platform::headless::current();
        assert!(system.is_alive(window.handle()));
        assert_eq!(system.send(window.handle(), 0x503, 6, 0), 6);

        let handle = window.handle();
        drop(window);
        assert!(!system.is_alive(handle));
        assert!(!system.has_class("NativeHostClass"));
    }

    #[test]
    fn test_debug_output_names_class() {
        let system = Rc::new(HeadlessSurfaces::new());
        let window = window_on(&system);
        assert!(format!("{:?}", window).contains("SurfaceMuxMessageWindow"));
    }
}
