//! In-process surface system.
//!
//! Follows the Win32 message-window protocol closely enough that the
//! dispatcher cannot tell the difference: creation sends the creation event
//! with the context in its payload (a result of 0 aborts), destruction sends
//! the destroy events while the slot is still readable, and registered event
//! names share one process-wide table starting at `0xC000`.
//!
//! Events are delivered synchronously with [`HeadlessSurfaces::send`].
//! [`current`] is the per-thread system handed out by
//! [`crate::platform::native`] on hosts without a native backend.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::ffi::c_void;
use std::rc::Rc;
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::error::{Error, Result};
use crate::events::EventCode;
use crate::model::constants::*;
use crate::window::trampoline::dispatch;

use super::{SlotError, SlotResult, SurfaceClass, SurfaceHandle, SurfaceSystem};

// Win32 error codes reported for the equivalent failures.
pub const ERROR_NOT_ENOUGH_MEMORY: u32 = 8;
pub const ERROR_INVALID_PARAMETER: u32 = 87;
pub const ERROR_INVALID_WINDOW_HANDLE: u32 = 1400;
pub const ERROR_CANNOT_FIND_WND_CLASS: u32 = 1407;
pub const ERROR_CLASS_DOES_NOT_EXIST: u32 = 1411;
pub const ERROR_CLASS_HAS_WINDOWS: u32 = 1412;

/// Number of default-processed codes [`HeadlessSurfaces::default_log`] keeps.
pub const DEFAULT_LOG_CAPACITY: usize = 256;

/// Process-wide name-to-code table, shared by every headless system.
static EVENT_NAMES: OnceLock<Mutex<HashMap<String, EventCode>>> = OnceLock::new();

/// Payload of the creation event.
#[repr(C)]
pub struct CreationRecord {
    pub context: *const c_void,
}

type DefaultProcedure = Box<dyn Fn(EventCode, usize, isize) -> isize>;

struct Surface {
    class: String,
    name: String,
    slot: isize,
}

#[derive(Default)]
struct State {
    classes: HashSet<String>,
    surfaces: HashMap<SurfaceHandle, Surface>,
    next_handle: isize,
    default_log: VecDeque<EventCode>,
}

/// Headless surface system with failure injection.
pub struct HeadlessSurfaces {
    state: RefCell<State>,
    default_procedure: DefaultProcedure,
    fail_create: Cell<Option<u32>>,
    fail_destroy: Cell<Option<u32>>,
    fail_slot_write: Cell<Option<u32>>,
    fail_slot_read: Cell<Option<u32>>,
}

thread_local! {
    static CURRENT: Rc<HeadlessSurfaces> = Rc::new(HeadlessSurfaces::new());
}

/// The headless system shared by every window created on this thread
/// through [`crate::platform::native`].
pub fn current() -> Rc<HeadlessSurfaces> {
    CURRENT.with(Rc::clone)
}

impl HeadlessSurfaces {
    /// Default processing returns 1 for the creation event, 0 for
    /// `EVENT_CREATE`, and 0 for everything else.
    pub fn new() -> Self {
        Self::with_default_procedure(|_, _, _| 0)
    }

    /// Use `procedure` as default processing for every event except the two
    /// creation events.
    pub fn with_default_procedure<F>(procedure: F) -> Self
    where
        F: Fn(EventCode, usize, isize) -> isize + 'static,
    {
        Self {
            state: RefCell::new(State::default()),
            default_procedure: Box::new(procedure),
            fail_create: Cell::new(None),
            fail_destroy: Cell::new(None),
            fail_slot_write: Cell::new(None),
            fail_slot_read: Cell::new(None),
        }
    }

    /// Deliver an event to `handle` through the trampoline.
    ///
    /// Unknown handles get 0 without default processing, as sending to a
    /// destroyed native window does. The creation event cannot be sent from
    /// outside, since its payload is only meaningful during creation.
    pub fn send(
        &self,
        handle: SurfaceHandle,
        code: EventCode,
        wparam: usize,
        lparam: isize,
    ) -> isize {
        if code == self.creation_event() {
            log::warn!("refusing to send creation event to {}", handle);
            return 0;
        }
        if !self.is_alive(handle) {
            log::trace!("dropping {:#06x} for unknown {}", code, handle);
            return 0;
        }
        // SAFETY: lparam is only dereferenced for the creation event.
        unsafe { dispatch(self, handle, code, wparam, lparam) }
    }

    pub fn is_alive(&self, handle: SurfaceHandle) -> bool {
        self.state.borrow().surfaces.contains_key(&handle)
    }

    pub fn surface_count(&self) -> usize {
        self.state.borrow().surfaces.len()
    }

    pub fn surface_name(&self, handle: SurfaceHandle) -> Option<String> {
        self.state.borrow().surfaces.get(&handle).map(|s| s.name.clone())
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.state.borrow().classes.contains(name)
    }

    /// Codes of the most recent events that fell through to default
    /// processing, oldest first. At most [`DEFAULT_LOG_CAPACITY`] are kept.
    pub fn default_log(&self) -> Vec<EventCode> {
        self.state.borrow().default_log.iter().copied().collect()
    }

    pub fn clear_default_log(&self) {
        self.state.borrow_mut().default_log.clear();
    }

    /// Make the next surface creation fail with `code`.
    pub fn fail_next_create(&self, code: u32) {
        self.fail_create.set(Some(code));
    }

    /// Make the next surface destruction fail with `code`.
    pub fn fail_next_destroy(&self, code: u32) {
        self.fail_destroy.set(Some(code));
    }

    /// Make slot writes fail with `code` until reset with `None`.
    pub fn fail_slot_writes(&self, code: Option<u32>) {
        self.fail_slot_write.set(code);
    }

    /// Make slot reads fail with `code` until reset with `None`.
    pub fn fail_slot_reads(&self, code: Option<u32>) {
        self.fail_slot_read.set(code);
    }

    fn deliver(&self, handle: SurfaceHandle, code: EventCode, lparam: isize) -> isize {
        // SAFETY: callers pass a CreationRecord payload for the creation event.
        unsafe { dispatch(self, handle, code, 0, lparam) }
    }

    fn remove(&self, handle: SurfaceHandle) {
        self.deliver(handle, EVENT_DESTROY, 0);
        self.deliver(handle, EVENT_NCDESTROY, 0);
        self.state.borrow_mut().surfaces.remove(&handle);
    }
}

impl Default for HeadlessSurfaces {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceSystem for HeadlessSurfaces {
    fn register_class(&self, class: &SurfaceClass) -> Result<()> {
        if !self.state.borrow_mut().classes.insert(class.name().to_string()) {
            log::debug!("class {:?} already registered", class.name());
        }
        Ok(())
    }

    fn unregister_class(&self, class: &SurfaceClass) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let code = if !state.classes.contains(class.name()) {
            ERROR_CLASS_DOES_NOT_EXIST
        } else if state.surfaces.values().any(|s| s.class == class.name()) {
            ERROR_CLASS_HAS_WINDOWS
        } else {
            state.classes.remove(class.name());
            return Ok(());
        };
        Err(Error::ClassUnregistration {
            class: class.name().to_string(),
            code,
        })
    }

    fn create_surface(
        &self,
        class: &SurfaceClass,
        name: &str,
        context: *const c_void,
    ) -> Result<SurfaceHandle> {
        let creation_failed = |code| Error::SurfaceCreation {
            name: name.to_string(),
            code,
        };

        if let Some(code) = self.fail_create.take() {
            return Err(creation_failed(code));
        }

        let handle = {
            let mut state = self.state.borrow_mut();
            if !state.classes.contains(class.name()) {
                return Err(creation_failed(ERROR_CANNOT_FIND_WND_CLASS));
            }
            state.next_handle += 1;
            let handle = SurfaceHandle::from_raw(state.next_handle);
            state.surfaces.insert(
                handle,
                Surface {
                    class: class.name().to_string(),
                    name: name.to_string(),
                    slot: 0,
                },
            );
            handle
        };

        let record = CreationRecord { context };
        let payload = &record as *const CreationRecord as isize;

        if self.deliver(handle, self.creation_event(), payload) == 0 {
            self.deliver(handle, EVENT_NCDESTROY, 0);
            self.state.borrow_mut().surfaces.remove(&handle);
            return Err(creation_failed(0));
        }
        if self.deliver(handle, EVENT_CREATE, payload) == -1 {
            self.remove(handle);
            return Err(creation_failed(0));
        }

        log::trace!("created {} ({:?})", handle, name);
        Ok(handle)
    }

    fn destroy_surface(&self, handle: SurfaceHandle) -> Result<()> {
        if let Some(code) = self.fail_destroy.take() {
            return Err(Error::SurfaceDestruction { handle, code });
        }
        if !self.is_alive(handle) {
            return Err(Error::SurfaceDestruction {
                handle,
                code: ERROR_INVALID_WINDOW_HANDLE,
            });
        }
        self.remove(handle);
        log::trace!("destroyed {}", handle);
        Ok(())
    }

    fn resolve_event_name(&self, name: &str) -> Result<EventCode> {
        let name_failed = |code| Error::EventName {
            name: name.to_string(),
            code,
        };
        if name.is_empty() {
            return Err(name_failed(ERROR_INVALID_PARAMETER));
        }

        let mut names = EVENT_NAMES
            .get_or_init(|| Mutex::new(HashMap::new()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Atom names compare case-insensitively.
        let key = name.to_lowercase();
        if let Some(&code) = names.get(&key) {
            return Ok(code);
        }

        let code = FIRST_REGISTERED_EVENT + names.len() as EventCode;
        if code > LAST_REGISTERED_EVENT {
            return Err(name_failed(ERROR_NOT_ENOUGH_MEMORY));
        }
        names.insert(key, code);
        Ok(code)
    }

    unsafe fn creation_context(&self, lparam: isize) -> *const c_void {
        let record = lparam as *const CreationRecord;
        if record.is_null() {
            return std::ptr::null();
        }
        (*record).context
    }

    fn write_slot(&self, handle: SurfaceHandle, value: isize) -> SlotResult {
        if let Some(code) = self.fail_slot_write.get() {
            return Err(SlotError { code });
        }
        let mut state = self.state.borrow_mut();
        let surface = state.surfaces.get_mut(&handle).ok_or(SlotError {
            code: ERROR_INVALID_WINDOW_HANDLE,
        })?;
        Ok(std::mem::replace(&mut surface.slot, value))
    }

    fn read_slot(&self, handle: SurfaceHandle) -> SlotResult {
        if let Some(code) = self.fail_slot_read.get() {
            return Err(SlotError { code });
        }
        self.state
            .borrow()
            .surfaces
            .get(&handle)
            .map(|s| s.slot)
            .ok_or(SlotError {
                code: ERROR_INVALID_WINDOW_HANDLE,
            })
    }

    fn default_procedure(
        &self,
        _handle: SurfaceHandle,
        code: EventCode,
        wparam: usize,
        lparam: isize,
    ) -> isize {
        {
            let mut state = self.state.borrow_mut();
            let recent = &mut state.default_log;
            if recent.len() == DEFAULT_LOG_CAPACITY {
                recent.pop_front();
            }
            recent.push_back(code);
        }
        // Creation proceeds unless a callback objects.
        if code == self.creation_event() {
            return 1;
        }
        if code == EVENT_CREATE {
            return 0;
        }
        (self.default_procedure)(code, wparam, lparam)
    }
}
