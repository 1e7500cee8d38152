//! Win32 message windows.
//!
//! Surfaces are hidden, zero-size top-level windows, so they still receive
//! broadcasts such as `TaskbarCreated` (message-only windows do not). The
//! owning window pointer lives in `GWLP_USERDATA`.

use std::ffi::c_void;

use windows::core::{HSTRING, PCWSTR};
use windows::Win32::Foundation::{
    GetLastError, SetLastError, ERROR_CLASS_ALREADY_EXISTS, HINSTANCE, HWND, LPARAM, LRESULT,
    WIN32_ERROR, WPARAM,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetWindowLongPtrW, LoadIconW,
    RegisterClassExW, RegisterWindowMessageW, SetWindowLongPtrW, UnregisterClassW,
    CREATESTRUCTW, GWLP_USERDATA, HICON, WINDOW_EX_STYLE, WINDOW_STYLE, WNDCLASSEXW,
};

use crate::error::{Error, Result};
use crate::events::EventCode;
use crate::window::trampoline::dispatch;

use super::{SlotError, SlotResult, SurfaceClass, SurfaceHandle, SurfaceSystem};

/// The Win32 windowing system. Stateless: all state lives in the windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Surfaces;

fn hwnd(handle: SurfaceHandle) -> HWND {
    HWND(handle.into_raw() as *mut c_void)
}

fn module_instance() -> HINSTANCE {
    unsafe { GetModuleHandleW(None) }
        .map(Into::into)
        .unwrap_or_default()
}

fn last_error() -> u32 {
    unsafe { GetLastError() }.0
}

// HRESULT_FROM_WIN32 keeps the Win32 code in the low word.
fn os_code(err: &windows::core::Error) -> u32 {
    (err.code().0 as u32) & 0xFFFF
}

/// Window procedure registered for every surface class.
unsafe extern "system" fn window_procedure(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let handle = SurfaceHandle::from_raw(hwnd.0 as isize);
    LRESULT(dispatch(&Win32Surfaces, handle, msg, wparam.0, lparam.0))
}

impl SurfaceSystem for Win32Surfaces {
    fn register_class(&self, class: &SurfaceClass) -> Result<()> {
        let name = HSTRING::from(class.name());
        let instance = module_instance();
        let icon = match class.icon_resource() {
            // MAKEINTRESOURCE
            Some(id) => unsafe { LoadIconW(Some(instance), PCWSTR(id as usize as *const u16)) }
                .unwrap_or_else(|e| {
                    log::warn!("failed to load icon resource {}: {}", id, e);
                    HICON::default()
                }),
            None => HICON::default(),
        };

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(window_procedure),
            hInstance: instance,
            hIcon: icon,
            lpszClassName: PCWSTR(name.as_ptr()),
            ..Default::default()
        };

        if unsafe { RegisterClassExW(&wc) } == 0 {
            let code = last_error();
            if code != ERROR_CLASS_ALREADY_EXISTS.0 {
                return Err(Error::ClassRegistration {
                    class: class.name().to_string(),
                    code,
                });
            }
            log::debug!("class {:?} already registered", class.name());
        }
        Ok(())
    }

    fn unregister_class(&self, class: &SurfaceClass) -> Result<()> {
        let name = HSTRING::from(class.name());
        unsafe { UnregisterClassW(PCWSTR(name.as_ptr()), Some(module_instance())) }.map_err(|e| {
            Error::ClassUnregistration {
                class: class.name().to_string(),
                code: os_code(&e),
            }
        })
    }

    fn create_surface(
        &self,
        class: &SurfaceClass,
        name: &str,
        context: *const c_void,
    ) -> Result<SurfaceHandle> {
        let class_name = HSTRING::from(class.name());
        let window_name = HSTRING::from(name);

        let created = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(window_name.as_ptr()),
                WINDOW_STYLE::default(),
                0,
                0,
                0,
                0,
                None,
                None,
                Some(module_instance()),
                Some(context),
            )
        };

        created
            .map(|hwnd| SurfaceHandle::from_raw(hwnd.0 as isize))
            .map_err(|e| Error::SurfaceCreation {
                name: name.to_string(),
                code: os_code(&e),
            })
    }

    fn destroy_surface(&self, handle: SurfaceHandle) -> Result<()> {
        unsafe { DestroyWindow(hwnd(handle)) }.map_err(|e| Error::SurfaceDestruction {
            handle,
            code: os_code(&e),
        })
    }

    fn resolve_event_name(&self, name: &str) -> Result<EventCode> {
        let wide = HSTRING::from(name);
        let code = unsafe { RegisterWindowMessageW(PCWSTR(wide.as_ptr())) };
        if code == 0 {
            return Err(Error::EventName {
                name: name.to_string(),
                code: last_error(),
            });
        }
        Ok(code)
    }

    unsafe fn creation_context(&self, lparam: isize) -> *const c_void {
        let create = lparam as *const CREATESTRUCTW;
        if create.is_null() {
            return std::ptr::null();
        }
        (*create).lpCreateParams as *const c_void
    }

    fn write_slot(&self, handle: SurfaceHandle, value: isize) -> SlotResult {
        unsafe {
            SetLastError(WIN32_ERROR(0));
            let previous = SetWindowLongPtrW(hwnd(handle), GWLP_USERDATA, value as _) as isize;
            // A zero return is ambiguous: only an error if the last error changed.
            if previous == 0 {
                let code = last_error();
                if code != 0 {
                    return Err(SlotError { code });
                }
            }
            Ok(previous)
        }
    }

    fn read_slot(&self, handle: SurfaceHandle) -> SlotResult {
        unsafe {
            SetLastError(WIN32_ERROR(0));
            let value = GetWindowLongPtrW(hwnd(handle), GWLP_USERDATA) as isize;
            if value == 0 {
                let code = last_error();
                if code != 0 {
                    return Err(SlotError { code });
                }
            }
            Ok(value)
        }
    }

    fn default_procedure(
        &self,
        handle: SurfaceHandle,
        code: EventCode,
        wparam: usize,
        lparam: isize,
    ) -> isize {
        unsafe { DefWindowProcW(hwnd(handle), code, WPARAM(wparam), LPARAM(lparam)) }.0
    }
}
