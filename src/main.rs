//! Demo host: one message window, several independent subscribers.
//!
//! On Windows this runs a real message loop until the private quit event
//! (`WM_USER`) is posted to the window. Elsewhere it drives the headless
//! surface system through a short scripted session.

use surfacemux::config::{self, WindowConfig};
use surfacemux::model::constants::*;
use surfacemux::MessageWindow;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("surfacemux error: {}", e);
        std::process::exit(1);
    }
}

fn subscribe(window: &MessageWindow) -> surfacemux::Result<()> {
    window.register_named_callback(TASKBAR_CREATED, |_, _, _| {
        log::info!("taskbar (re)created");
        0
    })?;

    window.register_callback(EVENT_DISPLAYCHANGE, |_, wparam, lparam| {
        log::info!(
            "display changed: {}x{} at {} bpp",
            lparam & 0xFFFF,
            (lparam >> 16) & 0xFFFF,
            wparam
        );
        0
    });

    Ok(())
}

#[cfg(target_os = "windows")]
fn run() -> surfacemux::Result<()> {
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, GetMessageW, PostQuitMessage, TranslateMessage, MSG,
    };

    let config = WindowConfig::load_or_default(&config::config_path());
    let window = MessageWindow::with_system(surfacemux::platform::native(), &config)?;
    subscribe(&window)?;

    window.register_callback(EVENT_USER, |_, _, _| {
        unsafe { PostQuitMessage(0) };
        1
    });

    log::info!(
        "listening on {}; post {:#06x} to quit",
        window.handle(),
        EVENT_USER
    );

    unsafe {
        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run() -> surfacemux::Result<()> {
    use surfacemux::platform::headless;
    use surfacemux::SurfaceSystem;

    let config = WindowConfig::load_or_default(&config::config_path());
    let window = MessageWindow::with_system(surfacemux::platform::native(), &config)?;
    let system = headless::current();
    subscribe(&window)?;

    let taskbar_created = system.resolve_event_name(TASKBAR_CREATED)?;
    system.send(window.handle(), taskbar_created, 0, 0);
    system.send(window.handle(), EVENT_DISPLAYCHANGE, 32, (1080 << 16) | 1920);

    let unhandled = system.send(window.handle(), EVENT_USER, 0, 0);
    log::info!("unhandled event fell back to default processing ({})", unhandled);

    Ok(())
}
