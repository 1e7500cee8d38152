//! Multiplexed native event dispatch.
//!
//! A native surface accepts exactly one event procedure. `surfacemux` owns
//! that procedure and fans each event out to any number of callbacks
//! registered on a [`MessageWindow`], so decoupled modules can listen to the
//! same event code independently and unsubscribe precisely by token.
//!
//! ```text
//! native system ─▶ trampoline ─▶ handle slot ─▶ MessageWindow
//!                                                    │ lookup(code)
//!                                                    ▼
//!                        max(0, results...) ◀── callbacks
//!                        or default processing
//! ```
//!
//! Everything runs on the thread that created the window.

pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod platform;
pub mod window;

// Re-export main types for convenient access
pub use config::WindowConfig;
pub use error::{Error, Result};
pub use events::{CallbackRegistry, CallbackToken, EventCode, RemovalPolicy, SecretPolicy};
pub use platform::{HeadlessSurfaces, SurfaceClass, SurfaceHandle, SurfaceSystem};
pub use window::{Callback, MessageWindow};
