//! Event codes, subscription tokens and the per-window callback registry.
//!
//! The native system delivers every event for a surface to a single
//! procedure. This module holds the pieces that let many independent
//! subscribers share that one delivery channel:
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Module A   │     │  Module B   │     │  Module C   │
//! └──────┬──────┘     └──────┬──────┘     └──────┬──────┘
//!        │ register()        │ register()        │ register()
//!        ▼                   ▼                   ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                 CallbackRegistry                    │
//! │        code -> [(secret, handler), ...]             │
//! └─────────────────────────┬───────────────────────────┘
//!                           │ lookup(code)
//!                           ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                    Trampoline                       │
//! │         (max of all results, or default)            │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Structure
//!
//! - [`token`]: `CallbackToken` packing (code, secret)
//! - [`registry`]: `CallbackRegistry` and its policies

pub mod registry;
pub mod token;

pub use registry::{CallbackRegistry, RemovalPolicy, SecretPolicy};
pub use token::CallbackToken;

/// Integer identifying a class of events.
pub type EventCode = u32;
