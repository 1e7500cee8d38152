//! Subscription tokens.
//!
//! A token packs the event code into the low 32 bits and the entry's 16-bit
//! secret into bits 32..48. The fields are combined with bitwise OR, so both
//! decode losslessly.

use std::fmt;

use crate::model::constants::{TOKEN_CODE_MASK, TOKEN_SECRET_MASK, TOKEN_SECRET_SHIFT};

use super::EventCode;

/// Opaque handle returned by registration, used to remove exactly that entry.
///
/// Only valid for the window that issued it, and only until the entry is
/// removed. Reusing a spent token is harmless: removal reports "not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackToken(u64);

impl CallbackToken {
    pub fn new(code: EventCode, secret: u16) -> Self {
        Self(((secret as u64) << TOKEN_SECRET_SHIFT) | code as u64)
    }

    /// The event code the entry was registered under.
    pub fn code(self) -> EventCode {
        (self.0 & TOKEN_CODE_MASK) as EventCode
    }

    /// The secret distinguishing this entry among others for the same code.
    pub fn secret(self) -> u16 {
        ((self.0 >> TOKEN_SECRET_SHIFT) & TOKEN_SECRET_MASK) as u16
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn into_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}:{:#06x}", self.code(), self.secret())
    }
}
