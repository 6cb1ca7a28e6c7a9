//! # Windows Display Provider
//! Enumerates display outputs through GDI so a capture target can be selected.
//!

#[cfg(windows)]
mod gdi;

#[cfg(windows)]
pub use gdi::GdiDisplays;
