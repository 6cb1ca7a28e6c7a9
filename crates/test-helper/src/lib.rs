//! # Test Helper
//! Doubles for the host, graphics backend, capture runtime and display enumeration, sharing a
//! [`HandleTracker`] so tests can check that every handle is released, in order, exactly once.
//!

mod displays;
mod graphics;
mod host;
pub mod logger;
mod runtime;
mod tracker;

pub use displays::FakeDisplays;
pub use graphics::{Bgra, FakeDevice, FakeGraphics, FakeSurface, GraphicsFault, pixel_pattern};
pub use host::{FakeEffect, FakeHost, FakeTexture};
pub use runtime::{FakeLibrary, FakeRuntime, FakeSession, RuntimeFault};
pub use tracker::{HandleKind, HandleTracker};

/// A tracker with every double wired to it.
pub fn doubles() -> (HandleTracker, FakeHost, FakeGraphics, FakeRuntime) {
    let tracker = HandleTracker::default();

    let host = FakeHost::new(&tracker);
    let graphics = FakeGraphics::new(&tracker);
    let runtime = FakeRuntime::new(&tracker);

    (tracker, host, graphics, runtime)
}
