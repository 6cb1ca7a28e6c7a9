use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

/// The kind of resource a tracked handle stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// Graphics device.
    Device,
    /// GPU render target.
    RenderTarget,
    /// CPU readable staging surface.
    Staging,
    /// Loaded capture runtime.
    Library,
    /// Capture session.
    Session,
    /// Host texture.
    Texture,
}

#[derive(Debug, Default)]
struct TrackerState {
    next_id: u64,
    live: HashMap<u64, HandleKind>,
    acquired: Vec<HandleKind>,
    released: Vec<HandleKind>,
    violations: Vec<String>,
}

/// Records every handle the doubles hand out and give back.
///
/// Misuse, such as releasing a handle twice, is recorded as a violation rather than panicking so
/// that it can't abort a test from inside a `Drop`.
#[derive(Debug, Clone, Default)]
pub struct HandleTracker(Arc<Mutex<TrackerState>>);

impl HandleTracker {
    /// Hand out a new handle id of `kind`.
    pub fn acquire(&self, kind: HandleKind) -> u64 {
        let mut state = self.0.lock();

        state.next_id += 1;
        let id = state.next_id;

        state.live.insert(id, kind);
        state.acquired.push(kind);

        id
    }

    /// Give back the handle `id`.
    pub fn release(&self, id: u64) {
        let mut state = self.0.lock();

        let removed = state.live.remove(&id);
        match removed {
            Some(kind) => state.released.push(kind),
            None => state
                .violations
                .push(format!("Handle {id} released while not live")),
        }
    }

    /// Record misuse of a double.
    pub fn violation(&self, message: impl Into<String>) {
        self.0.lock().violations.push(message.into());
    }

    /// If the handle `id` is live.
    pub fn is_live(&self, id: u64) -> bool {
        self.0.lock().live.contains_key(&id)
    }

    /// The number of live handles.
    pub fn live_count(&self) -> usize {
        self.0.lock().live.len()
    }

    /// The number of live handles of `kind`.
    pub fn live_of(&self, kind: HandleKind) -> usize {
        self.0.lock().live.values().filter(|live| **live == kind).count()
    }

    /// Kinds in the order they were acquired.
    pub fn acquired(&self) -> Vec<HandleKind> {
        self.0.lock().acquired.clone()
    }

    /// Kinds in the order they were released.
    pub fn released(&self) -> Vec<HandleKind> {
        self.0.lock().released.clone()
    }

    /// Recorded misuse.
    pub fn violations(&self) -> Vec<String> {
        self.0.lock().violations.clone()
    }

    /// Panics unless nothing is live and nothing was misused.
    #[track_caller]
    pub fn assert_clean(&self) {
        let state = self.0.lock();

        assert!(
            state.violations.is_empty(),
            "Violations: {:?}",
            state.violations
        );
        assert!(state.live.is_empty(), "Leaked: {:?}", state.live);
    }
}

#[cfg(test)]
mod test {
    use super::{HandleKind, HandleTracker};

    #[test]
    fn double_release_is_a_violation() {
        let tracker = HandleTracker::default();

        let id = tracker.acquire(HandleKind::Device);
        tracker.release(id);
        tracker.release(id);

        assert_eq!(tracker.live_count(), 0);
        assert_eq!(tracker.violations().len(), 1);
    }
}
