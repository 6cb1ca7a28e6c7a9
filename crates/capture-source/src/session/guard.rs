use core::{any::Any, panic::AssertUnwindSafe};
use std::panic::catch_unwind;

use thiserror::Error;
use tracing::error;

/// A fault caught at the guarded call boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{call} faulted: {message}")]
pub struct GuardedFault {
    /// The guarded call.
    pub call: &'static str,

    /// The fault's message.
    pub message: String,
}

/// Runs `f`, converting a panic inside it into a [`GuardedFault`] instead of unwinding through
/// the caller.
///
/// Only Rust panics are caught. Native faults must already have been converted by `f`, see
/// [`CaptureRuntime::create_session`](crate::CaptureRuntime::create_session).
pub fn guarded_call<T, F: FnOnce() -> T>(call: &'static str, f: F) -> Result<T, GuardedFault> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let fault = GuardedFault {
            call,
            message: payload_message(payload.as_ref()),
        };
        error!("{fault}");
        fault
    })
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown fault".to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn passes_through_value() {
        assert_eq!(guarded_call("add", || 1 + 1), Ok(2));
    }

    #[test]
    fn catches_str_fault() {
        let fault = guarded_call("create", || -> u32 { panic!("access violation") }).unwrap_err();
        assert_eq!(fault.call, "create");
        assert_eq!(fault.message, "access violation");
    }

    #[test]
    fn catches_formatted_fault() {
        let code = 0xC000_0005_u32;
        let fault = guarded_call("create", || -> u32 { panic!("exception {code:#x}") }).unwrap_err();
        assert_eq!(fault.message, "exception 0xc0000005");
    }
}
