//! Extensions for results whose failure should be logged rather than propagated.
//!

use tracing::error;

/// Log `error` with `message` then panic.
pub fn log_and_panic<Err: core::fmt::Display>(error: Err, message: &str) -> ! {
    error!("{message}: {error}");

    panic!("{message}: {error}");
}

/// Log `error` with `message`.
pub fn report<Err: core::fmt::Display>(error: Err, message: &str) {
    error!("{message}: {error}");
}

/// Handling for failures that end the current operation but not the caller.
pub trait Failure<T> {
    /// Log the failure and continue with `None`.
    fn report(self, message: &str) -> Option<T>;

    /// Log the failure and panic, for setup that can't continue.
    fn log_and_panic(self, message: &str) -> T;
}

impl<T, E: core::fmt::Display> Failure<T> for Result<T, E> {
    fn report(self, message: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                report(error, message);
                None
            }
        }
    }

    fn log_and_panic(self, message: &str) -> T {
        match self {
            Ok(value) => value,
            Err(error) => log_and_panic(error, message),
        }
    }
}

impl<T> Failure<T> for Option<T> {
    fn report(self, message: &str) -> Self {
        match self {
            Some(value) => Some(value),
            None => {
                report("Was None", message);
                None
            }
        }
    }

    fn log_and_panic(self, message: &str) -> T {
        match self {
            Some(value) => value,
            None => log_and_panic("Was None", message),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Failure;

    #[test]
    fn report_keeps_value() {
        let ok: Result<u32, &str> = Ok(4);
        assert_eq!(ok.report("unused"), Some(4));

        let err: Result<u32, &str> = Err("bad");
        assert_eq!(err.report("failed"), None);

        assert_eq!(None::<u32>.report("missing"), None);
    }

    #[test]
    #[should_panic(expected = "setup: bad")]
    fn log_and_panic_panics() {
        let err: Result<u32, &str> = Err("bad");
        err.log_and_panic("setup");
    }
}
