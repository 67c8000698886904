//! Process exit codes and the failure stage that selects them

use crate::error::Error;

/// Process exit code for a clean shutdown
pub const EXIT_OK: u8 = 0;
/// Process exit code for configuration, runtime, or display failures
pub const EXIT_FAILURE: u8 = 1;
/// Process exit code when the device cannot be configured or started
pub const EXIT_DEVICE_START_FAILED: u8 = 2;

/// Where a fatal error happened, which decides the exit code
#[derive(Debug)]
pub enum Failure {
    /// Config file, signal handler, or render sink setup
    Setup(Error),
    /// Port resolution, source creation, configure or start
    DeviceStart(Error),
    /// Anything after the loop reached Scanning
    Runtime(Error),
}

impl Failure {
    pub fn exit_code(&self) -> u8 {
        match self {
            Failure::DeviceStart(_) => EXIT_DEVICE_START_FAILED,
            Failure::Setup(_) | Failure::Runtime(_) => EXIT_FAILURE,
        }
    }

    pub fn error(&self) -> &Error {
        match self {
            Failure::Setup(e) | Failure::DeviceStart(e) | Failure::Runtime(e) => e,
        }
    }
}

/// Exit code for the outcome of a whole session
pub fn exit_code(outcome: &std::result::Result<(), Failure>) -> u8 {
    match outcome {
        Ok(()) => EXIT_OK,
        Err(failure) => failure.exit_code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_session_exits_zero() {
        assert_eq!(exit_code(&Ok(())), EXIT_OK);
    }

    #[test]
    fn test_device_start_failure_code() {
        let outcome = Err(Failure::DeviceStart(Error::Configuration(
            "start: motor did not spin up".into(),
        )));
        assert_eq!(exit_code(&outcome), EXIT_DEVICE_START_FAILED);
        assert_eq!(EXIT_DEVICE_START_FAILED, 2);
    }

    #[test]
    fn test_runtime_failures_exit_one() {
        let lost = Failure::Runtime(Error::DeviceLost { consecutive: 50 });
        let display = Failure::Runtime(Error::Display("window closed".into()));
        let setup = Failure::Setup(Error::Configuration("window_size must be > 0".into()));

        assert_eq!(lost.exit_code(), EXIT_FAILURE);
        assert_eq!(display.exit_code(), EXIT_FAILURE);
        assert_eq!(setup.exit_code(), EXIT_FAILURE);
        assert!(matches!(lost.error(), Error::DeviceLost { consecutive: 50 }));
    }
}
