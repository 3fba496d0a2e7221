//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backends.

pub mod config;
pub mod init;
pub mod send;
pub mod verify;

pub use config::handle_config_command;
pub use init::{handle_init_command, InitArgs};
pub use send::{handle_send_command, SendArgs};
pub use verify::{handle_verify_command, VerifyArgs};

use crate::error::MaildownResult;

/// Backend used when `--backend` is not given
pub const DEFAULT_BACKEND: &str = "aws";

/// Report input mistakes to the user without failing the invocation
///
/// Validation errors are printed as a single line on stderr and swallowed;
/// every other error is returned unchanged.
pub fn report_validation(result: MaildownResult<()>) -> MaildownResult<()> {
    match result {
        Err(err) if err.is_validation() => {
            eprintln!("{}", err);
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MaildownError;

    #[test]
    fn test_validation_errors_are_swallowed() {
        assert!(report_validation(Err(MaildownError::NoRecipients)).is_ok());
        assert!(report_validation(Err(MaildownError::AmbiguousContent)).is_ok());
        assert!(report_validation(Err(MaildownError::UnknownBackend("x".into()))).is_ok());
    }

    #[test]
    fn test_other_errors_are_returned() {
        let err = report_validation(Err(MaildownError::MissingCredentials)).unwrap_err();
        assert!(matches!(err, MaildownError::MissingCredentials));
        assert!(report_validation(Ok(())).is_ok());
    }
}
