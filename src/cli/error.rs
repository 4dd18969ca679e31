//! CLI-level errors (wraps infrastructure errors)

use std::io::ErrorKind;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { source, .. } if source.kind() == ErrorKind::NotFound => {
                    exitcode::NOINPUT
                }
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Decode { .. } => exitcode::DATAERR,
                InfraError::Application(ApplicationError::Domain(_)) => exitcode::DATAERR,
                InfraError::Application(ApplicationError::Config { .. }) => exitcode::CONFIG,
                InfraError::Application(ApplicationError::OperationFailed { .. }) => {
                    exitcode::SOFTWARE
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_cycle_when_mapping_exit_code_then_reports_data_error() {
        let err = CliError::from(ApplicationError::Domain(DomainError::CycleDetected {
            partition: "TEAM".into(),
            path: vec!["a".into(), "b".into(), "a".into()],
        }));
        assert_eq!(err.exit_code(), exitcode::DATAERR);
        assert_eq!(
            err.to_string(),
            "cycle detected in partition 'TEAM': a -> b -> a"
        );
    }

    #[test]
    fn given_missing_input_when_mapping_exit_code_then_reports_noinput() {
        let err = CliError::from(InfraError::io(
            "read records groups.json",
            std::io::Error::new(ErrorKind::NotFound, "missing"),
        ));
        assert_eq!(err.exit_code(), exitcode::NOINPUT);

        let denied = CliError::from(InfraError::io(
            "read records groups.json",
            std::io::Error::new(ErrorKind::PermissionDenied, "denied"),
        ));
        assert_eq!(denied.exit_code(), exitcode::IOERR);
    }
}
