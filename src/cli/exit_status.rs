use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): every requested language was processed
/// - `Failure` (1): the run finished but something was not synced, or the request was invalid
/// - `Error` (2): the run could not start (config error, missing API key, unreadable locales)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
