/// Process exit codes reported by the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    ApiCallFailed = -1,
    FileNotFound = -2,
    LicenseCheckFailed = -3,
    SecurityViolationCheckFailed = -4,
    InvalidFileType = -5,
    MissingApiKey = -6,
    MissingProjectId = -7,
    OutdatedComponentsFailed = -8,
    InvalidCommandLineOption = -9,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Final process status; `--ignorechecks` forces success.
    pub fn finish(self, ignore_checks: bool) -> i32 {
        if ignore_checks {
            tracing::debug!(suppressed = ?self, "ignorechecks set, exiting with 0");
            return 0;
        }
        self.code()
    }
}
