//! Exit codes for the `migasfree-sdk` command
//!
//! These follow the BSD sysexits.h conventions where possible, plus a few
//! application-specific codes for authentication and API failures.

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SdkExitCode {
    /// Command line usage error
    UsageError = exitcode::USAGE,

    /// Input data was incorrect
    DataError = exitcode::DATAERR,

    /// Record lookup matched nothing
    NotFound = exitcode::NOUSER,

    /// Cannot create the output file
    CantCreate = exitcode::CANTCREAT,

    /// Configuration problem
    ConfigError = exitcode::CONFIG,

    /// Login or token issues
    AuthError = 100,

    /// Connection or communication issues
    NetworkError = 101,

    /// Remote API returned an error
    ApiError = 102,
}

impl SdkExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl From<SdkExitCode> for i32 {
    fn from(code: SdkExitCode) -> Self {
        code.code()
    }
}
