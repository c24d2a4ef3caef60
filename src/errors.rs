//! Shared error taxonomy
//!
//! Every error raised by reeldb belongs to exactly one class:
//! - UserInput: malformed request parameters (REJECT)
//! - Contract: programmer errors in models or calls (FATAL)
//! - Consistency: the store disagreed with an earlier read (ERROR)
//! - Store: the row store itself failed (ERROR)

use std::fmt;

/// Severity levels shared by all error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected, nothing executed
    Reject,
    /// Operation failed, process is healthy
    Error,
    /// Programmer error, must not reach production traffic
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Reject => "REJECT",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    UserInput,
    Contract,
    Consistency,
    Store,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::UserInput => "user_input",
            ErrorClass::Contract => "contract",
            ErrorClass::Consistency => "consistency",
            ErrorClass::Store => "store",
        }
    }

    /// Default severity for the class
    pub fn severity(&self) -> Severity {
        match self {
            ErrorClass::UserInput => Severity::Reject,
            ErrorClass::Contract => Severity::Fatal,
            ErrorClass::Consistency | ErrorClass::Store => Severity::Error,
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
