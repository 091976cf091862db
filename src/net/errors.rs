//! Socket errors that are expected while a listener shuts down.
//!
//! # Responsibilities
//! - Recognize benign errors by `io::ErrorKind`
//! - Recognize platform-specific raw OS codes
//! - Allow extra codes from configuration

use std::io;

/// Raw OS codes treated as benign on this platform.
///
/// Windows: `ERROR_NETNAME_DELETED`, `ERROR_OPERATION_ABORTED`,
/// `ERROR_CONNECTION_INVALID`.
#[cfg(windows)]
pub const DEFAULT_IGNORABLE_OS_CODES: &[i32] = &[64, 995, 1229];

/// Raw OS codes treated as benign on this platform.
///
/// Unix: `EBADF`, seen when the listening socket is closed under a pending accept.
#[cfg(not(windows))]
pub const DEFAULT_IGNORABLE_OS_CODES: &[i32] = &[9];

const IGNORABLE_KINDS: &[io::ErrorKind] = &[
    io::ErrorKind::ConnectionAborted,
    io::ErrorKind::ConnectionReset,
    io::ErrorKind::NotConnected,
    io::ErrorKind::BrokenPipe,
    io::ErrorKind::Interrupted,
];

/// Classifier for shutdown-race socket errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnorableErrors {
    os_codes: Vec<i32>,
}

impl IgnorableErrors {
    /// Platform defaults plus `extra` raw OS codes.
    pub fn with_extra_codes(extra: &[i32]) -> Self {
        let mut os_codes = DEFAULT_IGNORABLE_OS_CODES.to_vec();
        for code in extra {
            if !os_codes.contains(code) {
                os_codes.push(*code);
            }
        }
        Self { os_codes }
    }

    pub fn os_codes(&self) -> &[i32] {
        &self.os_codes
    }

    /// Whether `err` is an expected shutdown race rather than a fault.
    pub fn is_ignorable(&self, err: &io::Error) -> bool {
        if let Some(code) = err.raw_os_error() {
            if self.os_codes.contains(&code) {
                return true;
            }
        }
        IGNORABLE_KINDS.contains(&err.kind())
    }

    /// Like [`IgnorableErrors::is_ignorable`] for any error that may wrap an `io::Error`.
    pub fn is_ignorable_dyn(&self, err: &(dyn std::error::Error + 'static)) -> bool {
        let mut current = Some(err);
        while let Some(e) = current {
            if let Some(io_err) = e.downcast_ref::<io::Error>() {
                return self.is_ignorable(io_err);
            }
            current = e.source();
        }
        false
    }
}

impl Default for IgnorableErrors {
    fn default() -> Self {
        Self::with_extra_codes(&[])
    }
}
