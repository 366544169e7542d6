//! Error types for the bpf(2) gateway
//!
//! Every failed syscall is surfaced verbatim: the variant classifies the
//! saved OS error code, and the original `io::Error` rides along untouched.
//! No retries, no masking.

use std::io;
use thiserror::Error;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, BpfError>;

/// Error type for gateway operations, classified by the kernel errno
#[derive(Debug, Error)]
pub enum BpfError {
	/// The kernel rejected the attribute (E2BIG or EINVAL).
	///
	/// E2BIG means a field outside the command's documented set was
	/// non-zero; the kernel checks every byte of `bpf_attr`.
	#[error("kernel rejected bpf attribute: {0}")]
	InvalidAttribute(#[source] io::Error),

	/// The named object does not exist (ENOENT): a missing map key, a
	/// missing pinned path, or the terminal signal of key enumeration
	#[error("object not found: {0}")]
	NotFound(#[source] io::Error),

	/// The caller lacks the capability for this command (EPERM or EACCES)
	#[error("permission denied: {0}")]
	PermissionDenied(#[source] io::Error),

	/// The map is full or the fd table is exhausted (ENOSPC, E2BIG on
	/// entry count, EMFILE, ENFILE or ENOMEM)
	#[error("resource exhausted: {0}")]
	Exhausted(#[source] io::Error),

	/// Any other OS error, passed through unchanged
	#[error("bpf syscall failed: {0}")]
	Io(#[from] io::Error),
}

impl BpfError {
	/// Classify the calling thread's last OS error.
	///
	/// Must be called immediately after a failed syscall, before anything
	/// else can clobber errno.
	pub(crate) fn last_os_error() -> Self {
		Self::classify(io::Error::last_os_error())
	}

	/// Sort an OS error into the gateway's error taxonomy
	pub(crate) fn classify(err: io::Error) -> Self {
		match err.raw_os_error() {
			Some(libc::E2BIG | libc::EINVAL) => Self::InvalidAttribute(err),
			Some(libc::ENOENT) => Self::NotFound(err),
			Some(libc::EPERM | libc::EACCES) => Self::PermissionDenied(err),
			Some(libc::ENOSPC | libc::EMFILE | libc::ENFILE | libc::ENOMEM) => Self::Exhausted(err),
			_ => Self::Io(err),
		}
	}

	/// The raw OS error code this error was built from, if any
	#[must_use]
	pub fn raw_os_error(&self) -> Option<i32> {
		match self {
			Self::InvalidAttribute(e)
			| Self::NotFound(e)
			| Self::PermissionDenied(e)
			| Self::Exhausted(e)
			| Self::Io(e) => e.raw_os_error(),
		}
	}

	/// Whether this is the ENOENT "not found" signal.
	///
	/// Key enumeration uses this as its termination condition rather than
	/// an error to propagate.
	#[must_use]
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound(_))
	}
}
