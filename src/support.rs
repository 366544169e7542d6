//! Kernel capability tiers and BPF-adjacent helpers
//!
//! Callers use [`bpf_support_level`] to decide whether to touch the
//! gateway at all: devices on pre-4.9 kernels have no usable eBPF, 4.9
//! kernels carry the basic map and cgroup skb machinery, and 4.14 adds
//! cgroup socket filters and map-in-map.

use std::io;
use std::mem;
use std::os::fd::{AsRawFd, BorrowedFd};
use std::ptr;

use nix::sys::resource::{Resource, setrlimit};
use nix::sys::utsname::uname;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{BpfError, Result};

const SO_COOKIE: libc::c_int = 57;
const MEMBARRIER_CMD_GLOBAL: libc::c_int = 1;

/// The cookie value no socket ever has
pub const NONEXISTENT_COOKIE: u64 = 0;

/// How much of the BPF surface the running kernel supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BpfLevel {
	/// Kernel older than 4.9: no usable eBPF
	None,
	/// 4.9 kernel: basic functionality such as cgroup skb filters
	Basic,
	/// 4.14 or newer: map-in-map, cgroup socket filters
	Extended,
}

static SUPPORT_LEVEL: Lazy<BpfLevel> = Lazy::new(detect_support_level);

/// The running kernel's BPF support tier, detected once per process
#[must_use]
pub fn bpf_support_level() -> BpfLevel {
	*SUPPORT_LEVEL
}

fn detect_support_level() -> BpfLevel {
	let Ok(uts) = uname() else {
		return BpfLevel::None;
	};
	let release = uts.release().to_string_lossy();
	let level = parse_kernel_version(&release).map_or(BpfLevel::None, level_for_kernel);
	debug!("kernel {release}: bpf support level {level:?}");
	level
}

fn level_for_kernel(version: (u32, u32)) -> BpfLevel {
	if version >= (4, 14) {
		BpfLevel::Extended
	} else if version >= (4, 9) {
		BpfLevel::Basic
	} else {
		BpfLevel::None
	}
}

/// Pull `major.minor` out of a kernel release string such as
/// `5.15.0-107-generic`.
fn parse_kernel_version(release: &str) -> Option<(u32, u32)> {
	let mut parts = release.split(|c: char| !c.is_ascii_digit());
	let major = parts.next()?.parse().ok()?;
	let minor = parts.next()?.parse().ok()?;
	Some((major, minor))
}

/// The kernel-assigned cookie identifying `sock`, as seen by BPF programs
/// via `bpf_get_socket_cookie`.
///
/// The cookie is allocated on first request and stable for the socket's
/// lifetime; it is never [`NONEXISTENT_COOKIE`].
pub fn socket_cookie(sock: BorrowedFd<'_>) -> Result<u64> {
	let mut cookie: u64 = 0;
	let mut len = mem::size_of::<u64>() as libc::socklen_t;
	// SAFETY: cookie and len are valid for writes of the sizes passed.
	let ret = unsafe {
		libc::getsockopt(
			sock.as_raw_fd(),
			libc::SOL_SOCKET,
			SO_COOKIE,
			ptr::from_mut(&mut cookie).cast(),
			&mut len,
		)
	};
	if ret != 0 {
		return Err(BpfError::last_os_error());
	}
	Ok(cookie)
}

/// Wait for an RCU grace period, so that no BPF program can still observe
/// state replaced before the call.
///
/// Uses `membarrier(MEMBARRIER_CMD_GLOBAL)`, which the kernel implements
/// as `synchronize_rcu`.
pub fn synchronize_kernel_rcu() -> Result<()> {
	// SAFETY: this membarrier command takes no pointers.
	let ret = unsafe { libc::syscall(libc::SYS_membarrier, MEMBARRIER_CMD_GLOBAL, 0) };
	if ret < 0 {
		return Err(BpfError::last_os_error());
	}
	Ok(())
}

/// Raise `RLIMIT_MEMLOCK` so map creation does not fail with EPERM on
/// kernels that charge map memory against it. Intended for tests.
pub fn raise_memlock_limit() -> Result<()> {
	const LIMIT: u64 = 1 << 30;
	setrlimit(Resource::RLIMIT_MEMLOCK, LIMIT, LIMIT)
		.map_err(|errno| BpfError::classify(io::Error::from_raw_os_error(errno as i32)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_release_strings() {
		assert_eq!(parse_kernel_version("4.14.0"), Some((4, 14)));
		assert_eq!(parse_kernel_version("5.15.0-107-generic"), Some((5, 15)));
		assert_eq!(parse_kernel_version("6.8.0-rc3"), Some((6, 8)));
		assert_eq!(parse_kernel_version("garbage"), None);
	}

	#[test]
	fn maps_versions_to_tiers() {
		assert_eq!(level_for_kernel((4, 4)), BpfLevel::None);
		assert_eq!(level_for_kernel((4, 9)), BpfLevel::Basic);
		assert_eq!(level_for_kernel((4, 13)), BpfLevel::Basic);
		assert_eq!(level_for_kernel((4, 14)), BpfLevel::Extended);
		assert_eq!(level_for_kernel((6, 1)), BpfLevel::Extended);
	}

	#[test]
	fn tiers_are_ordered() {
		assert!(BpfLevel::None < BpfLevel::Basic);
		assert!(BpfLevel::Basic < BpfLevel::Extended);
	}
}
