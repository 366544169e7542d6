//! The syscall gateway
//!
//! One wrapper per bpf(2) command: build a zeroed attribute, issue the
//! syscall, hand the result back. Stateless by construction: nothing is
//! cached, retried or logged here, and concurrent callers need no
//! coordination because the kernel serializes object access itself.
//!
//! Ownership discipline: every fd created or retrieved here comes back as
//! an [`OwnedFd`], so a failed creation is an `Err` rather than a junk
//! descriptor, and release happens exactly once when the owner drops it.
//! Handles passed in are [`BorrowedFd`]s; the gateway never closes a
//! caller's descriptor.

use std::ffi::CStr;
use std::mem;
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};
use std::ptr;

use libc::c_long;

use crate::error::{BpfError, Result};
use crate::sys::attr::BpfAttr;
use crate::sys::consts::{AttachType, BpfCmd, MapFlags, MapType, OpenFlags, WriteMode};

/// Issue the multiplexed bpf(2) syscall with a prepared attribute.
///
/// The attribute is passed by address together with its size; any
/// caller-owned buffers it points into only need to live across this one
/// call.
fn sys_bpf(cmd: BpfCmd, attr: &BpfAttr) -> Result<c_long> {
	// SAFETY: attr is fully zero-initialized by its constructor and the
	// size passed matches its allocation.
	let ret = unsafe {
		libc::syscall(
			libc::SYS_bpf,
			cmd as libc::c_int,
			ptr::from_ref(attr),
			mem::size_of::<BpfAttr>(),
		)
	};
	if ret < 0 { Err(BpfError::last_os_error()) } else { Ok(ret) }
}

/// Issue a bpf(2) command that yields a new file descriptor on success.
fn sys_bpf_fd(cmd: BpfCmd, attr: &BpfAttr) -> Result<OwnedFd> {
	let fd = sys_bpf(cmd, attr)?;
	// SAFETY: on success the kernel returned a freshly opened descriptor
	// that nothing else owns yet.
	Ok(unsafe { OwnedFd::from_raw_fd(fd as RawFd) })
}

fn raw(fd: BorrowedFd<'_>) -> u32 {
	fd.as_raw_fd() as u32
}

/// Create a new BPF map and return its owning handle.
///
/// The map lives until the last descriptor referring to it is closed and
/// any pinned paths are removed.
pub fn create_map(
	map_type: MapType,
	key_size: u32,
	value_size: u32,
	max_entries: u32,
	map_flags: MapFlags,
) -> Result<OwnedFd> {
	let attr = BpfAttr::map_create(map_type, key_size, value_size, max_entries, map_flags);
	sys_bpf_fd(BpfCmd::MapCreate, &attr)
}

/// Write one key/value pair into a map.
///
/// Fails with [`BpfError::Exhausted`] when the map is full, or with the
/// EEXIST/ENOENT conventions of the chosen [`WriteMode`].
///
/// # Safety
///
/// `key` and `value` must be exactly the map's configured key and value
/// sizes: the kernel reads that many bytes from each buffer without
/// knowing the slices' lengths.
pub unsafe fn write_map_entry(
	map_fd: BorrowedFd<'_>,
	key: &[u8],
	value: &[u8],
	mode: WriteMode,
) -> Result<()> {
	let attr = BpfAttr::map_update(raw(map_fd), key.as_ptr(), value.as_ptr(), mode);
	sys_bpf(BpfCmd::MapUpdateElem, &attr).map(drop)
}

/// Read the value stored under `key` into `value`.
///
/// Fails with [`BpfError::NotFound`] when the key is absent.
///
/// # Safety
///
/// `key` must be exactly the map's key size and `value` at least its
/// value size: the kernel writes the full value without knowing the
/// slice's length.
pub unsafe fn find_map_entry(map_fd: BorrowedFd<'_>, key: &[u8], value: &mut [u8]) -> Result<()> {
	let attr = BpfAttr::map_lookup(raw(map_fd), key.as_ptr(), value.as_mut_ptr());
	sys_bpf(BpfCmd::MapLookupElem, &attr).map(drop)
}

/// Remove the entry stored under `key`.
///
/// Fails with [`BpfError::NotFound`] when the key is absent.
///
/// # Safety
///
/// `key` must be exactly the map's key size.
pub unsafe fn delete_map_entry(map_fd: BorrowedFd<'_>, key: &[u8]) -> Result<()> {
	let attr = BpfAttr::map_delete(raw(map_fd), key.as_ptr());
	sys_bpf(BpfCmd::MapDeleteElem, &attr).map(drop)
}

/// Fetch the key following `key` in the map's iteration order, writing it
/// into `next_key`. Pass `None` to fetch the first key.
///
/// [`BpfError::NotFound`] is the iteration's terminal signal, not a
/// failure: it means the previous key was the last one.
///
/// # Safety
///
/// `key` (when present) and `next_key` must be exactly the map's key
/// size: the kernel writes a full key into `next_key` without knowing the
/// slice's length.
pub unsafe fn get_next_map_key(
	map_fd: BorrowedFd<'_>,
	key: Option<&[u8]>,
	next_key: &mut [u8],
) -> Result<()> {
	let key_ptr = key.map_or(ptr::null(), <[u8]>::as_ptr);
	let attr = BpfAttr::map_next_key(raw(map_fd), key_ptr, next_key.as_mut_ptr());
	sys_bpf(BpfCmd::MapGetNextKey, &attr).map(drop)
}

/// Fetch the map's first key.
///
/// # Safety
///
/// Same contract as [`get_next_map_key`].
pub unsafe fn get_first_map_key(map_fd: BorrowedFd<'_>, first_key: &mut [u8]) -> Result<()> {
	unsafe { get_next_map_key(map_fd, None, first_key) }
}

/// Give the object behind `fd` a persistent name under the BPF
/// pseudo-filesystem (normally mounted at `/sys/fs/bpf`).
///
/// The kernel owns the filesystem entry from here on; unpinning is done
/// by unlinking the path. Fails with EEXIST (surfaced as
/// [`BpfError::Io`]) if the path is already taken.
pub fn pin_object(fd: BorrowedFd<'_>, path: &CStr) -> Result<()> {
	let attr = BpfAttr::obj_pin(path.as_ptr(), raw(fd));
	sys_bpf(BpfCmd::ObjPin, &attr).map(drop)
}

/// Open a new handle to the object pinned at `path`.
///
/// The returned descriptor refers to the same kernel object as the one
/// that was pinned; writes through either are visible through the other.
/// Fails with [`BpfError::NotFound`] when nothing is pinned there.
pub fn retrieve_object(path: &CStr, flags: OpenFlags) -> Result<OwnedFd> {
	let attr = BpfAttr::obj_get(path.as_ptr(), flags);
	sys_bpf_fd(BpfCmd::ObjGet, &attr)
}

/// Attach a loaded program to an attach point on `target_fd` (a cgroup
/// directory descriptor for the cgroup attach types).
///
/// Whether an existing program is replaced or the call fails is kernel
/// policy for the attach point.
pub fn attach_program(
	attach_type: AttachType,
	prog_fd: BorrowedFd<'_>,
	target_fd: BorrowedFd<'_>,
) -> Result<()> {
	let attr = BpfAttr::prog_attach(attach_type, raw(prog_fd), raw(target_fd));
	sys_bpf(BpfCmd::ProgAttach, &attr).map(drop)
}

/// Detach whatever program is attached at `attach_type` on `target_fd`.
///
/// Fails with [`BpfError::NotFound`] when nothing is attached there.
pub fn detach_program(attach_type: AttachType, target_fd: BorrowedFd<'_>) -> Result<()> {
	let attr = BpfAttr::prog_detach(attach_type, raw(target_fd));
	sys_bpf(BpfCmd::ProgDetach, &attr).map(drop)
}
