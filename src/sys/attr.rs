//! The bpf(2) attribute record
//!
//! The kernel takes one `bpf_attr` union for every command and strictly
//! checks that all bytes outside the command's own fields are zero,
//! failing with E2BIG otherwise. Each constructor here zeroes the whole
//! union first and then sets only its command's fields, so a caller can
//! never forget a reserved field.
//!
//! This module is also the only place where a buffer address becomes a
//! u64: the cast happens while building the attribute, immediately before
//! the syscall, and the integer never escapes.

use std::mem;

use crate::sys::consts::{AttachType, MapFlags, MapType, OpenFlags, WriteMode};

/// The map-creation shape of `bpf_attr` (`BPF_MAP_CREATE`)
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct MapCreateAttr {
	pub map_type: u32,
	pub key_size: u32,
	pub value_size: u32,
	pub max_entries: u32,
	pub map_flags: u32,
}

/// The map-element shape of `bpf_attr` (`BPF_MAP_*_ELEM` and
/// `BPF_MAP_GET_NEXT_KEY`).
///
/// `key` is `__aligned_u64` in the kernel ABI, so four bytes of padding
/// follow `map_fd`. The `value` slot doubles as `next_key` for
/// `BPF_MAP_GET_NEXT_KEY`.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct MapElemAttr {
	pub map_fd: u32,
	pub key: u64,
	pub value: u64,
	pub flags: u64,
}

/// The object pin/get shape of `bpf_attr` (`BPF_OBJ_PIN` / `BPF_OBJ_GET`)
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct ObjAttr {
	pub pathname: u64,
	pub bpf_fd: u32,
	pub file_flags: u32,
}

/// The program attach/detach shape of `bpf_attr` (`BPF_PROG_ATTACH` /
/// `BPF_PROG_DETACH`)
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct ProgAttachAttr {
	pub target_fd: u32,
	pub attach_bpf_fd: u32,
	pub attach_type: u32,
	pub attach_flags: u32,
}

/// One command's worth of syscall parameters, fully zeroed outside the
/// fields the command defines.
///
/// Stack-scoped and transient: an attribute has no identity beyond the
/// single syscall it is built for.
#[repr(C)]
pub(crate) union BpfAttr {
	map_create: MapCreateAttr,
	map_elem: MapElemAttr,
	obj: ObjAttr,
	prog_attach: ProgAttachAttr,
}

/// The only pointer-to-integer cast in the crate. Null encodes "no
/// buffer" (the first-key form of `BPF_MAP_GET_NEXT_KEY`).
fn ptr_to_u64<T>(ptr: *const T) -> u64 {
	ptr as usize as u64
}

impl BpfAttr {
	fn zeroed() -> Self {
		// SAFETY: every field of every variant is plain old data for
		// which all-zero bytes are a valid value.
		unsafe { mem::zeroed() }
	}

	pub(crate) fn map_create(
		map_type: MapType,
		key_size: u32,
		value_size: u32,
		max_entries: u32,
		map_flags: MapFlags,
	) -> Self {
		let mut attr = Self::zeroed();
		// SAFETY: the union is fully zeroed; writing one variant's fields
		// leaves the rest of the record zero.
		let u = unsafe { &mut attr.map_create };
		u.map_type = map_type as u32;
		u.key_size = key_size;
		u.value_size = value_size;
		u.max_entries = max_entries;
		u.map_flags = map_flags.bits();
		attr
	}

	pub(crate) fn map_lookup(map_fd: u32, key: *const u8, value: *mut u8) -> Self {
		let mut attr = Self::zeroed();
		let u = unsafe { &mut attr.map_elem };
		u.map_fd = map_fd;
		u.key = ptr_to_u64(key);
		u.value = ptr_to_u64(value);
		attr
	}

	pub(crate) fn map_update(map_fd: u32, key: *const u8, value: *const u8, mode: WriteMode) -> Self {
		let mut attr = Self::zeroed();
		let u = unsafe { &mut attr.map_elem };
		u.map_fd = map_fd;
		u.key = ptr_to_u64(key);
		u.value = ptr_to_u64(value);
		u.flags = mode as u64;
		attr
	}

	pub(crate) fn map_delete(map_fd: u32, key: *const u8) -> Self {
		let mut attr = Self::zeroed();
		let u = unsafe { &mut attr.map_elem };
		u.map_fd = map_fd;
		u.key = ptr_to_u64(key);
		attr
	}

	/// A null `key` asks the kernel for the map's first key.
	pub(crate) fn map_next_key(map_fd: u32, key: *const u8, next_key: *mut u8) -> Self {
		let mut attr = Self::zeroed();
		let u = unsafe { &mut attr.map_elem };
		u.map_fd = map_fd;
		u.key = ptr_to_u64(key);
		u.value = ptr_to_u64(next_key);
		attr
	}

	pub(crate) fn obj_pin(pathname: *const libc::c_char, bpf_fd: u32) -> Self {
		let mut attr = Self::zeroed();
		let u = unsafe { &mut attr.obj };
		u.pathname = ptr_to_u64(pathname);
		u.bpf_fd = bpf_fd;
		attr
	}

	pub(crate) fn obj_get(pathname: *const libc::c_char, flags: OpenFlags) -> Self {
		let mut attr = Self::zeroed();
		let u = unsafe { &mut attr.obj };
		u.pathname = ptr_to_u64(pathname);
		u.file_flags = flags.bits();
		attr
	}

	pub(crate) fn prog_attach(attach_type: AttachType, prog_fd: u32, target_fd: u32) -> Self {
		let mut attr = Self::zeroed();
		let u = unsafe { &mut attr.prog_attach };
		u.target_fd = target_fd;
		u.attach_bpf_fd = prog_fd;
		u.attach_type = attach_type as u32;
		attr
	}

	pub(crate) fn prog_detach(attach_type: AttachType, target_fd: u32) -> Self {
		let mut attr = Self::zeroed();
		let u = unsafe { &mut attr.prog_attach };
		u.target_fd = target_fd;
		u.attach_type = attach_type as u32;
		attr
	}
}

#[cfg(test)]
mod tests {
	use std::mem::offset_of;
	use std::ptr;

	use super::*;

	const ATTR_SIZE: usize = mem::size_of::<BpfAttr>();

	fn bytes(attr: &BpfAttr) -> &[u8] {
		// SAFETY: BpfAttr is repr(C) plain old data and every constructor
		// zero-initializes it in full, so all bytes are initialized.
		unsafe { std::slice::from_raw_parts(ptr::from_ref(attr).cast::<u8>(), ATTR_SIZE) }
	}

	fn assert_zero(attr: &BpfAttr, ranges: &[std::ops::Range<usize>]) {
		let b = bytes(attr);
		for range in ranges {
			for (i, byte) in b[range.clone()].iter().enumerate() {
				assert_eq!(*byte, 0, "byte {} not zero", range.start + i);
			}
		}
	}

	#[test]
	fn layout_matches_kernel_abi() {
		assert_eq!(offset_of!(MapElemAttr, map_fd), 0);
		assert_eq!(offset_of!(MapElemAttr, key), 8);
		assert_eq!(offset_of!(MapElemAttr, value), 16);
		assert_eq!(offset_of!(MapElemAttr, flags), 24);
		assert_eq!(mem::size_of::<MapElemAttr>(), 32);

		assert_eq!(mem::size_of::<MapCreateAttr>(), 20);

		assert_eq!(offset_of!(ObjAttr, pathname), 0);
		assert_eq!(offset_of!(ObjAttr, bpf_fd), 8);
		assert_eq!(offset_of!(ObjAttr, file_flags), 12);
		assert_eq!(mem::size_of::<ObjAttr>(), 16);

		assert_eq!(offset_of!(ProgAttachAttr, target_fd), 0);
		assert_eq!(offset_of!(ProgAttachAttr, attach_bpf_fd), 4);
		assert_eq!(offset_of!(ProgAttachAttr, attach_type), 8);
		assert_eq!(offset_of!(ProgAttachAttr, attach_flags), 12);
		assert_eq!(mem::size_of::<ProgAttachAttr>(), 16);

		// The union is as large as its widest variant
		assert_eq!(ATTR_SIZE, 32);
	}

	#[test]
	fn map_create_zeroes_everything_else() {
		let attr = BpfAttr::map_create(MapType::Hash, 4, 8, 16, MapFlags::empty());
		// Bytes past map_flags belong to no BPF_MAP_CREATE field
		assert_zero(&attr, &[20..ATTR_SIZE]);
	}

	#[test]
	fn map_lookup_leaves_flags_zero() {
		let key = [0u8; 4];
		let mut value = [0u8; 8];
		let attr = BpfAttr::map_lookup(3, key.as_ptr(), value.as_mut_ptr());
		// Padding after map_fd, and the flags field, stay zero
		assert_zero(&attr, &[4..8, 24..ATTR_SIZE]);
	}

	#[test]
	fn map_update_keeps_padding_zero() {
		let key = [0u8; 4];
		let value = [0u8; 8];
		let attr = BpfAttr::map_update(3, key.as_ptr(), value.as_ptr(), WriteMode::Exist);
		// Every field of the element shape is written; only the padding
		// after map_fd remains, and the kernel checks it is zero
		assert_zero(&attr, &[4..8]);
	}

	#[test]
	fn map_delete_touches_only_fd_and_key() {
		let key = [0u8; 4];
		let attr = BpfAttr::map_delete(3, key.as_ptr());
		assert_zero(&attr, &[4..8, 16..ATTR_SIZE]);
	}

	#[test]
	fn first_key_request_has_null_key() {
		let mut next = [0u8; 4];
		let attr = BpfAttr::map_next_key(3, ptr::null(), next.as_mut_ptr());
		// key slot (bytes 8..16) must be zero when asking for the first key
		assert_zero(&attr, &[4..16, 24..ATTR_SIZE]);
	}

	#[test]
	fn obj_get_leaves_fd_zero() {
		let path = c"/sys/fs/bpf/test";
		let attr = BpfAttr::obj_get(path.as_ptr(), OpenFlags::empty());
		// bpf_fd is not part of BPF_OBJ_GET
		assert_zero(&attr, &[8..12, 16..ATTR_SIZE]);
	}

	#[test]
	fn obj_pin_leaves_file_flags_zero() {
		let path = c"/sys/fs/bpf/test";
		let attr = BpfAttr::obj_pin(path.as_ptr(), 5);
		assert_zero(&attr, &[12..ATTR_SIZE]);
	}

	#[test]
	fn prog_detach_leaves_prog_fd_zero() {
		let attr = BpfAttr::prog_detach(AttachType::CgroupInetEgress, 7);
		assert_zero(&attr, &[4..8, 12..ATTR_SIZE]);
	}

	#[test]
	fn prog_attach_leaves_attach_flags_zero() {
		let attr = BpfAttr::prog_attach(AttachType::CgroupInetIngress, 5, 7);
		assert_zero(&attr, &[12..ATTR_SIZE]);
	}
}
