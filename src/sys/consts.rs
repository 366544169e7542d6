//! Kernel-defined constants for the bpf(2) syscall
//!
//! Command numbers, map types, attach types and flag bits as defined by
//! the Linux UAPI (`linux/bpf.h`). The numeric values are ABI and must
//! match the kernel exactly.

use bitflags::bitflags;

/// Commands accepted by the bpf(2) syscall.
///
/// Only the map and object lifecycle commands get wrappers in this crate;
/// `ProgLoad` is listed to keep the discriminants contiguous with the
/// kernel's `enum bpf_cmd`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BpfCmd {
	MapCreate = 0,
	MapLookupElem = 1,
	MapUpdateElem = 2,
	MapDeleteElem = 3,
	MapGetNextKey = 4,
	ProgLoad = 5,
	ObjPin = 6,
	ObjGet = 7,
	ProgAttach = 8,
	ProgDetach = 9,
}

/// Kernel BPF map types (`enum bpf_map_type`)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapType {
	Unspec = 0,
	Hash = 1,
	Array = 2,
	ProgArray = 3,
	PerfEventArray = 4,
	PerCpuHash = 5,
	PerCpuArray = 6,
	StackTrace = 7,
	CgroupArray = 8,
	LruHash = 9,
	LruPerCpuHash = 10,
	LpmTrie = 11,
	ArrayOfMaps = 12,
	HashOfMaps = 13,
	DevMap = 14,
	SockMap = 15,
	CpuMap = 16,
}

/// Kernel attach points for BPF programs (`enum bpf_attach_type`).
///
/// The cgroup variants are the ones a networking stack attaches skb and
/// socket filters to.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachType {
	CgroupInetIngress = 0,
	CgroupInetEgress = 1,
	CgroupInetSockCreate = 2,
	CgroupSockOps = 3,
	SkSkbStreamParser = 4,
	SkSkbStreamVerdict = 5,
	CgroupDevice = 6,
}

/// Write modes for map updates (`BPF_ANY` / `BPF_NOEXIST` / `BPF_EXIST`)
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
	/// Create the entry or overwrite an existing one
	#[default]
	Any = 0,
	/// Create only; fails with EEXIST if the key is present
	NoExist = 1,
	/// Overwrite only; fails with ENOENT if the key is absent
	Exist = 2,
}

bitflags! {
	/// Flags for map creation (`BPF_F_*` map flags)
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct MapFlags: u32 {
		const NO_PREALLOC = 1;
		const NO_COMMON_LRU = 1 << 1;
		const NUMA_NODE = 1 << 2;
		const RDONLY = 1 << 3;
		const WRONLY = 1 << 4;
	}
}

bitflags! {
	/// Open flags for retrieving a pinned object (`BPF_F_RDONLY` /
	/// `BPF_F_WRONLY` in the `file_flags` attribute field)
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct OpenFlags: u32 {
		const RDONLY = 1 << 3;
		const WRONLY = 1 << 4;
	}
}
