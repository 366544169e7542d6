//! bpfsys - a safe gateway to the Linux bpf(2) syscall
//!
//! This crate wraps the kernel's multiplexed `bpf(2)` syscall with one
//! thin, allocation-free function per command: creating maps, reading,
//! writing, deleting and enumerating map entries, pinning objects into
//! the BPF pseudo-filesystem and retrieving them, and attaching or
//! detaching programs at cgroup hooks.
//!
//! Every created or retrieved object comes back as an owned file
//! descriptor (`std::os::fd::OwnedFd`), so "no handle produced" is an
//! `Err`, never a junk descriptor, and release happens exactly once when
//! the owner drops it. Each call is a single stateless syscall: nothing
//! is cached, pooled or retried, and failures carry the kernel's errno
//! verbatim.
//!
//! # Getting started
//!
//! ```no_run
//! use std::os::fd::AsFd;
//!
//! use bpfsys::{BpfLevel, MapFlags, MapType, WriteMode};
//!
//! fn main() -> bpfsys::Result<()> {
//!     if bpfsys::bpf_support_level() == BpfLevel::None {
//!         return Ok(());
//!     }
//!
//!     let map = bpfsys::create_map(MapType::Hash, 4, 8, 64, MapFlags::empty())?;
//!
//!     let key = 1u32.to_ne_bytes();
//!     let value = 99u64.to_ne_bytes();
//!     // SAFETY: key and value match the sizes the map was created with
//!     unsafe { bpfsys::write_map_entry(map.as_fd(), &key, &value, WriteMode::Any)? };
//!
//!     let mut out = [0u8; 8];
//!     unsafe { bpfsys::find_map_entry(map.as_fd(), &key, &mut out)? };
//!     assert_eq!(out, value);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod iter;
pub mod logging;
pub mod support;
pub mod sys;

pub use error::{BpfError, Result};
pub use iter::MapKeys;
pub use support::{BpfLevel, NONEXISTENT_COOKIE, bpf_support_level, socket_cookie, synchronize_kernel_rcu};
pub use sys::consts::{AttachType, BpfCmd, MapFlags, MapType, OpenFlags, WriteMode};
pub use sys::gateway::{
	attach_program, create_map, delete_map_entry, detach_program, find_map_entry, get_first_map_key,
	get_next_map_key, pin_object, retrieve_object, write_map_entry,
};
