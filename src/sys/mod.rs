//! The bpf(2) syscall surface
//!
//! `consts` carries the kernel's command/type/flag vocabulary, `attr`
//! builds the zero-initialized attribute record, and `gateway` issues the
//! syscalls. The attribute layout is kernel ABI; everything here must
//! match `linux/bpf.h` byte for byte.

pub(crate) mod attr;
pub mod consts;
pub mod gateway;

pub use consts::{AttachType, BpfCmd, MapFlags, MapType, OpenFlags, WriteMode};
pub use gateway::{
	attach_program, create_map, delete_map_entry, detach_program, find_map_entry, get_first_map_key,
	get_next_map_key, pin_object, retrieve_object, write_map_entry,
};
