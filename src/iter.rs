//! Map key enumeration
//!
//! The kernel exposes iteration as a "give me the key after this one"
//! command: start with no prior key, feed each returned key back in, and
//! stop when the kernel answers ENOENT. [`MapKeys`] wraps that protocol
//! as an iterator so the terminal ENOENT becomes `None` instead of an
//! error the caller has to special-case.

use std::os::fd::BorrowedFd;

use crate::error::Result;
use crate::sys::gateway::get_next_map_key;

/// Iterator over every key of a BPF map.
///
/// Visits each key exactly once provided the map is not mutated
/// concurrently; entries added or removed mid-iteration may be missed or
/// repeated, which is the kernel's documented behavior, not a bug here.
pub struct MapKeys<'fd> {
	map_fd: BorrowedFd<'fd>,
	key_size: usize,
	prev: Option<Vec<u8>>,
	done: bool,
}

impl<'fd> MapKeys<'fd> {
	/// Begin enumerating the keys of `map_fd`.
	///
	/// # Safety
	///
	/// `key_size` must equal the map's configured key size: every step
	/// has the kernel write a full key into a buffer of this length.
	#[must_use]
	pub unsafe fn new(map_fd: BorrowedFd<'fd>, key_size: usize) -> Self {
		Self {
			map_fd,
			key_size,
			prev: None,
			done: false,
		}
	}
}

impl Iterator for MapKeys<'_> {
	type Item = Result<Vec<u8>>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}

		let mut next = vec![0u8; self.key_size];
		// SAFETY: the buffer length is the key size asserted at
		// construction, and prev (when set) came from the kernel at that
		// same size.
		let res = unsafe { get_next_map_key(self.map_fd, self.prev.as_deref(), &mut next) };
		match res {
			Ok(()) => {
				self.prev = Some(next.clone());
				Some(Ok(next))
			},
			Err(err) if err.is_not_found() => {
				// Terminal signal: the previous key was the last one
				self.done = true;
				None
			},
			Err(err) => {
				self.done = true;
				Some(Err(err))
			},
		}
	}
}
