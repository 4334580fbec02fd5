//! Plumbing shared by the filemon crates for talking to the Darwin `fsevents`
//! facility: the numeric codes used on the wire, a bounds-checked cursor to
//! walk the packed records, acquisition of the cloned event descriptor and the
//! lookup of display names for processes, users and groups.

pub mod device;
pub mod kernel;
pub mod names;
pub mod parsing;

pub use device::{open_event_stream, DeviceError};
pub use names::{NameResolver, SystemNames};

pub use nix::unistd::{Gid, Pid, Uid};
