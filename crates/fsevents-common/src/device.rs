//! Acquisition of the kernel event stream.
//!
//! `/dev/fsevents` itself can't be read: a private descriptor is obtained with
//! the `FSEVENTS_CLONE` ioctl, telling the kernel which event types to report
//! and how deep its queue should be. The cloned descriptor is a plain
//! readable stream of packed event records.

use std::fs::File;

use thiserror::Error;

pub const FSEVENTS_DEVICE: &str = "/dev/fsevents";

/// Number of events the kernel buffers for us before dropping.
pub const DEFAULT_EVENT_QUEUE_DEPTH: i32 = 0x1000;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("opening {path}")]
    Open {
        path: &'static str,
        #[source]
        source: nix::Error,
    },
    #[error("cloning the {path} descriptor")]
    Clone {
        path: &'static str,
        #[source]
        source: nix::Error,
    },
    #[error("the fsevents device is not available on this platform")]
    Unsupported,
}

/// Open the event stream, asking for every type that maps to an
/// add, delete or change of a path. Extended attribute events are ignored.
#[cfg(target_os = "macos")]
pub fn open_event_stream(event_queue_depth: i32) -> Result<File, DeviceError> {
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

    use nix::{fcntl::OFlag, sys::stat::Mode};

    use crate::kernel::event_type::*;

    #[repr(C)]
    struct FseventCloneArgs {
        event_list: *mut i8,
        num_events: i32,
        event_queue_depth: i32,
        fd: *mut i32,
    }

    nix::ioctl_write_ptr!(fsevents_clone, b's', 1, FseventCloneArgs);

    let mut event_list = [FSE_REPORT; FSE_MAX_EVENTS];
    event_list[FSE_XATTR_MODIFIED as usize] = FSE_IGNORE;
    event_list[FSE_XATTR_REMOVED as usize] = FSE_IGNORE;

    let raw = nix::fcntl::open(FSEVENTS_DEVICE, OFlag::O_RDONLY, Mode::empty()).map_err(
        |source| DeviceError::Open {
            path: FSEVENTS_DEVICE,
            source,
        },
    )?;
    // Dropped, and so closed, once the clone is done.
    let device = unsafe { OwnedFd::from_raw_fd(raw) };

    let mut cloned_fd: i32 = -1;
    let args = FseventCloneArgs {
        event_list: event_list.as_mut_ptr(),
        num_events: event_list.len() as i32,
        event_queue_depth,
        fd: &mut cloned_fd,
    };
    unsafe { fsevents_clone(device.as_raw_fd(), &args) }.map_err(|source| {
        DeviceError::Clone {
            path: FSEVENTS_DEVICE,
            source,
        }
    })?;

    log::debug!("cloned {FSEVENTS_DEVICE} into fd {cloned_fd} (queue depth {event_queue_depth})");
    Ok(unsafe { File::from_raw_fd(cloned_fd) })
}

#[cfg(not(target_os = "macos"))]
pub fn open_event_stream(event_queue_depth: i32) -> Result<File, DeviceError> {
    log::debug!("{FSEVENTS_DEVICE} unavailable, queue depth {event_queue_depth} ignored");
    Err(DeviceError::Unsupported)
}
