//! Decoding of the buffers read from the kernel event stream.
//!
//! A buffer contains zero or more records back to back, without padding:
//!
//! ```text
//! event type: 4 bytes
//! pid:        PidWidth bytes
//! argument:   type (2 bytes), length (2 bytes), payload (length bytes)
//! ...
//! last:       type FSE_ARG_DONE (2 bytes), no length
//! ```
//!
//! All fields are in native byte order.

use std::{ffi::OsStr, mem::size_of, os::unix::ffi::OsStrExt, str::FromStr};

use fsevents_common::{
    kernel::arg_type::*,
    parsing::{nul_terminated, ByteCursor, CursorError},
    Gid, Pid, Uid,
};
use thiserror::Error;

use crate::event::{Argument, Device, EventKind, FileMode, RawEvent};

/// A record running past the end of its buffer. Anything else the kernel
/// sends is decoded somehow, if only as an [`Argument::Unknown`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("event #{sequence} is truncated")]
    Truncated {
        sequence: u64,
        #[source]
        source: CursorError,
    },
}

/// Width of the pid field of a record, which follows the `pid_t` of the
/// kernel producing the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidWidth {
    Four,
    Eight,
}

impl PidWidth {
    pub const NATIVE: PidWidth = if size_of::<nix::libc::pid_t>() == 8 {
        PidWidth::Eight
    } else {
        PidWidth::Four
    };

    pub fn bytes(self) -> usize {
        match self {
            PidWidth::Four => 4,
            PidWidth::Eight => 8,
        }
    }
}

impl Default for PidWidth {
    fn default() -> Self {
        Self::NATIVE
    }
}

impl FromStr for PidWidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "4" => Ok(PidWidth::Four),
            "8" => Ok(PidWidth::Eight),
            other => Err(format!("pid width must be 4 or 8, not {other}")),
        }
    }
}

/// Monotonic count of the records decoded since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceCounter(u64);

impl SequenceCounter {
    /// Number of records seen so far.
    pub fn current(&self) -> u64 {
        self.0
    }

    fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

/// Pid given to records whose pid doesn't fit a `pid_t`.
pub const UNKNOWN_PID: i32 = -1;

#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    pid_width: PidWidth,
}

impl Decoder {
    pub fn new(pid_width: PidWidth) -> Self {
        Self { pid_width }
    }

    /// Iterate over the records of `buffer`, numbering them with `counter`.
    ///
    /// The iteration stops after the first error: what follows a malformed
    /// record can't be located.
    pub fn records<'a>(
        &self,
        buffer: &'a [u8],
        counter: &'a mut SequenceCounter,
    ) -> Records<'a> {
        Records {
            cursor: ByteCursor::new(buffer),
            pid_width: self.pid_width,
            counter,
            failed: false,
        }
    }
}

pub struct Records<'a> {
    cursor: ByteCursor<'a>,
    pid_width: PidWidth,
    counter: &'a mut SequenceCounter,
    failed: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<RawEvent, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_empty() {
            return None;
        }
        // Numbered before parsing, so malformed records are counted too.
        let sequence = self.counter.advance();
        let record = decode_record(&mut self.cursor, self.pid_width, sequence);
        self.failed = record.is_err();
        Some(record)
    }
}

fn decode_record(
    cursor: &mut ByteCursor<'_>,
    pid_width: PidWidth,
    sequence: u64,
) -> Result<RawEvent, DecodeError> {
    let truncated = |source| DecodeError::Truncated { sequence, source };

    let kind = EventKind::from_raw(cursor.read_i32().map_err(truncated)?);
    let pid = match pid_width {
        PidWidth::Four => cursor.read_i32().map_err(truncated)?,
        PidWidth::Eight => {
            let pid = cursor.read_i64().map_err(truncated)?;
            i32::try_from(pid).unwrap_or_else(|_| {
                log::warn!("event #{sequence}: pid {pid} out of range");
                UNKNOWN_PID
            })
        }
    };

    let mut arguments = Vec::new();
    loop {
        let code = cursor.read_u16().map_err(truncated)?;
        if code == FSE_ARG_DONE {
            break;
        }
        let len = cursor.read_u16().map_err(truncated)?;
        let payload = cursor.take(len as usize).map_err(truncated)?;
        arguments.push(decode_argument(code, payload).unwrap_or_else(|| {
            log::debug!("event #{sequence}: argument 0x{code:x} is too short ({len} bytes)");
            Argument::Unknown { code, len }
        }));
    }

    Ok(RawEvent {
        sequence,
        kind,
        pid: Pid::from_raw(pid),
        arguments,
    })
}

/// Returns `None` when the payload is shorter than the fixed width of a
/// numeric argument.
fn decode_argument(code: u16, payload: &[u8]) -> Option<Argument> {
    let mut value = ByteCursor::new(payload);
    let path = || OsStr::from_bytes(nul_terminated(payload)).to_os_string();
    let argument = match code {
        FSE_ARG_VNODE => Argument::Vnode(path()),
        FSE_ARG_STRING => Argument::String(path()),
        FSE_ARG_PATH => Argument::Path(path()),
        FSE_ARG_INT32 => Argument::Int32(value.read_i32().ok()?),
        FSE_ARG_INT64 => Argument::Int64(value.read_i64().ok()?),
        FSE_ARG_RAW => Argument::Raw {
            len: payload.len() as u16,
        },
        FSE_ARG_INO => Argument::Inode(value.read_u64().ok()?),
        FSE_ARG_UID => Argument::Uid(Uid::from_raw(value.read_u32().ok()?)),
        FSE_ARG_GID => Argument::Gid(Gid::from_raw(value.read_u32().ok()?)),
        FSE_ARG_DEV => Argument::Device(Device::from_raw(value.read_u32().ok()?)),
        FSE_ARG_MODE => Argument::Mode(FileMode::from_raw(value.read_u32().ok()?)),
        code => Argument::Unknown {
            code,
            len: payload.len() as u16,
        },
    };
    Some(argument)
}

/// Builder of synthetic kernel buffers.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use super::*;

    #[derive(Default)]
    pub struct RecordBuilder {
        buffer: Vec<u8>,
    }

    impl RecordBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        /// Start a new record. Arguments added later belong to it.
        pub fn event(mut self, code: i32, pid: i32) -> Self {
            self.buffer.extend_from_slice(&code.to_ne_bytes());
            match PidWidth::NATIVE {
                PidWidth::Four => self.buffer.extend_from_slice(&pid.to_ne_bytes()),
                PidWidth::Eight => self.buffer.extend_from_slice(&(pid as i64).to_ne_bytes()),
            }
            self
        }

        pub fn arg(mut self, code: u16, payload: &[u8]) -> Self {
            self.buffer.extend_from_slice(&code.to_ne_bytes());
            self.buffer
                .extend_from_slice(&(payload.len() as u16).to_ne_bytes());
            self.buffer.extend_from_slice(payload);
            self
        }

        /// A zero terminated path argument.
        pub fn path(self, code: u16, path: &str) -> Self {
            let mut payload = path.as_bytes().to_vec();
            payload.push(0);
            self.arg(code, &payload)
        }

        pub fn done(mut self) -> Self {
            self.buffer.extend_from_slice(&FSE_ARG_DONE.to_ne_bytes());
            self
        }

        pub fn build(self) -> Vec<u8> {
            self.buffer
        }
    }
}
