//! Numeric codes of the `fsevents` wire format, as published in the Darwin
//! `sys/fsevents.h` header.

/// Event type codes found in the first field of every record.
pub mod event_type {
    pub const FSE_INVALID: i32 = -1;
    pub const FSE_CREATE_FILE: i32 = 0;
    pub const FSE_DELETE: i32 = 1;
    pub const FSE_STAT_CHANGED: i32 = 2;
    pub const FSE_RENAME: i32 = 3;
    pub const FSE_CONTENT_MODIFIED: i32 = 4;
    pub const FSE_EXCHANGE: i32 = 5;
    pub const FSE_FINDER_INFO_CHANGED: i32 = 6;
    pub const FSE_CREATE_DIR: i32 = 7;
    pub const FSE_CHOWN: i32 = 8;
    pub const FSE_XATTR_MODIFIED: i32 = 9;
    pub const FSE_XATTR_REMOVED: i32 = 10;

    pub const FSE_MAX_EVENTS: usize = 11;

    /// Values of the per-type report table handed to the clone ioctl.
    pub const FSE_IGNORE: i8 = 0;
    pub const FSE_REPORT: i8 = 1;
}

/// Argument type codes, each followed by a 2 byte length and the payload.
/// `FSE_ARG_DONE` terminates the argument list and has no length field.
pub mod arg_type {
    pub const FSE_ARG_VNODE: u16 = 0x0001;
    pub const FSE_ARG_STRING: u16 = 0x0002;
    pub const FSE_ARG_PATH: u16 = 0x0003;
    pub const FSE_ARG_INT32: u16 = 0x0004;
    pub const FSE_ARG_INT64: u16 = 0x0005;
    pub const FSE_ARG_RAW: u16 = 0x0006;
    pub const FSE_ARG_INO: u16 = 0x0007;
    pub const FSE_ARG_UID: u16 = 0x0008;
    pub const FSE_ARG_DEV: u16 = 0x0009;
    pub const FSE_ARG_MODE: u16 = 0x000a;
    pub const FSE_ARG_GID: u16 = 0x000b;
    pub const FSE_ARG_DONE: u16 = 0xb33f;
}

/// File type bits of a `mode_t`.
pub mod mode {
    pub const S_IFMT: u32 = 0o170000;
    pub const S_IFIFO: u32 = 0o010000;
    pub const S_IFCHR: u32 = 0o020000;
    pub const S_IFDIR: u32 = 0o040000;
    pub const S_IFBLK: u32 = 0o060000;
    pub const S_IFREG: u32 = 0o100000;
    pub const S_IFLNK: u32 = 0o120000;
    pub const S_IFSOCK: u32 = 0o140000;
}
