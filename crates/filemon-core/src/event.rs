use std::{
    ffi::{OsStr, OsString},
    fmt,
};

use fsevents_common::{
    kernel::{event_type::*, mode::*},
    Gid, Pid, Uid,
};
use strum::IntoStaticStr;

/// One record decoded from the kernel stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Position of this record among all the records ever decoded, from 1
    pub sequence: u64,
    pub kind: EventKind,
    pub pid: Pid,
    pub arguments: Vec<Argument>,
}

impl RawEvent {
    /// Path-bearing arguments, in arrival order.
    pub fn paths(&self) -> impl Iterator<Item = &OsStr> + '_ {
        self.arguments.iter().filter_map(Argument::path)
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} pid {} [", self.sequence, self.kind, self.pid)?;
        for (index, argument) in self.arguments.iter().enumerate() {
            if index != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{argument}")?;
        }
        write!(f, "]")
    }
}

/// Kernel event types. The serialized name is the XML root tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum EventKind {
    CreateFile,
    Delete,
    StatChanged,
    Rename,
    ContentModified,
    Exchange,
    FinderInfoChanged,
    CreateDir,
    Chown,
    Invalid,
    /// A code this program doesn't know about, rendered like `Invalid`.
    #[strum(serialize = "invalid")]
    Unrecognized(i32),
}

impl EventKind {
    pub fn from_raw(code: i32) -> Self {
        match code {
            FSE_CREATE_FILE => Self::CreateFile,
            FSE_DELETE => Self::Delete,
            FSE_STAT_CHANGED => Self::StatChanged,
            FSE_RENAME => Self::Rename,
            FSE_CONTENT_MODIFIED => Self::ContentModified,
            FSE_EXCHANGE => Self::Exchange,
            FSE_FINDER_INFO_CHANGED => Self::FinderInfoChanged,
            FSE_CREATE_DIR => Self::CreateDir,
            FSE_CHOWN => Self::Chown,
            FSE_INVALID => Self::Invalid,
            other => Self::Unrecognized(other),
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Unrecognized(code) => write!(f, "invalid({code})"),
            kind => f.write_str(kind.name()),
        }
    }
}

/// A typed argument of a [`RawEvent`]. Paths are kept as the raw bytes sent
/// by the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Vnode(OsString),
    String(OsString),
    Path(OsString),
    Int32(i32),
    Int64(i64),
    /// Opaque payload, only its length is kept
    Raw { len: u16 },
    Inode(u64),
    Uid(Uid),
    Gid(Gid),
    Device(Device),
    Mode(FileMode),
    /// Argument type this program doesn't know how to decode
    Unknown { code: u16, len: u16 },
}

impl Argument {
    /// The path carried by path-bearing variants.
    pub fn path(&self) -> Option<&OsStr> {
        match self {
            Argument::Vnode(path) | Argument::String(path) | Argument::Path(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Vnode(path) => write!(f, "vnode {}", path.to_string_lossy()),
            Argument::String(path) => write!(f, "string {}", path.to_string_lossy()),
            Argument::Path(path) => write!(f, "path {}", path.to_string_lossy()),
            Argument::Int32(value) => write!(f, "int32 {value}"),
            Argument::Int64(value) => write!(f, "int64 {value}"),
            Argument::Raw { len } => write!(f, "raw ({len} bytes)"),
            Argument::Inode(inode) => write!(f, "inode {inode}"),
            Argument::Uid(uid) => write!(f, "uid {uid}"),
            Argument::Gid(gid) => write!(f, "gid {gid}"),
            Argument::Device(device) => write!(f, "device {device}"),
            Argument::Mode(mode) => write!(f, "mode {mode}"),
            Argument::Unknown { code, len } => write!(f, "unknown 0x{code:x} ({len} bytes)"),
        }
    }
}

/// A `dev_t`: 8 bits of major number, 24 of minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Device(u32);

impl Device {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u32 {
        self.0
    }

    pub fn major(self) -> u32 {
        (self.0 >> 24) & 0xff
    }

    pub fn minor(self) -> u32 {
        self.0 & 0xff_ffff
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.major(), self.minor())
    }
}

/// Node type encoded in the high bits of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum NodeType {
    #[strum(serialize = "VFIFO")]
    Fifo,
    #[strum(serialize = "VCHR")]
    CharDevice,
    #[strum(serialize = "VDIR")]
    Directory,
    #[strum(serialize = "VBLK")]
    BlockDevice,
    #[strum(serialize = "VLNK")]
    Symlink,
    #[strum(serialize = "VSOCK")]
    Socket,
    #[strum(serialize = "VREG")]
    Regular,
}

impl NodeType {
    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Leading character of an `ls -l` line.
    fn symbol(self) -> char {
        match self {
            NodeType::Fifo => 'p',
            NodeType::CharDevice => 'c',
            NodeType::Directory => 'd',
            NodeType::BlockDevice => 'b',
            NodeType::Symlink => 'l',
            NodeType::Socket => 's',
            NodeType::Regular => '-',
        }
    }
}

/// A `mode_t` as reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMode(u32);

impl FileMode {
    const PERMISSIONS: [(u32, char); 9] = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Anything not recognized as a special node is a regular file.
    pub fn node_type(self) -> NodeType {
        match self.0 & S_IFMT {
            S_IFIFO => NodeType::Fifo,
            S_IFCHR => NodeType::CharDevice,
            S_IFDIR => NodeType::Directory,
            S_IFBLK => NodeType::BlockDevice,
            S_IFLNK => NodeType::Symlink,
            S_IFSOCK => NodeType::Socket,
            _ => NodeType::Regular,
        }
    }

    /// 10 character `ls` style string, eg. `drwxr-xr-x`.
    pub fn permissions(self) -> String {
        std::iter::once(self.node_type().symbol())
            .chain(
                Self::PERMISSIONS
                    .iter()
                    .map(|&(bit, c)| if self.0 & bit != 0 { c } else { '-' }),
            )
            .collect()
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.permissions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_xml_tags() {
        assert_eq!(EventKind::CreateFile.name(), "create-file");
        assert_eq!(EventKind::FinderInfoChanged.name(), "finder-info-changed");
        assert_eq!(EventKind::ContentModified.name(), "content-modified");
        assert_eq!(EventKind::Invalid.name(), "invalid");
        assert_eq!(EventKind::Unrecognized(42).name(), "invalid");
    }

    #[test]
    fn kind_from_raw_code() {
        assert_eq!(EventKind::from_raw(FSE_RENAME), EventKind::Rename);
        assert_eq!(EventKind::from_raw(FSE_CHOWN), EventKind::Chown);
        assert_eq!(EventKind::from_raw(-1), EventKind::Invalid);
        assert_eq!(
            EventKind::from_raw(FSE_XATTR_MODIFIED),
            EventKind::Unrecognized(FSE_XATTR_MODIFIED)
        );
    }

    #[test]
    fn device_numbers() {
        let device = Device::from_raw(0x0100_0004);
        assert_eq!(device.major(), 1);
        assert_eq!(device.minor(), 4);
        assert_eq!(Device::from_raw(0xffff_ffff).major(), 0xff);
        assert_eq!(Device::from_raw(0xffff_ffff).minor(), 0xff_ffff);
    }

    #[test]
    fn mode_strings() {
        let dir = FileMode::from_raw(S_IFDIR | 0o755);
        assert_eq!(dir.node_type(), NodeType::Directory);
        assert_eq!(dir.node_type().label(), "VDIR");
        assert_eq!(dir.permissions(), "drwxr-xr-x");

        let file = FileMode::from_raw(S_IFREG | 0o640);
        assert_eq!(file.node_type().label(), "VREG");
        assert_eq!(file.permissions(), "-rw-r-----");

        let link = FileMode::from_raw(S_IFLNK | 0o777);
        assert_eq!(link.permissions(), "lrwxrwxrwx");
        assert_eq!(FileMode::from_raw(S_IFSOCK).node_type().label(), "VSOCK");
        assert_eq!(FileMode::from_raw(S_IFIFO).permissions(), "p---------");
    }

    #[test]
    fn paths_skip_other_arguments() {
        let event = RawEvent {
            sequence: 1,
            kind: EventKind::Rename,
            pid: Pid::from_raw(10),
            arguments: vec![
                Argument::Vnode("/a".into()),
                Argument::Int32(3),
                Argument::String("/b".into()),
                Argument::Path("/c".into()),
            ],
        };
        assert_eq!(event.paths().collect::<Vec<_>>(), vec!["/a", "/b", "/c"]);
    }
}
