//! Control channel protocol.
//!
//! One command per line:
//!
//! - `add:<path>` starts watching a path
//! - `del:<path>` stops watching it
//! - `clr` stops watching everything
//! - `die` terminates the process
//!
//! Anything else is ignored, and nothing is ever sent back. Lines are bytes:
//! paths are taken as they are, whatever their encoding.

use std::{
    ffi::{OsStr, OsString},
    os::unix::ffi::OsStrExt,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(OsString),
    Remove(OsString),
    Clear,
    Die,
}

/// What the control loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Terminate,
}

impl Command {
    /// Parse a line, already stripped of its newline. Returns `None` for
    /// lines that aren't commands.
    pub fn parse(line: &[u8]) -> Option<Self> {
        let path = |path: &[u8]| OsStr::from_bytes(path).to_os_string();
        if let Some(rest) = line.strip_prefix(b"add:") {
            Some(Command::Add(path(rest)))
        } else if let Some(rest) = line.strip_prefix(b"del:") {
            Some(Command::Remove(path(rest)))
        } else {
            match line {
                b"clr" => Some(Command::Clear),
                b"die" => Some(Command::Die),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_commands() {
        assert_eq!(
            Command::parse(b"add:/tmp/x/"),
            Some(Command::Add("/tmp/x/".into()))
        );
        assert_eq!(
            Command::parse(b"del:/tmp/x"),
            Some(Command::Remove("/tmp/x".into()))
        );
        assert_eq!(Command::parse(b"clr"), Some(Command::Clear));
        assert_eq!(Command::parse(b"die"), Some(Command::Die));
    }

    #[test]
    fn other_lines_are_ignored() {
        assert_eq!(Command::parse(b""), None);
        assert_eq!(Command::parse(b"clr "), None);
        assert_eq!(Command::parse(b"DIE"), None);
        assert_eq!(Command::parse(b"add/tmp"), None);
        assert_eq!(Command::parse(b"rm:/tmp"), None);
    }

    #[test]
    fn paths_keep_colons() {
        assert_eq!(
            Command::parse(b"add:/a:b"),
            Some(Command::Add("/a:b".into()))
        );
    }

    #[test]
    fn paths_keep_raw_bytes() {
        assert_eq!(
            Command::parse(b"del:/caf\xe9"),
            Some(Command::Remove(OsStr::from_bytes(b"/caf\xe9").to_os_string()))
        );
    }
}
