use std::{
    io::{self, Write},
    os::unix::ffi::OsStrExt,
    sync::Arc,
};

use filemon_core::{RawEvent, SubEvent, WatchedPaths};
use fsevents_common::NameResolver;

use super::{EventPrinter, process_name};

/// Prints one line per sub-event on a watched path:
///
/// ```text
/// ADD:/tmp/x - pid 123 (touch)
/// ```
///
/// Paths are written as the raw bytes received from the kernel.
pub struct TersePrinter {
    names: Arc<dyn NameResolver>,
}

impl TersePrinter {
    pub fn new(names: Arc<dyn NameResolver>) -> Self {
        Self { names }
    }
}

impl EventPrinter for TersePrinter {
    fn print(
        &self,
        event: &RawEvent,
        watched: &WatchedPaths,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        let mut name = None;
        for sub_event in SubEvent::expand(event) {
            let Some(path) = sub_event.path else {
                continue;
            };
            if !watched.is_watched(path) {
                continue;
            }
            let name = name.get_or_insert_with(|| process_name(self.names.as_ref(), event));
            write!(out, "{}:", sub_event.kind)?;
            out.write_all(path.as_bytes())?;
            writeln!(out, " - pid {} ({})", event.pid, name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use filemon_core::{Argument, EventKind};
    use fsevents_common::Pid;

    use super::*;
    use crate::printer::test_utils::FakeNames;

    fn render_bytes(event: &RawEvent, watched: &[&OsStr]) -> Vec<u8> {
        let mut paths = WatchedPaths::new();
        for path in watched {
            paths.add(path);
        }
        let mut out = Vec::new();
        TersePrinter::new(Arc::new(FakeNames))
            .print(event, &paths, &mut out)
            .unwrap();
        out
    }

    fn render(event: &RawEvent, watched: &[&str]) -> String {
        let watched: Vec<&OsStr> = watched.iter().map(OsStr::new).collect();
        String::from_utf8(render_bytes(event, &watched)).unwrap()
    }

    fn event(kind: EventKind, pid: i32, paths: &[&str]) -> RawEvent {
        RawEvent {
            sequence: 1,
            kind,
            pid: Pid::from_raw(pid),
            arguments: paths
                .iter()
                .map(|&path| Argument::Vnode(path.into()))
                .collect(),
        }
    }

    #[test]
    fn watched_create_prints_one_line() {
        let created = event(EventKind::CreateFile, 100, &["/tmp/x"]);
        assert_eq!(render(&created, &["/tmp/x"]), "ADD:/tmp/x - pid 100 (touch)\n");
    }

    #[test]
    fn unwatched_create_prints_nothing() {
        let created = event(EventKind::CreateFile, 100, &["/tmp/y"]);
        assert_eq!(render(&created, &["/tmp/x"]), "");
    }

    #[test]
    fn rename_prints_only_watched_side() {
        let renamed = event(EventKind::Rename, 100, &["/elsewhere/a", "/tmp/x/a"]);
        assert_eq!(render(&renamed, &["/tmp/x"]), "ADD:/tmp/x/a - pid 100 (touch)\n");

        let renamed = event(EventKind::Rename, 100, &["/tmp/x/a", "/tmp/x/b"]);
        assert_eq!(
            render(&renamed, &["/tmp/x"]),
            "DEL:/tmp/x/a - pid 100 (touch)\nADD:/tmp/x/b - pid 100 (touch)\n"
        );
    }

    #[test]
    fn exchange_and_change_tags() {
        let exchanged = event(EventKind::Exchange, 100, &["/w/a", "/w/b"]);
        assert_eq!(
            render(&exchanged, &["/w"]),
            "CHG:/w/a - pid 100 (touch)\nCHG:/w/b - pid 100 (touch)\n"
        );
        let deleted = event(EventKind::Delete, 100, &["/w/a"]);
        assert_eq!(render(&deleted, &["/w"]), "DEL:/w/a - pid 100 (touch)\n");
    }

    #[test]
    fn unknown_process_placeholder() {
        let chown = event(EventKind::Chown, 7, &["/w/a"]);
        assert_eq!(render(&chown, &["/w"]), "CHG:/w/a - pid 7 (???)\n");
    }

    #[test]
    fn kinds_without_sub_events_are_silent() {
        let modified = event(EventKind::ContentModified, 100, &["/w/a"]);
        assert_eq!(render(&modified, &["/w"]), "");
        let invalid = event(EventKind::Invalid, 100, &["/w/a"]);
        assert_eq!(render(&invalid, &["/w"]), "");
    }

    #[test]
    fn missing_path_is_dropped() {
        let created = event(EventKind::CreateFile, 100, &[]);
        assert_eq!(render(&created, &["/"]), "");
    }

    #[test]
    fn raw_path_bytes_are_matched_and_printed_verbatim() {
        let watched = OsStr::from_bytes(b"/caf\xe9");
        let mut created = event(EventKind::CreateFile, 100, &[]);
        created
            .arguments
            .push(Argument::Vnode(OsStr::from_bytes(b"/caf\xe8").into()));
        assert_eq!(render_bytes(&created, &[watched]), b"");

        created.arguments[0] = Argument::Vnode(OsStr::from_bytes(b"/caf\xe9/menu").into());
        assert_eq!(
            render_bytes(&created, &[watched]),
            b"ADD:/caf\xe9/menu - pid 100 (touch)\n"
        );
    }
}
