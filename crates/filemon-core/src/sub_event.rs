//! Expansion of a [`RawEvent`] into the logical changes it describes.

use std::{ffi::OsStr, fmt};

use strum::IntoStaticStr;

use crate::event::{EventKind, RawEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum SubEventKind {
    #[strum(serialize = "ADD")]
    Add,
    #[strum(serialize = "DEL")]
    Delete,
    #[strum(serialize = "CHG")]
    Change,
}

impl SubEventKind {
    /// Three letter tag used by the terse output.
    pub fn tag(self) -> &'static str {
        self.into()
    }

    /// Sub-events produced by each kind, filled by position with the
    /// path-bearing arguments of the event.
    pub fn slots(kind: EventKind) -> &'static [SubEventKind] {
        use SubEventKind::*;

        match kind {
            EventKind::CreateFile | EventKind::CreateDir => &[Add],
            EventKind::Delete => &[Delete],
            EventKind::StatChanged | EventKind::FinderInfoChanged | EventKind::Chown => &[Change],
            EventKind::Exchange => &[Change, Change],
            EventKind::Rename => &[Delete, Add],
            EventKind::ContentModified | EventKind::Invalid | EventKind::Unrecognized(_) => &[],
        }
    }
}

impl fmt::Display for SubEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One logical change. The path is missing when the event carried fewer
/// path arguments than its kind has slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubEvent<'a> {
    pub kind: SubEventKind,
    pub path: Option<&'a OsStr>,
}

impl<'a> SubEvent<'a> {
    /// Expand `event`: at most two sub-events, extra paths are ignored.
    pub fn expand(event: &'a RawEvent) -> Vec<SubEvent<'a>> {
        let mut paths = event.paths();
        SubEventKind::slots(event.kind)
            .iter()
            .map(|&kind| SubEvent {
                kind,
                path: paths.next(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use fsevents_common::Pid;

    use super::*;
    use crate::event::Argument;

    fn event(kind: EventKind, paths: &[&str]) -> RawEvent {
        RawEvent {
            sequence: 1,
            kind,
            pid: Pid::from_raw(1),
            arguments: paths
                .iter()
                .map(|&path| Argument::String(path.into()))
                .collect(),
        }
    }

    fn expand(kind: EventKind, paths: &[&str]) -> Vec<(SubEventKind, Option<String>)> {
        SubEvent::expand(&event(kind, paths))
            .into_iter()
            .map(|sub| {
                let path = sub.path.map(|path| path.to_string_lossy().into_owned());
                (sub.kind, path)
            })
            .collect()
    }

    #[test]
    fn rename_is_delete_then_add() {
        assert_eq!(
            expand(EventKind::Rename, &["/old", "/new"]),
            vec![
                (SubEventKind::Delete, Some("/old".to_string())),
                (SubEventKind::Add, Some("/new".to_string())),
            ]
        );
    }

    #[test]
    fn exchange_changes_both_paths() {
        assert_eq!(
            expand(EventKind::Exchange, &["/a", "/b"]),
            vec![
                (SubEventKind::Change, Some("/a".to_string())),
                (SubEventKind::Change, Some("/b".to_string())),
            ]
        );
    }

    #[test]
    fn single_slot_kinds() {
        for kind in [EventKind::CreateFile, EventKind::CreateDir] {
            assert_eq!(
                expand(kind, &["/x", "/ignored"]),
                vec![(SubEventKind::Add, Some("/x".to_string()))]
            );
        }
        assert_eq!(
            expand(EventKind::Delete, &["/x"]),
            vec![(SubEventKind::Delete, Some("/x".to_string()))]
        );
        for kind in [
            EventKind::StatChanged,
            EventKind::FinderInfoChanged,
            EventKind::Chown,
        ] {
            assert_eq!(
                expand(kind, &["/x"]),
                vec![(SubEventKind::Change, Some("/x".to_string()))]
            );
        }
    }

    #[test]
    fn kinds_without_sub_events() {
        assert!(expand(EventKind::ContentModified, &["/x"]).is_empty());
        assert!(expand(EventKind::Invalid, &["/x"]).is_empty());
        assert!(expand(EventKind::Unrecognized(99), &["/x"]).is_empty());
    }

    #[test]
    fn missing_paths_leave_empty_slots() {
        assert_eq!(
            expand(EventKind::Rename, &["/old"]),
            vec![
                (SubEventKind::Delete, Some("/old".to_string())),
                (SubEventKind::Add, None),
            ]
        );
    }

    #[test]
    fn tags() {
        assert_eq!(SubEventKind::Add.tag(), "ADD");
        assert_eq!(SubEventKind::Delete.tag(), "DEL");
        assert_eq!(SubEventKind::Change.tag(), "CHG");
    }
}
