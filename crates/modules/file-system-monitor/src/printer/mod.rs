//! Rendering of decoded events on the output stream.

use std::{io, io::Write, sync::Arc};

use filemon_core::{RawEvent, WatchedPaths, config::OutputFormat};
use fsevents_common::NameResolver;

mod terse;
mod xml;

pub use terse::TersePrinter;
pub use xml::{XmlPrinter, XmlWriter, escape};

/// Shown when the name of a process can't be found.
pub const UNKNOWN_PROCESS: &str = "???";

pub trait EventPrinter: Send + Sync {
    /// Write whatever `event` contributes to the output: nothing if it
    /// doesn't touch any of the `watched` paths.
    fn print(&self, event: &RawEvent, watched: &WatchedPaths, out: &mut dyn Write)
    -> io::Result<()>;
}

pub fn printer(format: OutputFormat, names: Arc<dyn NameResolver>) -> Box<dyn EventPrinter> {
    match format {
        OutputFormat::Terse => Box::new(TersePrinter::new(names)),
        OutputFormat::Xml => Box::new(XmlPrinter::new(names)),
    }
}

fn process_name(names: &dyn NameResolver, event: &RawEvent) -> String {
    names
        .process_name(event.pid)
        .unwrap_or_else(|| UNKNOWN_PROCESS.to_string())
}

#[cfg(test)]
pub(crate) mod test_utils {
    use fsevents_common::{Gid, NameResolver, Pid, Uid};

    /// Knows pid 100 as `touch`, uid 501 as `alice` and gid 20 as `staff`.
    pub struct FakeNames;

    impl NameResolver for FakeNames {
        fn process_name(&self, pid: Pid) -> Option<String> {
            (pid == Pid::from_raw(100)).then(|| "touch".to_string())
        }

        fn user_name(&self, uid: Uid) -> Option<String> {
            (uid == Uid::from_raw(501)).then(|| "alice".to_string())
        }

        fn group_name(&self, gid: Gid) -> Option<String> {
            (gid == Gid::from_raw(20)).then(|| "staff".to_string())
        }
    }
}
