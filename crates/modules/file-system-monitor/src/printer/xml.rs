use std::{
    borrow::Cow,
    fmt::Display,
    io::{self, Write},
    os::unix::ffi::OsStrExt,
    sync::Arc,
};

use filemon_core::{Argument, RawEvent, WatchedPaths};
use fsevents_common::{NameResolver, kernel::arg_type::FSE_ARG_DONE};

use super::{EventPrinter, process_name};

/// Indented XML writer, one element per line. Text content is bytes, since
/// paths needn't be utf8.
#[derive(Debug, Default)]
pub struct XmlWriter {
    out: Vec<u8>,
    tags: Vec<&'static str>,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `tag`: following elements are nested inside it.
    pub fn push_tag(&mut self, tag: &'static str) {
        self.indent();
        self.line(&[b"<", tag.as_bytes(), b">"]);
        self.tags.push(tag);
    }

    /// Close the innermost open tag, if any.
    pub fn pop_tag(&mut self) {
        if let Some(tag) = self.tags.pop() {
            self.indent();
            self.line(&[b"</", tag.as_bytes(), b">"]);
        }
    }

    /// Element holding `text`, escaped.
    pub fn add_text(&mut self, tag: &str, text: &[u8]) {
        self.element(tag, &escape(text));
    }

    /// Element holding `value` verbatim.
    pub fn add_value(&mut self, tag: &str, value: impl Display) {
        self.element(tag, value.to_string().as_bytes());
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }

    fn element(&mut self, tag: &str, content: &[u8]) {
        self.indent();
        let tag = tag.as_bytes();
        self.line(&[b"<", tag, b">", content, b"</", tag, b">"]);
    }

    fn line(&mut self, parts: &[&[u8]]) {
        for part in parts {
            self.out.extend_from_slice(part);
        }
        self.out.push(b'\n');
    }

    fn indent(&mut self) {
        for _ in 0..self.tags.len() {
            self.out.extend_from_slice(b"  ");
        }
    }
}

/// Escape the XML markup characters of `text`. Every `&` is escaped, so
/// existing entities are not preserved: `&lt;` becomes `&amp;lt;`.
pub fn escape(text: &[u8]) -> Cow<'_, [u8]> {
    if !text.iter().any(|c| matches!(c, b'&' | b'<' | b'>')) {
        return Cow::Borrowed(text);
    }
    let mut escaped = Vec::with_capacity(text.len() + 8);
    for &c in text {
        match c {
            b'&' => escaped.extend_from_slice(b"&amp;"),
            b'<' => escaped.extend_from_slice(b"&lt;"),
            b'>' => escaped.extend_from_slice(b"&gt;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Prints a whole fragment for every event with at least one argument on a
/// watched path.
pub struct XmlPrinter {
    names: Arc<dyn NameResolver>,
}

impl XmlPrinter {
    pub fn new(names: Arc<dyn NameResolver>) -> Self {
        Self { names }
    }

    pub fn render(&self, event: &RawEvent) -> Vec<u8> {
        let mut xml = XmlWriter::new();
        self.write_event(&mut xml, event);
        xml.into_bytes()
    }

    fn write_event(&self, xml: &mut XmlWriter, event: &RawEvent) {
        xml.push_tag(event.kind.name());
        xml.add_value("eventNumber", event.sequence);

        xml.push_tag("process");
        xml.add_value("id", event.pid);
        xml.add_text("name", process_name(self.names.as_ref(), event).as_bytes());
        xml.pop_tag();

        for argument in &event.arguments {
            self.write_argument(xml, argument);
        }

        xml.add_value("done", format_args!("0x{FSE_ARG_DONE:x}"));
        xml.pop_tag();
    }

    fn write_argument(&self, xml: &mut XmlWriter, argument: &Argument) {
        match argument {
            Argument::Vnode(path) => xml.add_text("vnode", path.as_bytes()),
            Argument::String(path) => xml.add_text("string", path.as_bytes()),
            Argument::Path(path) => xml.add_text("path", path.as_bytes()),
            Argument::Int32(value) => xml.add_value("int32", value),
            Argument::Int64(value) => xml.add_value("int64", value),
            Argument::Raw { len } => {
                xml.push_tag("raw");
                xml.add_value("length", len);
                xml.pop_tag();
            }
            Argument::Inode(inode) => xml.add_value("inode", inode),
            Argument::Uid(uid) => {
                xml.push_tag("uid");
                xml.add_value("int", uid);
                let name = self.names.user_name(*uid).unwrap_or_default();
                xml.add_text("name", name.as_bytes());
                xml.pop_tag();
            }
            Argument::Gid(gid) => {
                xml.push_tag("gid");
                xml.add_value("int", gid);
                let name = self.names.group_name(*gid).unwrap_or_default();
                xml.add_text("name", name.as_bytes());
                xml.pop_tag();
            }
            Argument::Device(device) => {
                xml.push_tag("device");
                xml.add_value("value", format_args!("0x{:08x}", device.as_raw()));
                xml.add_value("major", device.major());
                xml.add_value("minor", device.minor());
                xml.pop_tag();
            }
            Argument::Mode(mode) => {
                xml.push_tag("mode");
                xml.add_value("int", format_args!("0x{:x}", mode.as_raw()));
                xml.add_value("vnode-type", mode.node_type().label());
                xml.add_value("str", mode.permissions());
                xml.pop_tag();
            }
            Argument::Unknown { len, .. } => xml.add_value("unknown-arg", len),
        }
    }
}

impl EventPrinter for XmlPrinter {
    fn print(
        &self,
        event: &RawEvent,
        watched: &WatchedPaths,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        // Checked on every path, not only the first match, so each one is traced.
        let matched = event
            .paths()
            .fold(false, |matched, path| watched.is_watched(path) | matched);
        if !matched {
            return Ok(());
        }
        out.write_all(&self.render(event))
    }
}
