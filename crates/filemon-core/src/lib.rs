//! Core model of the file monitor: decoding of the packed kernel records into
//! [`RawEvent`](event::RawEvent)s, their expansion into add/delete/change
//! [`SubEvent`](sub_event::SubEvent)s, the registry of watched paths and the
//! control commands mutating it.
//!
//! The registry and the event sequence counter live in a
//! [`MonitorContext`](context::MonitorContext) shared by the producer loop
//! and the control loop.

pub mod command;
pub mod config;
pub mod context;
pub mod decoder;
pub mod event;
pub mod sub_event;
pub mod watch;

pub use command::{Command, Control};
pub use context::{MonitorContext, MonitorState};
pub use decoder::{DecodeError, Decoder, PidWidth, SequenceCounter};
pub use event::{Argument, EventKind, RawEvent};
pub use sub_event::{SubEvent, SubEventKind};
pub use watch::WatchedPaths;
