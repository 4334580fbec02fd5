//! The producer side of the monitor: read the kernel event stream, decode it,
//! match it against the watched paths and print what matched.

use std::{
    convert::Infallible,
    io::{self, Read, Write},
};

use bytes::BytesMut;
use filemon_core::{DecodeError, Decoder, MonitorContext};
use thiserror::Error;

pub mod printer;

use printer::EventPrinter;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("reading the event stream")]
    Read(#[source] io::Error),
    #[error("the event stream was closed")]
    StreamClosed,
    #[error("decoding the event stream")]
    Decode(#[from] DecodeError),
    #[error("writing events")]
    Output(#[source] io::Error),
}

pub struct FileSystemMonitor {
    ctx: MonitorContext,
    decoder: Decoder,
    printer: Box<dyn EventPrinter>,
}

impl FileSystemMonitor {
    pub fn new(ctx: MonitorContext, decoder: Decoder, printer: Box<dyn EventPrinter>) -> Self {
        Self {
            ctx,
            decoder,
            printer,
        }
    }

    /// Decode and print every record of `buffer`.
    ///
    /// The shared state stays locked for the whole batch, so commands take
    /// effect between two reads and never in the middle of one.
    pub fn process_batch(&self, buffer: &[u8], out: &mut dyn Write) -> Result<(), MonitorError> {
        let mut state = self.ctx.lock();
        let (watched, sequence) = state.split();
        for event in self.decoder.records(buffer, sequence) {
            let event = event?;
            log::trace!("{event}");
            self.printer
                .print(&event, watched, out)
                .map_err(MonitorError::Output)?;
        }
        log::trace!("{} events decoded so far", sequence.current());
        out.flush().map_err(MonitorError::Output)
    }

    /// Read `stream` until it fails. Each read must return whole records.
    pub fn run<R: Read, W: Write>(
        &self,
        mut stream: R,
        mut out: W,
        read_buffer_size: usize,
    ) -> Result<Infallible, MonitorError> {
        let mut buffer = BytesMut::zeroed(read_buffer_size);
        loop {
            let len = match stream.read(&mut buffer) {
                Ok(0) => return Err(MonitorError::StreamClosed),
                Ok(len) => len,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(MonitorError::Read(err)),
            };
            log::trace!("read {len} bytes");
            self.process_batch(&buffer[..len], &mut out)?;
        }
    }
}
