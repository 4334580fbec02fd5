use std::{ffi::OsString, io, sync::Arc};

use anyhow::{Context, Result, ensure};
use file_system_monitor::{FileSystemMonitor, printer::printer};
use filemon_core::{Command, Control, Decoder, MonitorContext, config::OutputFormat};
use fsevents_common::{NameResolver, SystemNames, open_event_stream};
use nix::unistd::{Uid, geteuid, getuid};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    signal::unix::{SignalKind, signal},
};

use crate::cli::FilemonExecOpts;

mod config;

pub use config::{load_config, load_config_file};

pub async fn run_filemon(options: &FilemonExecOpts) -> Result<()> {
    log::trace!("Filemon Options: {:?}", options);

    let config = load_config(options.config_file.as_deref())?;
    let output_format = if options.xml {
        OutputFormat::Xml
    } else {
        config.output_format
    };

    let ctx = MonitorContext::new();
    let config_paths = config.watch_paths.iter().map(OsString::from);
    for path in config_paths.chain(options.paths.iter().cloned()) {
        ctx.apply(&Command::Add(path));
    }

    let names: Arc<dyn NameResolver> = Arc::new(SystemNames);
    check_privileges(names.as_ref())?;

    let stream = open_event_stream(config.event_queue_depth)
        .context("Error acquiring the file system event stream")?;
    eprintln!("STARTED");

    let monitor = FileSystemMonitor::new(
        ctx.clone(),
        Decoder::new(config.pid_width),
        printer(output_format, names),
    );
    let read_buffer_size = config.read_buffer_size;
    let producer =
        tokio::task::spawn_blocking(move || monitor.run(stream, io::stdout(), read_buffer_size));

    let mut sig_int = signal(SignalKind::interrupt())?;
    let mut sig_term = signal(SignalKind::terminate())?;

    tokio::select! {
        result = producer => {
            match result.context("Event producer panicked")? {
                Ok(never) => match never {},
                Err(err) => {
                    Err(anyhow::Error::new(err).context("Error monitoring file system events"))
                }
            }
        }
        result = control_loop(&ctx, BufReader::new(tokio::io::stdin())) => result,
        _ = sig_int.recv() => {
            log::trace!("SIGINT received");
            Ok(())
        }
        _ = sig_term.recv() => {
            log::trace!("SIGTERM received");
            Ok(())
        }
    }
}

/// Apply the commands read from `input` until `die` or the end of input.
///
/// The state lock may be held by the producer for a whole batch, so commands
/// are applied on the blocking pool rather than on a runtime worker.
pub async fn control_loop<R>(ctx: &MonitorContext, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.split(b'\n');
    while let Some(mut line) = lines
        .next_segment()
        .await
        .context("Error reading commands")?
    {
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        let ctx = ctx.clone();
        let control = tokio::task::spawn_blocking(move || ctx.apply_line(&line))
            .await
            .context("Command processing panicked")?;
        if control == Control::Terminate {
            return Ok(());
        }
    }
    log::debug!("end of commands");
    Ok(())
}

fn check_privileges(names: &dyn NameResolver) -> Result<()> {
    let uid = getuid();
    let euid = geteuid();
    let describe = |uid: Uid| match names.user_name(uid) {
        Some(name) => format!("{uid} ({name})"),
        None => uid.to_string(),
    };
    log::debug!("uid = {}, effective uid = {}", describe(uid), describe(euid));

    ensure!(
        euid.is_root(),
        "filemon must run with root permissions (uid = {}, effective uid = {})",
        describe(uid),
        describe(euid)
    );
    Ok(())
}
