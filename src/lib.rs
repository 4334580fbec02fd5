//! Filemon watches file system activity on macOS through the `fsevents`
//! kernel facility and reports the changes below a set of watched paths.
//!
//! Two loops run side by side:
//!
//! - the producer reads the kernel event stream, decodes the packed records
//!   ([`filemon_core::decoder`]), matches their paths against the watched
//!   ones and prints what matched ([`file_system_monitor::printer`]), either
//!   as one `ADD:`/`DEL:`/`CHG:` line per change or as an XML fragment per
//!   event;
//! - the control loop reads commands from the standard input and updates the
//!   watched paths ([`filemon_core::command`]).
//!
//! ```sh
//! # Print every change under /tmp as XML
//! sudo filemon -x /tmp
//!
//! # Watch /var/log too, then stop
//! add:/var/log
//! die
//! ```
//!
//! Startup paths may also be listed in the `[filemon]` section of an `INI`
//! file given with `--config-file`, together with the tuning of the kernel
//! stream; see [`filemon_core::config::MonitorConfig`].

pub mod cli;
pub mod monitor;

pub mod metadata {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Init logger. We log from info level and above, hide timestamp
/// and module path.
/// If RUST_LOG is set, we assume the user wants to debug something
/// and use env_logger default behaviour.
pub fn init_logger(override_log_level: log::Level) {
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
    } else {
        env_logger::builder()
            .filter_level(override_log_level.to_level_filter())
            .format_timestamp(None)
            .format_module_path(false)
            .init();
    }
}
