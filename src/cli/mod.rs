use std::{env, ffi::OsString};

use clap::{Arg, ArgAction, Command, CommandFactory, FromArgMatches, Parser};

pub const NAME: &str = "filemon";

#[derive(Parser, Debug, Clone)]
#[clap(name = NAME)]
#[clap(about = "Report file system changes below a set of watched paths")]
#[clap(after_help = "\
Commands read from the standard input, one per line:
  add:<path>  start watching <path>
  del:<path>  stop watching <path>
  clr         stop watching everything
  die         exit")]
pub struct FilemonOpts {
    /// Print events as XML instead of one line per change
    #[clap(short = 'x', long)]
    pub xml: bool,
    /// Print debug diagnostics, same as `-v`
    #[clap(short = 'd', long)]
    pub debug: bool,
    /// INI file with a `[filemon]` section
    #[clap(long)]
    pub config_file: Option<String>,
    /// Paths to watch from startup
    #[clap(value_name = "PATH")]
    pub paths: Vec<OsString>,
}

#[derive(Debug, Clone)]
pub struct FilemonExecOpts {
    pub options: FilemonOpts,
    pub override_log_level: log::Level,
}

impl std::ops::Deref for FilemonExecOpts {
    type Target = FilemonOpts;

    fn deref(&self) -> &Self::Target {
        &self.options
    }
}

pub fn parse_from_args() -> FilemonExecOpts {
    parse_from(&mut std::env::args_os())
}

pub fn parse_from<I, T>(args: I) -> FilemonExecOpts
where
    I: Iterator<Item = T>,
    T: Into<OsString> + Clone,
{
    try_parse_from(args).unwrap_or_else(|e| e.exit())
}

pub fn try_parse_from<I, T>(args: I) -> Result<FilemonExecOpts, clap::Error>
where
    I: Iterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let app = FilemonOpts::command()
        .version(crate::metadata::VERSION)
        .help_template(help_template(NAME));

    let matches = with_verbosity_flag(app).try_get_matches_from(args)?;
    let options = FilemonOpts::from_arg_matches(&matches)?;

    // `-d` is kept for compatibility and counts as one `-v`
    let verbosity = matches.get_count("v").max(u8::from(options.debug));
    let override_log_level = log_level_from_verbosity_flag_count(verbosity);

    Ok(FilemonExecOpts {
        options,
        override_log_level,
    })
}

fn with_verbosity_flag(app: Command) -> Command {
    app.arg(
        Arg::new("v")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count)
            .help("Pass many times for a more verbose output. Passing `-v` adds debug logs, `-vv` enables trace logging"),
    )
}

fn log_level_from_verbosity_flag_count(num: u8) -> log::Level {
    match num {
        u8::MIN..=0 => log::Level::Info,
        1 => log::Level::Debug,
        2..=u8::MAX => log::Level::Trace,
    }
}

fn show_backtrace() -> bool {
    if log::max_level() >= log::LevelFilter::Debug {
        return true;
    }

    if let Ok(true) = env::var("RUST_BACKTRACE").map(|s| s == "1") {
        return true;
    }

    false
}

pub fn report_error(e: &anyhow::Error) {
    // One record for the whole chain of causes, with the backtrace when
    // debugging.
    if show_backtrace() {
        log::error!("{:?}", e);
    } else {
        log::error!("{:#}", e);
    }
}

fn help_template(name: &str) -> String {
    format!(
        "\
{{about}}

{{usage-heading}}
  {name} [OPTIONS] [PATH]...

{{all-args}}{{after-help}}\
"
    )
}
