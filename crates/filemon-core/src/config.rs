use std::{collections::HashMap, fmt::Display, str::FromStr};

use fsevents_common::device::DEFAULT_EVENT_QUEUE_DEPTH;
use thiserror::Error;

use crate::decoder::PidWidth;

/// Section of the configuration file read by the monitor.
pub const CONFIG_SECTION: &str = "filemon";

/// Reads shorter than this are refused by the fsevents device.
pub const MIN_READ_BUFFER_SIZE: usize = 2048;
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8192;

/// Raw key-value configuration, as found in one section of the file
#[derive(Debug, Clone, Default)]
pub struct ModuleConfig {
    inner: HashMap<String, String>,
}

#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("{value} is not a valid value for field {field}: {err}")]
    InvalidValue {
        field: String,
        value: String,
        err: String,
    },
}

impl ModuleConfig {
    /// Inserts a new configuration value.
    pub fn insert(&mut self, key: String, value: String) -> Option<String> {
        self.inner.insert(key, value)
    }

    /// Returns a typed configuration value, or `default` when missing.
    pub fn with_default<T>(&self, config_name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        match self.inner.get(config_name) {
            None => Ok(default),
            Some(value) => parse(value, config_name),
        }
    }

    /// Return a comma separed list of values. Return empty vector if field is missing.
    pub fn get_list<T>(&self, config_name: &str) -> Result<Vec<T>, ConfigError>
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        self.inner
            .get(config_name)
            .iter()
            .flat_map(|config| config.split(','))
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| parse(item, config_name))
            .collect()
    }
}

fn parse<T>(value: &str, config_name: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    T::from_str(value.trim()).map_err(|err| ConfigError::InvalidValue {
        field: config_name.to_string(),
        value: value.to_string(),
        err: err.to_string(),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One `ADD:`/`DEL:`/`CHG:` line per watched change
    #[default]
    Terse,
    /// One XML fragment per event touching a watched path
    Xml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format.to_lowercase().as_str() {
            "terse" => Ok(OutputFormat::Terse),
            "xml" => Ok(OutputFormat::Xml),
            _ => Err(String::from("Output format must be one of [terse, xml]")),
        }
    }
}

/// Typed monitor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub output_format: OutputFormat,
    /// Paths watched from startup, before the ones given on the command line
    pub watch_paths: Vec<String>,
    /// Bytes requested by each read of the event stream
    pub read_buffer_size: usize,
    /// Events the kernel queues for us before dropping
    pub event_queue_depth: i32,
    pub pid_width: PidWidth,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Terse,
            watch_paths: Vec::new(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            event_queue_depth: DEFAULT_EVENT_QUEUE_DEPTH,
            pid_width: PidWidth::NATIVE,
        }
    }
}

impl TryFrom<&ModuleConfig> for MonitorConfig {
    type Error = ConfigError;

    fn try_from(config: &ModuleConfig) -> Result<Self, Self::Error> {
        let read_buffer_size =
            config.with_default("read_buffer_size", DEFAULT_READ_BUFFER_SIZE)?;
        if read_buffer_size < MIN_READ_BUFFER_SIZE {
            return Err(ConfigError::InvalidValue {
                field: String::from("read_buffer_size"),
                value: read_buffer_size.to_string(),
                err: format!("must be at least {MIN_READ_BUFFER_SIZE}"),
            });
        }
        let event_queue_depth =
            config.with_default("event_queue_depth", DEFAULT_EVENT_QUEUE_DEPTH)?;
        if event_queue_depth <= 0 {
            return Err(ConfigError::InvalidValue {
                field: String::from("event_queue_depth"),
                value: event_queue_depth.to_string(),
                err: String::from("must be positive"),
            });
        }

        Ok(MonitorConfig {
            output_format: config.with_default("output_format", OutputFormat::Terse)?,
            watch_paths: config.get_list("watch_paths")?,
            read_buffer_size,
            event_queue_depth,
            pid_width: config.with_default("pid_width", PidWidth::NATIVE)?,
        })
    }
}
