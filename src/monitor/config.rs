use std::path::Path;

use anyhow::{Context, Result, bail};
use filemon_core::config::{CONFIG_SECTION, ModuleConfig, MonitorConfig};

/// Load the monitor settings from the `[filemon]` section of an INI file.
/// Other sections are ignored, and a file without the section gives the
/// defaults.
pub fn load_config_file(config_file: &Path) -> Result<MonitorConfig> {
    if !config_file.exists() {
        bail!("Configuration file {} not found", config_file.display());
    }

    let conf = ini::Ini::load_from_file(config_file)
        .with_context(|| format!("Error loading configuration from {config_file:?}"))?;

    let mut module_config = ModuleConfig::default();
    if let Some(prop) = conf.section(Some(CONFIG_SECTION)) {
        for (key, value) in prop.iter() {
            log::debug!("{}.{}={}", CONFIG_SECTION, key, value);
            module_config.insert(key.to_string(), value.to_string());
        }
    }

    MonitorConfig::try_from(&module_config)
        .with_context(|| format!("Invalid configuration in {config_file:?}"))
}

/// Settings from `config_file` when given, defaults otherwise.
pub fn load_config(config_file: Option<&str>) -> Result<MonitorConfig> {
    match config_file {
        Some(config_file) => load_config_file(Path::new(config_file)),
        None => Ok(MonitorConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use filemon_core::{PidWidth, config::OutputFormat};
    use tempfile::NamedTempFile;

    use super::*;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_filemon_section() {
        let file = config_file(
            "\
[other]
output_format=bogus

[filemon]
output_format=xml
watch_paths=/tmp,/var/log
read_buffer_size=4096
pid_width=4
",
        );
        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.output_format, OutputFormat::Xml);
        assert_eq!(config.watch_paths, ["/tmp", "/var/log"]);
        assert_eq!(config.read_buffer_size, 4096);
        assert_eq!(config.event_queue_depth, 0x1000);
        assert_eq!(config.pid_width, PidWidth::Four);
    }

    #[test]
    fn missing_section_gives_defaults() {
        let file = config_file("[something]\nkey=value\n");
        assert_eq!(load_config_file(file.path()).unwrap(), MonitorConfig::default());
        assert_eq!(load_config(None).unwrap(), MonitorConfig::default());
    }

    #[test]
    fn invalid_value_is_an_error() {
        let file = config_file("[filemon]\nread_buffer_size=16\n");
        let err = load_config_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("read_buffer_size"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("filemon.ini");
        let err = load_config(missing.to_str()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
