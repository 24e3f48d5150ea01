//! Optional JSON configuration file

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ModeParmError, Result};
use crate::scsi::constants::DEFAULT_TIMEOUT_SECS;

const CONFIG_DIR_NAME: &str = "modeparm";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Device used when a command names none
    pub device: Option<String>,
    pub six_byte_cdb: bool,
    pub timeout_secs: u32,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: None,
            six_byte_cdb: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_json: false,
        }
    }
}

impl Config {
    /// `<config dir>/modeparm/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load an explicitly named file; it must exist.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ModeParmError::config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            ModeParmError::config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        if config.timeout_secs == 0 {
            return Err(ModeParmError::config(format!(
                "timeout_secs in {} must be positive",
                path.display()
            )));
        }

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// The explicit file if given, else the default file when it exists,
    /// else built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(path),
            _ => {
                debug!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Device from the command line, falling back to the configured one
    pub fn resolve_device(&self, from_cli: Option<String>) -> Result<String> {
        from_cli.or_else(|| self.device.clone()).ok_or_else(|| {
            ModeParmError::usage("no device given and no default device configured")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let file = write_config(r#"{ "device": "/dev/sg1", "six_byte_cdb": true }"#);
        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.device.as_deref(), Some("/dev/sg1"));
        assert!(config.six_byte_cdb);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(!config.log_json);
    }

    #[test]
    fn test_load_rejects_bad_files() {
        let file = write_config("{ not json");
        assert!(matches!(
            Config::load_from_file(file.path()),
            Err(ModeParmError::Config(_))
        ));

        let file = write_config(r#"{ "timeout": 5 }"#);
        assert!(matches!(
            Config::load_from_file(file.path()),
            Err(ModeParmError::Config(_))
        ));

        let file = write_config(r#"{ "timeout_secs": 0 }"#);
        assert!(matches!(
            Config::load_from_file(file.path()),
            Err(ModeParmError::Config(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load_from_file(dir.path().join("missing.json")),
            Err(ModeParmError::Config(_))
        ));
    }

    #[test]
    fn test_resolve_device() {
        let config = Config {
            device: Some("/dev/sda".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_device(None).unwrap(), "/dev/sda");
        assert_eq!(
            config.resolve_device(Some("/dev/sg2".to_string())).unwrap(),
            "/dev/sg2"
        );
        assert!(matches!(
            Config::default().resolve_device(None),
            Err(ModeParmError::Usage(_))
        ));
    }
}
